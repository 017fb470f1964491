use tracing::trace;

use crate::buffer::OutputBuffer;
use crate::config::Config;
use crate::error::Result;
use crate::escape::append_escaped;
use crate::inline::InlineParser;
use crate::reference::{ReferenceScope, ReferenceTable, parse_definition};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn open_tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>\n",
            ListKind::Ordered => "<ol>\n",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>\n",
            ListKind::Ordered => "</ol>\n",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    fn attr(self) -> &'static str {
        match self {
            Align::None => "",
            Align::Left => " style=\"text-align: left\"",
            Align::Center => " style=\"text-align: center\"",
            Align::Right => " style=\"text-align: right\"",
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct ListItem {
    kind: ListKind,
    content_start: usize,
    task: Option<bool>,
}

/// Adds every `[label]: url` line outside fenced code to `refs`. Returns the
/// number of definitions added.
pub(crate) fn collect_definitions(markdown: &str, refs: &mut ReferenceTable) -> Result<usize> {
    let mut in_fence = false;
    let mut added = 0;
    for raw in markdown.lines() {
        let line = raw.trim();
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        let Some(def) = parse_definition(line) else {
            continue;
        };
        if def.label.trim().is_empty() || def.url.is_empty() {
            continue;
        }
        trace!(label = def.label, url = def.url, "reference definition");
        refs.add(def.label, def.url, def.title)?;
        added += 1;
    }
    Ok(added)
}

/// Renders `markdown` block by block into `out`, using `scratch` as the
/// per-line working copy. Returns the number of physical lines read.
pub(crate) fn render_blocks(
    markdown: &str,
    config: &Config,
    refs: ReferenceScope<'_>,
    scratch: &mut String,
    out: &mut OutputBuffer,
) -> Result<usize> {
    let mut renderer = BlockRenderer::new(config, refs);
    let mut lines = markdown.lines().peekable();
    let mut count = 0;

    while let Some(raw) = lines.next() {
        count += 1;
        scratch.clear();
        scratch.try_reserve(raw.len())?;
        scratch.push_str(raw);
        let next = lines.peek().copied();
        if renderer.render_line(raw, scratch.trim(), next, out)? {
            lines.next();
            count += 1;
        }
    }

    renderer.finish(out)?;
    Ok(count)
}

struct BlockRenderer<'a> {
    config: &'a Config,
    inline: InlineParser<'a>,
    in_fence: bool,
    list: Option<ListKind>,
    table: Option<Vec<Align>>,
}

impl<'a> BlockRenderer<'a> {
    fn new(config: &'a Config, refs: ReferenceScope<'a>) -> Self {
        Self {
            config,
            inline: InlineParser::new(config, refs),
            in_fence: false,
            list: None,
            table: None,
        }
    }

    /// Returns true when `next` was consumed as a table separator.
    fn render_line(
        &mut self,
        raw: &str,
        line: &str,
        next: Option<&str>,
        out: &mut OutputBuffer,
    ) -> Result<bool> {
        if is_fence(line) {
            if self.in_fence {
                self.in_fence = false;
                out.append("</code></pre>\n")?;
            } else {
                self.close_open_blocks(out)?;
                self.open_fence(line, out)?;
            }
            return Ok(false);
        }

        if self.in_fence {
            append_escaped(out, raw.strip_suffix('\r').unwrap_or(raw))?;
            out.append("\n")?;
            return Ok(false);
        }

        if parse_definition(line).is_some() {
            return Ok(false);
        }

        if line.is_empty() {
            self.close_open_blocks(out)?;
            out.append("\n")?;
            return Ok(false);
        }

        if line.starts_with('#') {
            self.close_open_blocks(out)?;
            self.render_heading(line, out)?;
            return Ok(false);
        }

        if is_rule(line) {
            self.close_open_blocks(out)?;
            out.append("<hr>\n")?;
            return Ok(false);
        }

        if line.starts_with('>') {
            self.close_open_blocks(out)?;
            let start = if line[1..].starts_with(' ') { 2 } else { 1 };
            out.append("<blockquote>")?;
            self.inline.parse_inline(line, start, line.len(), out)?;
            out.append("</blockquote>\n")?;
            return Ok(false);
        }

        if let Some(item) = list_item(line, self.config.enable_task_lists) {
            self.close_table(out)?;
            self.render_list_item(line, &item, out)?;
            return Ok(false);
        }

        if self.config.enable_tables && line.contains('|') {
            self.close_list(out)?;
            if let Some(separator) = next.map(str::trim).filter(|n| is_table_separator(n)) {
                self.close_table(out)?;
                let aligns = parse_alignments(separator);
                out.append("<table>\n<thead>\n")?;
                render_row(&mut self.inline, line, "th", &aligns, out)?;
                out.append("</thead>\n<tbody>\n")?;
                self.table = Some(aligns);
                return Ok(true);
            }
            if let Some(aligns) = self.table.as_deref() {
                render_row(&mut self.inline, line, "td", aligns, out)?;
                return Ok(false);
            }
        }

        self.close_open_blocks(out)?;
        out.append("<p>")?;
        self.inline.parse_inline(line, 0, line.len(), out)?;
        out.append("</p>\n")?;
        Ok(false)
    }

    fn open_fence(&mut self, line: &str, out: &mut OutputBuffer) -> Result<()> {
        self.in_fence = true;
        match line[3..].split_whitespace().next() {
            Some(lang) => {
                out.append("<pre><code class=\"language-")?;
                append_escaped(out, lang)?;
                out.append("\">")
            }
            None => out.append("<pre><code>"),
        }
    }

    fn render_heading(&mut self, line: &str, out: &mut OutputBuffer) -> Result<()> {
        let bytes = line.as_bytes();
        let level = bytes.iter().take(6).take_while(|&&b| b == b'#').count();
        let mut start = level;
        while start < bytes.len() && bytes[start] == b' ' {
            start += 1;
        }
        let tag = level.to_string();
        out.append("<h")?;
        out.append(&tag)?;
        out.append(">")?;
        self.inline.parse_inline(line, start, line.len(), out)?;
        out.append("</h")?;
        out.append(&tag)?;
        out.append(">\n")
    }

    fn render_list_item(
        &mut self,
        line: &str,
        item: &ListItem,
        out: &mut OutputBuffer,
    ) -> Result<()> {
        if self.list.is_none() {
            out.append(item.kind.open_tag())?;
            self.list = Some(item.kind);
        }
        match item.task {
            Some(true) => out.append(
                "<li class=\"task-list-item\"><input type=\"checkbox\" checked disabled> ",
            )?,
            Some(false) => {
                out.append("<li class=\"task-list-item\"><input type=\"checkbox\" disabled> ")?
            }
            None => out.append("<li>")?,
        }
        self.inline
            .parse_inline(line, item.content_start, line.len(), out)?;
        out.append("</li>\n")
    }

    fn close_list(&mut self, out: &mut OutputBuffer) -> Result<()> {
        match self.list.take() {
            Some(kind) => out.append(kind.close_tag()),
            None => Ok(()),
        }
    }

    fn close_table(&mut self, out: &mut OutputBuffer) -> Result<()> {
        match self.table.take() {
            Some(_) => out.append("</tbody></table>\n"),
            None => Ok(()),
        }
    }

    fn close_open_blocks(&mut self, out: &mut OutputBuffer) -> Result<()> {
        self.close_list(out)?;
        self.close_table(out)
    }

    fn finish(mut self, out: &mut OutputBuffer) -> Result<()> {
        if self.in_fence {
            out.append("</code></pre>\n")?;
        }
        self.close_open_blocks(out)
    }
}

fn render_row(
    inline: &mut InlineParser<'_>,
    line: &str,
    tag: &str,
    aligns: &[Align],
    out: &mut OutputBuffer,
) -> Result<()> {
    out.append("<tr>")?;
    for (col, (start, end)) in split_cells(line).into_iter().enumerate() {
        let align = aligns.get(col).copied().unwrap_or(Align::None);
        out.append("<")?;
        out.append(tag)?;
        out.append(align.attr())?;
        out.append(">")?;
        inline.parse_inline(line, start, end, out)?;
        out.append("</")?;
        out.append(tag)?;
        out.append(">")?;
    }
    out.append("</tr>\n")
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}

fn is_rule(line: &str) -> bool {
    let marker = match line.bytes().next() {
        Some(b @ (b'-' | b'*' | b'_')) => b,
        _ => return false,
    };
    let mut count = 0;
    for b in line.bytes() {
        if b == marker {
            count += 1;
        } else if !b.is_ascii_whitespace() {
            return false;
        }
    }
    count >= 3
}

fn list_item(line: &str, task_lists: bool) -> Option<ListItem> {
    let bytes = line.as_bytes();
    let (kind, content_start) = match bytes {
        [b'-' | b'*' | b'+', b' ', ..] => (ListKind::Unordered, 2),
        _ => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 || !bytes[digits..].starts_with(b". ") {
                return None;
            }
            (ListKind::Ordered, digits + 2)
        }
    };

    if task_lists {
        let rest = &bytes[content_start..];
        let checked = match rest {
            [b'[', b' ', b']', ..] => Some(false),
            [b'[', b'x' | b'X', b']', ..] => Some(true),
            _ => None,
        };
        if let Some(checked) = checked {
            if rest.len() == 3 || rest[3] == b' ' {
                return Some(ListItem {
                    kind,
                    content_start: (content_start + 4).min(bytes.len()),
                    task: Some(checked),
                });
            }
        }
    }

    Some(ListItem {
        kind,
        content_start,
        task: None,
    })
}

fn is_table_separator(line: &str) -> bool {
    line.contains('-')
        && line.contains('|')
        && line
            .bytes()
            .all(|b| matches!(b, b'|' | b'-' | b':') || b.is_ascii_whitespace())
}

fn parse_alignments(separator: &str) -> Vec<Align> {
    split_cells(separator)
        .into_iter()
        .map(|(start, end)| {
            let cell = &separator[start..end];
            match (cell.starts_with(':'), cell.ends_with(':') && cell.len() > 1) {
                (true, true) => Align::Center,
                (true, false) => Align::Left,
                (false, true) => Align::Right,
                (false, false) => Align::None,
            }
        })
        .collect()
}

/// Trimmed byte ranges of the cells of a table row. A `\|` escape does not
/// split.
fn split_cells(line: &str) -> Vec<(usize, usize)> {
    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut cells = Vec::new();
    let mut pos = 0;
    while pos < len && (bytes[pos] == b'|' || bytes[pos].is_ascii_whitespace()) {
        pos += 1;
    }

    while pos < len {
        let start = pos;
        while pos < len && bytes[pos] != b'|' {
            if bytes[pos] == b'\\' && pos + 1 < len {
                pos += 2;
            } else {
                pos += 1;
            }
        }
        let mut cell_start = start;
        let mut cell_end = pos;
        while cell_start < cell_end && bytes[cell_start].is_ascii_whitespace() {
            cell_start += 1;
        }
        while cell_end > cell_start && bytes[cell_end - 1].is_ascii_whitespace() {
            cell_end -= 1;
        }
        cells.push((cell_start, cell_end));

        if pos < len {
            pos += 1;
        }
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
    }
    cells
}
