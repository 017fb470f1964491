use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::buffer::OutputBuffer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::escape::{append_escaped, append_text};
use crate::reference::ReferenceScope;

const AUTOLINK_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

/// Recursive span renderer over a byte range of one block's text.
///
/// Every scan is bounded by the `end` offset handed down by the caller, so a
/// nested span can never consume text that belongs to its parent.
pub(crate) struct InlineParser<'a> {
    config: &'a Config,
    refs: ReferenceScope<'a>,
    depth: usize,
    ceiling_logged: bool,
    scans: ScanCache,
}

impl<'a> InlineParser<'a> {
    pub(crate) fn new(config: &'a Config, refs: ReferenceScope<'a>) -> Self {
        Self {
            config,
            refs,
            depth: 0,
            ceiling_logged: false,
            scans: ScanCache::default(),
        }
    }

    /// Renders `text[start..end]` into `out` and returns the position where
    /// scanning stopped (always `end` unless `end` exceeds the text).
    pub(crate) fn parse_inline(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<usize> {
        let bytes = text.as_bytes();
        let end = end.min(text.len());
        if self.depth == 0 {
            self.scans.reset(start, end);
        }
        let escape = self.config.escape_html;
        let mut pos = start;

        while pos < end {
            match bytes[pos] {
                b'\\' => {
                    if pos + 1 < end && bytes[pos + 1].is_ascii_punctuation() {
                        append_text(out, &text[pos + 1..pos + 2], escape)?;
                        pos += 2;
                        continue;
                    }
                }
                b'*' | b'_' => {
                    if self.can_nest() {
                        if let Some(next) = self.parse_emphasis(text, pos, end, out)? {
                            pos = next;
                            continue;
                        }
                    }
                }
                b'~' => {
                    if self.config.enable_strikethrough && self.can_nest() {
                        if let Some(next) = self.parse_strikethrough(text, pos, end, out)? {
                            pos = next;
                            continue;
                        }
                    }
                }
                b'`' => {
                    if let Some(next) = self.parse_code_span(text, pos, end, out)? {
                        pos = next;
                        continue;
                    }
                }
                b'!' => {
                    if pos + 1 < end && bytes[pos + 1] == b'[' {
                        if let Some(next) = self.parse_image(text, pos, end, out)? {
                            pos = next;
                            continue;
                        }
                    }
                }
                b'[' => {
                    if self.can_nest() {
                        if let Some(next) = self.parse_link(text, pos, end, out)? {
                            pos = next;
                            continue;
                        }
                    }
                }
                b'<' => {
                    if self.config.enable_autolinks {
                        if let Some(next) = self.parse_autolink(text, pos, end, out)? {
                            pos = next;
                            continue;
                        }
                    }
                    if self.config.enable_inline_html {
                        if let Some(next) = self.parse_raw_markup(text, pos, end, out)? {
                            pos = next;
                            continue;
                        }
                    }
                }
                b'\n' => {
                    if self.config.hard_line_breaks {
                        out.append("<br>")?;
                    } else {
                        out.append_char(' ')?;
                    }
                    pos += 1;
                    continue;
                }
                _ => {}
            }

            let width = char_width(bytes[pos]).min(end - pos);
            append_text(out, &text[pos..pos + width], escape)?;
            pos += width;
        }

        Ok(pos)
    }

    fn can_nest(&mut self) -> bool {
        if self.depth < self.config.max_nesting_depth {
            return true;
        }
        if !self.ceiling_logged {
            debug!(
                depth = self.depth,
                "nesting ceiling reached; emitting span markers as text"
            );
            self.ceiling_logged = true;
        }
        false
    }

    fn parse_nested(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<()> {
        self.depth += 1;
        let result = self.parse_inline(text, start, end, out);
        self.depth -= 1;
        result.map(|_| ())
    }

    fn parse_emphasis(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<Option<usize>> {
        let bytes = text.as_bytes();
        let marker = match bytes.get(start) {
            Some(&b) if b == b'*' || b == b'_' => b,
            _ => return Err(Error::InvalidInput("emphasis must start with `*` or `_`")),
        };
        let run = count_run(bytes, start, end, marker).min(3);
        let close = match self.scans.emphasis_close(bytes, start, end, marker, run) {
            Some(close) => close,
            None => return Ok(None),
        };
        let (open_tag, close_tag) = match run {
            1 => ("<em>", "</em>"),
            2 => ("<strong>", "</strong>"),
            _ => ("<strong><em>", "</em></strong>"),
        };
        out.append(open_tag)?;
        self.parse_nested(text, start + run, close, out)?;
        out.append(close_tag)?;
        Ok(Some(close + run))
    }

    fn parse_strikethrough(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<Option<usize>> {
        let bytes = text.as_bytes();
        if !bytes[start..end.min(bytes.len())].starts_with(b"~~") {
            return Ok(None);
        }
        let mut pos = start + 2;
        while pos + 1 < end {
            if is_escape(bytes, pos, end) {
                pos += 2;
                continue;
            }
            if bytes[pos] == b'~' && bytes[pos + 1] == b'~' && pos > start + 2 {
                out.append("<del>")?;
                self.parse_nested(text, start + 2, pos, out)?;
                out.append("</del>")?;
                return Ok(Some(pos + 2));
            }
            pos += 1;
        }
        Ok(None)
    }

    fn parse_code_span(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<Option<usize>> {
        let bytes = text.as_bytes();
        if bytes.get(start) != Some(&b'`') {
            return Err(Error::InvalidInput("code span must start with a backtick"));
        }
        let ticks = count_run(bytes, start, end, b'`');
        let mut pos = start + ticks;
        while pos < end {
            if bytes[pos] != b'`' {
                pos += 1;
                continue;
            }
            let run = count_run(bytes, pos, end, b'`');
            if run == ticks {
                let mut content = &text[start + ticks..pos];
                if let Some(rest) = content.strip_prefix(' ') {
                    content = rest;
                }
                if let Some(rest) = content.strip_suffix(' ') {
                    content = rest;
                }
                out.append("<code>")?;
                append_escaped(out, content)?;
                out.append("</code>")?;
                return Ok(Some(pos + ticks));
            }
            pos += run;
        }
        Ok(None)
    }

    fn parse_image(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<Option<usize>> {
        let bytes = text.as_bytes();
        if !bytes[start..end.min(bytes.len())].starts_with(b"![") {
            return Err(Error::InvalidInput("image must start with `![`"));
        }
        let alt_start = start + 2;
        let alt_end = match self.scans.find_byte(bytes, alt_start, end, b']') {
            Some(idx) => idx,
            None => return Ok(None),
        };
        if alt_end + 1 >= end || bytes[alt_end + 1] != b'(' {
            return Ok(None);
        }
        let dest_start = alt_end + 2;
        let dest_end = match self.scans.find_byte(bytes, dest_start, end, b')') {
            Some(idx) => idx,
            None => return Ok(None),
        };
        let (url, title) = split_destination(&text[dest_start..dest_end]);
        let escape = self.config.escape_html;

        out.append("<img src=\"")?;
        append_text(out, url, escape)?;
        out.append("\" alt=\"")?;
        append_text(out, &text[alt_start..alt_end], escape)?;
        out.append("\"")?;
        if let Some(title) = title {
            out.append(" title=\"")?;
            append_text(out, title, escape)?;
            out.append("\"")?;
        }
        out.append(">")?;
        Ok(Some(dest_end + 1))
    }

    fn parse_link(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<Option<usize>> {
        let bytes = text.as_bytes();
        if bytes.get(start) != Some(&b'[') {
            return Err(Error::InvalidInput("link must start with `[`"));
        }
        let text_start = start + 1;
        let text_end = match self.scans.bracket_close(bytes, start, end) {
            Some(idx) => idx,
            None => return Ok(None),
        };
        let after = text_end + 1;

        if after < end && bytes[after] == b'(' {
            let dest_end = match self.scans.find_byte(bytes, after + 1, end, b')') {
                Some(idx) => idx,
                None => return Ok(None),
            };
            let (url, title) = split_destination(&text[after + 1..dest_end]);
            self.emit_link(text, text_start, text_end, url, title, out)?;
            return Ok(Some(dest_end + 1));
        }

        let refs = self.refs;
        if after < end && bytes[after] == b'[' {
            if let Some(label_end) = self.scans.find_byte(bytes, after + 1, end, b']') {
                let label = if label_end == after + 1 {
                    &text[text_start..text_end]
                } else {
                    &text[after + 1..label_end]
                };
                if let Some(link) = refs.find(label) {
                    self.emit_link(
                        text,
                        text_start,
                        text_end,
                        &link.url,
                        link.title.as_deref(),
                        out,
                    )?;
                    return Ok(Some(label_end + 1));
                }
            }
        }

        if let Some(link) = refs.find(&text[text_start..text_end]) {
            self.emit_link(
                text,
                text_start,
                text_end,
                &link.url,
                link.title.as_deref(),
                out,
            )?;
            return Ok(Some(text_end + 1));
        }

        Ok(None)
    }

    fn emit_link(
        &mut self,
        text: &str,
        text_start: usize,
        text_end: usize,
        url: &str,
        title: Option<&str>,
        out: &mut OutputBuffer,
    ) -> Result<()> {
        let escape = self.config.escape_html;
        out.append("<a href=\"")?;
        append_text(out, url, escape)?;
        out.append("\"")?;
        if let Some(title) = title.filter(|title| !title.is_empty()) {
            out.append(" title=\"")?;
            append_text(out, title, escape)?;
            out.append("\"")?;
        }
        out.append(">")?;
        self.parse_nested(text, text_start, text_end, out)?;
        out.append("</a>")
    }

    fn parse_autolink(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<Option<usize>> {
        let bytes = text.as_bytes();
        if bytes.get(start) != Some(&b'<') {
            return Err(Error::InvalidInput("autolink must start with `<`"));
        }
        let pos = match self.scans.find_byte(bytes, start + 1, end, b'>') {
            Some(pos) => pos,
            None => return Ok(None),
        };
        let broken = [b' ', b'\n']
            .into_iter()
            .any(|stop| self.scans.find_byte(bytes, start + 1, pos, stop).is_some());
        if broken {
            return Ok(None);
        }
        let content = &text[start + 1..pos];
        let is_email = self.scans.find_byte(bytes, start + 1, pos, b'@').is_some();
        let is_url = AUTOLINK_SCHEMES
            .iter()
            .any(|scheme| content.starts_with(scheme));
        if !is_email && !is_url {
            return Ok(None);
        }

        let escape = self.config.escape_html;
        out.append("<a href=\"")?;
        if is_email {
            out.append("mailto:")?;
        }
        append_text(out, content, escape)?;
        out.append("\">")?;
        append_text(out, content, escape)?;
        out.append("</a>")?;
        Ok(Some(pos + 1))
    }

    fn parse_raw_markup(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
        out: &mut OutputBuffer,
    ) -> Result<Option<usize>> {
        let bytes = text.as_bytes();
        if bytes.get(start) != Some(&b'<') {
            return Err(Error::InvalidInput("inline markup must start with `<`"));
        }
        match self.scans.find_byte(bytes, start + 1, end, b'>') {
            Some(close) => {
                out.append(&text[start..=close])?;
                Ok(Some(close + 1))
            }
            None => Ok(None),
        }
    }
}

/// Splits `url "title"` as found between link parentheses.
fn split_destination(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.trim();
    match raw.find('"') {
        Some(quote) => {
            let url = raw[..quote].trim();
            let rest = &raw[quote + 1..];
            let title = rest.rfind('"').map(|close| &rest[..close]);
            (url, title.filter(|title| !title.is_empty()))
        }
        None => (raw, None),
    }
}

/// Forward-search results for the text under the current top-level range.
///
/// A line full of unclosed openers would otherwise rescan its tail once per
/// opener. Every table here is dropped when a new top-level range starts.
#[derive(Debug, Default)]
struct ScanCache {
    range: (usize, usize),
    /// Per needle: where the last search started and what it found.
    next_byte: Vec<(u8, usize, Option<usize>)>,
    /// `(marker, run, end, pos)` states known to reach `end` without a closer.
    dead_closers: HashSet<(u8, usize, usize, usize)>,
    brackets: Option<HashMap<usize, usize>>,
}

impl ScanCache {
    fn reset(&mut self, start: usize, end: usize) {
        self.range = (start, end);
        self.next_byte.clear();
        self.dead_closers.clear();
        self.brackets = None;
    }

    /// First `needle` in `bytes[start..end]`.
    fn find_byte(&mut self, bytes: &[u8], start: usize, end: usize, needle: u8) -> Option<usize> {
        if start >= end {
            return None;
        }
        let slot = self.next_byte.iter().position(|&(b, ..)| b == needle);
        if let Some((_, from, found)) = slot.map(|index| self.next_byte[index]) {
            if start >= from && found.is_none_or(|at| start <= at) {
                return found.filter(|&at| at < end);
            }
        }
        let found = bytes[start..]
            .iter()
            .position(|&b| b == needle)
            .map(|offset| start + offset);
        match slot {
            Some(index) => self.next_byte[index] = (needle, start, found),
            None => self.next_byte.push((needle, start, found)),
        }
        found.filter(|&at| at < end)
    }

    /// The first later run of exactly `run` markers that is not preceded by
    /// whitespace. Runs of other lengths are skipped whole.
    fn emphasis_close(
        &mut self,
        bytes: &[u8],
        start: usize,
        end: usize,
        marker: u8,
        run: usize,
    ) -> Option<usize> {
        let content_start = start + run;
        let mut visited = Vec::new();
        let mut pos = content_start;
        let found = loop {
            if pos >= end {
                break None;
            }
            if pos > content_start {
                if self.dead_closers.contains(&(marker, run, end, pos)) {
                    break None;
                }
                visited.push(pos);
            }
            if is_escape(bytes, pos, end) {
                pos += 2;
                continue;
            }
            if bytes[pos] != marker {
                pos += 1;
                continue;
            }
            let len = count_run(bytes, pos, end, marker);
            if len == run && pos > content_start && !bytes[pos - 1].is_ascii_whitespace() {
                break Some(pos);
            }
            pos += len;
        };
        if found.is_none() {
            self.dead_closers
                .extend(visited.into_iter().map(|pos| (marker, run, end, pos)));
        }
        found
    }

    /// The `]` balancing the `[` at `open`, if it lies before `end`.
    fn bracket_close(&mut self, bytes: &[u8], open: usize, end: usize) -> Option<usize> {
        let (start, stop) = self.range;
        let pairs = self
            .brackets
            .get_or_insert_with(|| match_brackets(bytes, start, stop));
        pairs.get(&open).copied().filter(|&close| close < end)
    }
}

/// Pairs every unescaped `[` in `bytes[start..end]` with its balancing `]`.
fn match_brackets(bytes: &[u8], start: usize, end: usize) -> HashMap<usize, usize> {
    let mut pairs = HashMap::new();
    let mut open = Vec::new();
    let mut pos = start;
    while pos < end {
        if is_escape(bytes, pos, end) {
            pos += 2;
            continue;
        }
        match bytes[pos] {
            b'[' => open.push(pos),
            b']' => {
                if let Some(at) = open.pop() {
                    pairs.insert(at, pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    pairs
}

fn count_run(bytes: &[u8], start: usize, end: usize, needle: u8) -> usize {
    bytes[start..end].iter().take_while(|&&b| b == needle).count()
}

fn is_escape(bytes: &[u8], pos: usize, end: usize) -> bool {
    bytes[pos] == b'\\' && pos + 1 < end && bytes[pos + 1].is_ascii_punctuation()
}

fn char_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::{InlineParser, split_destination};
    use crate::buffer::OutputBuffer;
    use crate::config::Config;
    use crate::error::ErrorKind;
    use crate::reference::{ReferenceScope, ReferenceTable};

    fn render_with(text: &str, config: &Config, refs: &ReferenceTable) -> String {
        let mut out = OutputBuffer::new(0).unwrap();
        let mut inline = InlineParser::new(config, ReferenceScope::parser_only(refs));
        let end = inline.parse_inline(text, 0, text.len(), &mut out).unwrap();
        assert_eq!(end, text.len());
        out.into_string()
    }

    fn render(text: &str) -> String {
        render_with(text, &Config::default(), &ReferenceTable::new())
    }

    #[test]
    fn emphasis_runs() {
        assert_eq!(render("*t*"), "<em>t</em>");
        assert_eq!(render("**t**"), "<strong>t</strong>");
        assert_eq!(render("***t***"), "<strong><em>t</em></strong>");
        assert_eq!(render("_a_ and __b__"), "<em>a</em> and <strong>b</strong>");
    }

    #[test]
    fn emphasis_closer_must_match_run_length() {
        assert_eq!(
            render("*a **b** c*"),
            "<em>a <strong>b</strong> c</em>"
        );
        assert_eq!(render("**foo*"), "*<em>foo</em>");
    }

    #[test]
    fn emphasis_rejects_closer_after_whitespace() {
        assert_eq!(render("*foo *"), "*foo *");
        assert_eq!(render("*foo"), "*foo");
    }

    #[test]
    fn escapes_suppress_markup() {
        assert_eq!(render("\\*x\\*"), "*x*");
        assert_eq!(render("\\<b>"), "&lt;b&gt;");
        assert_eq!(render("a\\b"), "a\\b");
    }

    #[test]
    fn escaped_marker_is_not_a_closer() {
        assert_eq!(render("*a\\*"), "*a*");
    }

    #[test]
    fn strikethrough_needs_both_tildes() {
        assert_eq!(render("~~gone~~"), "<del>gone</del>");
        assert_eq!(render("~~gone~"), "~~gone~");
        let config = Config {
            enable_strikethrough: false,
            ..Config::default()
        };
        assert_eq!(
            render_with("~~gone~~", &config, &ReferenceTable::new()),
            "~~gone~~"
        );
    }

    #[test]
    fn code_span_escapes_and_trims_one_space() {
        assert_eq!(render("` <a> `"), "<code>&lt;a&gt;</code>");
        assert_eq!(render("`  x  `"), "<code> x </code>");
        assert_eq!(
            render("``Code with ` backtick``"),
            "<code>Code with ` backtick</code>"
        );
        assert_eq!(render("`*not em*`"), "<code>*not em*</code>");
    }

    #[test]
    fn code_span_escapes_even_without_escape_html() {
        let config = Config {
            escape_html: false,
            ..Config::default()
        };
        assert_eq!(
            render_with("`<b>` <b>", &config, &ReferenceTable::new()),
            "<code>&lt;b&gt;</code> <b>"
        );
    }

    #[test]
    fn unterminated_code_span_is_literal() {
        assert_eq!(render("`open"), "`open");
    }

    #[test]
    fn images_use_flat_alt_text() {
        assert_eq!(
            render("![*Alt*](pic.png \"Title\")"),
            "<img src=\"pic.png\" alt=\"*Alt*\" title=\"Title\">"
        );
        assert_eq!(render("![broken](pic.png"), "![broken](pic.png");
    }

    #[test]
    fn inline_links_parse_their_text() {
        assert_eq!(
            render("[**bold** link](https://example.com \"Site\")"),
            "<a href=\"https://example.com\" title=\"Site\"><strong>bold</strong> link</a>"
        );
        assert_eq!(render("[x](a&b)"), "<a href=\"a&amp;b\">x</a>");
    }

    #[test]
    fn reference_forms_resolve_through_table() {
        let mut refs = ReferenceTable::new();
        refs.add("ref", "https://example.com", Some("T")).unwrap();
        let config = Config::default();
        let expected = "<a href=\"https://example.com\" title=\"T\">text</a>";
        assert_eq!(render_with("[text][ref]", &config, &refs), expected);
        assert_eq!(render_with("[text][REF]", &config, &refs), expected);
        assert_eq!(
            render_with("[Ref][]", &config, &refs),
            "<a href=\"https://example.com\" title=\"T\">Ref</a>"
        );
        assert_eq!(
            render_with("[ref]", &config, &refs),
            "<a href=\"https://example.com\" title=\"T\">ref</a>"
        );
    }

    #[test]
    fn unresolved_references_stay_literal() {
        assert_eq!(render("[text][missing]"), "[text][missing]");
        assert_eq!(render("[just brackets]"), "[just brackets]");
    }

    #[test]
    fn autolinks_before_raw_markup() {
        assert_eq!(
            render("<https://example.com>"),
            "<a href=\"https://example.com\">https://example.com</a>"
        );
        assert_eq!(
            render("<test@example.com>"),
            "<a href=\"mailto:test@example.com\">test@example.com</a>"
        );
        assert_eq!(
            render("<span class=\"x\">hi</span>"),
            "<span class=\"x\">hi</span>"
        );
    }

    #[test]
    fn disabled_markup_is_escaped() {
        let config = Config {
            enable_autolinks: false,
            enable_inline_html: false,
            ..Config::default()
        };
        assert_eq!(
            render_with("<https://x.io> <b>", &config, &ReferenceTable::new()),
            "&lt;https://x.io&gt; &lt;b&gt;"
        );
    }

    #[test]
    fn newlines_become_spaces_or_breaks() {
        assert_eq!(render("a\nb"), "a b");
        let config = Config {
            hard_line_breaks: true,
            ..Config::default()
        };
        assert_eq!(
            render_with("a\nb", &config, &ReferenceTable::new()),
            "a<br>b"
        );
    }

    #[test]
    fn nesting_ceiling_falls_back_to_text() {
        let config = Config {
            max_nesting_depth: 1,
            ..Config::default()
        };
        assert_eq!(
            render_with("**a *b* c**", &config, &ReferenceTable::new()),
            "<strong>a *b* c</strong>"
        );
        let flat = Config {
            max_nesting_depth: 0,
            ..Config::default()
        };
        assert_eq!(
            render_with("*a* `b`", &flat, &ReferenceTable::new()),
            "*a* <code>b</code>"
        );
    }

    #[test]
    fn scans_stop_at_range_end() {
        let config = Config::default();
        let refs = ReferenceTable::new();
        let mut out = OutputBuffer::new(0).unwrap();
        let mut inline = InlineParser::new(&config, ReferenceScope::parser_only(&refs));
        let text = "*a* b*";
        let end = inline.parse_inline(text, 0, 5, &mut out).unwrap();
        assert_eq!(end, 5);
        assert_eq!(out.as_str(), "<em>a</em> b");
    }

    #[test]
    fn misdirected_construct_parser_reports_invalid_input() {
        let config = Config::default();
        let refs = ReferenceTable::new();
        let mut out = OutputBuffer::new(0).unwrap();
        let mut inline = InlineParser::new(&config, ReferenceScope::parser_only(&refs));
        let err = inline.parse_link("abc", 0, 3, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn destination_splits_title() {
        assert_eq!(split_destination(" a.png "), ("a.png", None));
        assert_eq!(
            split_destination("a.png \"A \"quoted\" title\""),
            ("a.png", Some("A \"quoted\" title"))
        );
        assert_eq!(split_destination("a.png \"\""), ("a.png", None));
    }

    #[test]
    fn long_runs_of_unclosed_openers_render_literally() {
        let stars = "*a ".repeat(20_000);
        assert_eq!(render(&stars), stars);
        let brackets = "[".repeat(40_000);
        assert_eq!(render(&brackets), brackets);
        let dangling = "[a](".repeat(10_000);
        assert_eq!(render(&dangling), dangling);
        assert_eq!(render(&"<a".repeat(10_000)), "&lt;a".repeat(10_000));
    }

    #[test]
    fn brackets_pair_innermost_first() {
        let mut refs = ReferenceTable::new();
        refs.add("a", "/a", None).unwrap();
        let config = Config::default();
        assert_eq!(
            render_with("[[a]", &config, &refs),
            "[<a href=\"/a\">a</a>"
        );
        assert_eq!(render("[x [y] z](/u)"), "<a href=\"/u\">x [y] z</a>");
        assert_eq!(render("[x \\] y](/u)"), "<a href=\"/u\">x ] y</a>");
    }

    #[test]
    fn reused_parser_starts_each_range_fresh() {
        let config = Config::default();
        let refs = ReferenceTable::new();
        let mut inline = InlineParser::new(&config, ReferenceScope::parser_only(&refs));
        let mut out = OutputBuffer::new(0).unwrap();
        inline.parse_inline("*a [b", 0, 5, &mut out).unwrap();
        out.append("|").unwrap();
        inline.parse_inline("[c](/d) *e*", 0, 11, &mut out).unwrap();
        assert_eq!(out.as_str(), "*a [b|<a href=\"/d\">c</a> <em>e</em>");
    }

    #[test]
    fn multibyte_text_passes_through() {
        assert_eq!(render("héllo → *wörld*"), "héllo → <em>wörld</em>");
    }
}
