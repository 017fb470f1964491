use crate::error::{Error, Result};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferenceLink {
    pub label: String,
    pub url: String,
    pub title: Option<String>,
}

/// Label → destination map for reference-style links.
///
/// Lookup walks from the most recent insertion backwards, so a label defined
/// twice resolves to its latest definition.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    entries: Vec<ReferenceLink>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str, url: &str, title: Option<&str>) -> Result<()> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Error::MissingArgument("label"));
        }
        if url.is_empty() {
            return Err(Error::MissingArgument("url"));
        }
        self.entries.try_reserve(1)?;
        self.entries.push(ReferenceLink {
            label: label.to_string(),
            url: url.to_string(),
            title: title.map(str::to_string),
        });
        Ok(())
    }

    pub fn find(&self, label: &str) -> Option<&ReferenceLink> {
        let label = label.trim();
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.label.eq_ignore_ascii_case(label))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceLink> {
        self.entries.iter()
    }
}

/// Lookup view used while rendering: a document's own definitions first,
/// then the entries registered on the parser.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReferenceScope<'a> {
    document: Option<&'a ReferenceTable>,
    parser: &'a ReferenceTable,
}

impl<'a> ReferenceScope<'a> {
    pub(crate) fn new(document: &'a ReferenceTable, parser: &'a ReferenceTable) -> Self {
        Self {
            document: Some(document),
            parser,
        }
    }

    pub(crate) fn parser_only(parser: &'a ReferenceTable) -> Self {
        Self {
            document: None,
            parser,
        }
    }

    pub(crate) fn find(&self, label: &str) -> Option<&'a ReferenceLink> {
        self.document
            .and_then(|document| document.find(label))
            .or_else(|| self.parser.find(label))
    }
}

/// A `[label]: url ["title"]` line, already trimmed.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct Definition<'a> {
    pub label: &'a str,
    pub url: &'a str,
    pub title: Option<&'a str>,
}

/// Recognises a definition line. Returns `None` for lines that are not
/// definition-shaped; a shaped line with empty parts still matches so the
/// caller can swallow it.
pub(crate) fn parse_definition(line: &str) -> Option<Definition<'_>> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let label = &rest[..close];
    let after = rest[close + 1..].strip_prefix(':')?;
    let after = after.trim_start_matches([' ', '\t']);
    let url_end = after
        .find(|ch: char| ch.is_ascii_whitespace())
        .unwrap_or(after.len());
    let url = &after[..url_end];
    let tail = after[url_end..].trim_start_matches([' ', '\t']);
    let title = tail.strip_prefix('"').and_then(|quoted| {
        let end = quoted.rfind('"')?;
        Some(&quoted[..end])
    });
    Some(Definition { label, url, title })
}
