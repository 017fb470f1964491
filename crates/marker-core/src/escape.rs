use crate::buffer::OutputBuffer;
use crate::error::{Error, Result};

const HTML_ENTITIES: &[(char, &str)] = &[
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#39;"),
];

fn entity_for(ch: char) -> Option<&'static str> {
    HTML_ENTITIES
        .iter()
        .find(|(needle, _)| *needle == ch)
        .map(|(_, entity)| *entity)
}

/// Replaces `& < > " '` with their entities. Not idempotent: `&amp;`
/// becomes `&amp;amp;`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match entity_for(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Fixed-size variant: writes the escaped text plus a NUL terminator into
/// `output` and returns the escaped length.
pub fn escape_html_into(text: &str, output: &mut [u8]) -> Result<usize> {
    if output.is_empty() {
        return Err(Error::InvalidSize(0));
    }
    let escaped = escape_html(text);
    let needed = escaped.len() + 1;
    if needed > output.len() {
        return Err(Error::BufferTooSmall {
            needed,
            available: output.len(),
        });
    }
    output[..escaped.len()].copy_from_slice(escaped.as_bytes());
    output[escaped.len()] = 0;
    Ok(escaped.len())
}

pub(crate) fn append_escaped(out: &mut OutputBuffer, text: &str) -> Result<()> {
    let mut plain_start = 0;
    for (idx, ch) in text.char_indices() {
        if let Some(entity) = entity_for(ch) {
            out.append(&text[plain_start..idx])?;
            out.append(entity)?;
            plain_start = idx + ch.len_utf8();
        }
    }
    out.append(&text[plain_start..])
}

/// Escapes only when `escape` is set, otherwise copies verbatim.
pub(crate) fn append_text(out: &mut OutputBuffer, text: &str, escape: bool) -> Result<()> {
    if escape {
        append_escaped(out, text)
    } else {
        out.append(text)
    }
}
