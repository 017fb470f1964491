use std::borrow::Cow;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::buffer::OutputBuffer;
use crate::error::{Error, Result};
use crate::escape::append_escaped;
use crate::parser::Parser;

const DOCUMENT_HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n";
const BODY_OPEN: &str = "</head>\n<body>\n";
const DOCUMENT_TAIL: &str = "</body>\n</html>\n";

fn append_head(out: &mut OutputBuffer, css_path: Option<&str>) -> Result<()> {
    out.append(DOCUMENT_HEAD)?;
    if let Some(css) = css_path.filter(|css| !css.is_empty()) {
        out.append("<link rel=\"stylesheet\" href=\"")?;
        append_escaped(out, css)?;
        out.append("\">\n")?;
    }
    out.append(BODY_OPEN)
}

/// Wraps an already rendered HTML body in the standalone document shell.
pub fn render_document(body: &str, css_path: Option<&str>) -> Result<String> {
    let shell = DOCUMENT_HEAD.len() + BODY_OPEN.len() + DOCUMENT_TAIL.len();
    let mut out = OutputBuffer::new(body.len() + shell + 1)?;
    append_head(&mut out, css_path)?;
    out.append(body)?;
    out.append(DOCUMENT_TAIL)?;
    Ok(out.into_string())
}

fn render_with(parser: &mut Parser, markdown: &str, css_path: Option<&str>) -> Result<String> {
    let mut out = OutputBuffer::new(parser.config().initial_buffer_size)?;
    append_head(&mut out, css_path)?;
    parser.parse(markdown, &mut out)?;
    out.append(DOCUMENT_TAIL)?;
    Ok(out.into_string())
}

/// Converts `markdown` into a complete HTML document using a fresh parser
/// with the default configuration.
pub fn convert_to_html(markdown: &str, css_path: Option<&str>) -> Result<String> {
    render_with(&mut Parser::default(), markdown, css_path)
}

/// Like [`convert_to_html`], but writes the document and a NUL terminator
/// into `output`. Returns the document length.
pub fn convert_to_html_into(
    markdown: &str,
    css_path: Option<&str>,
    output: &mut [u8],
) -> Result<usize> {
    if output.is_empty() {
        return Err(Error::InvalidSize(0));
    }
    let html = convert_to_html(markdown, css_path)?;
    let needed = html.len() + 1;
    if needed > output.len() {
        return Err(Error::BufferTooSmall {
            needed,
            available: output.len(),
        });
    }
    output[..html.len()].copy_from_slice(html.as_bytes());
    output[html.len()] = 0;
    Ok(html.len())
}

/// Converts the Markdown file at `input` into a standalone document at
/// `output`. Bytes that are not valid UTF-8 become U+FFFD.
pub fn convert_file_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    css_path: Option<&str>,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    let bytes = fs::read(input).map_err(|err| Error::io(input, err))?;
    let markdown = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = markdown {
        warn!(input = %input.display(), "input is not valid UTF-8; invalid bytes replaced");
    }
    let html = convert_to_html(&markdown, css_path)?;
    fs::write(output, &html).map_err(|err| Error::io(output, err))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        bytes = html.len(),
        "converted markdown file"
    );
    Ok(())
}

/// Converts each `(input, output)` pair in order. Stops at the first failure
/// and returns its error; files converted before it are left in place.
pub fn convert_files_to_files<I, O>(pairs: &[(I, O)], css_path: Option<&str>) -> Result<()>
where
    I: AsRef<Path>,
    O: AsRef<Path>,
{
    if pairs.is_empty() {
        return Err(Error::MissingArgument("pairs"));
    }
    for (index, (input, output)) in pairs.iter().enumerate() {
        if let Err(err) = convert_file_to_file(input, output, css_path) {
            warn!(
                index,
                input = %input.as_ref().display(),
                error = %err,
                "batch conversion stopped"
            );
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{convert_to_html, convert_to_html_into, render_document};
    use crate::error::ErrorKind;

    #[test]
    fn empty_markdown_is_a_bare_shell() {
        assert_eq!(
            convert_to_html("", None).unwrap(),
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body>\n</body>\n</html>\n"
        );
    }

    #[test]
    fn stylesheet_href_is_escaped() {
        let html = convert_to_html("x", Some("a\"b.css")).unwrap();
        assert!(html.contains("<link rel=\"stylesheet\" href=\"a&quot;b.css\">\n</head>"));
        assert!(!convert_to_html("x", Some("")).unwrap().contains("<link"));
    }

    #[test]
    fn render_document_matches_convert() {
        let wrapped = render_document("<p>x</p>\n", Some("s.css")).unwrap();
        assert_eq!(wrapped, convert_to_html("x", Some("s.css")).unwrap());
    }

    #[test]
    fn fixed_size_conversion() {
        let expected = convert_to_html("*a*", None).unwrap();
        let mut buffer = vec![0xffu8; expected.len() + 1];
        let len = convert_to_html_into("*a*", None, &mut buffer).unwrap();
        assert_eq!(&buffer[..len], expected.as_bytes());
        assert_eq!(buffer[len], 0);

        let mut short = vec![0u8; expected.len()];
        let err = convert_to_html_into("*a*", None, &mut short).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferTooSmall);

        let err = convert_to_html_into("*a*", None, &mut []).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSize);
    }
}
