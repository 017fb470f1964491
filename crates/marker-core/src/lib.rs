mod block;
mod buffer;
mod config;
mod document;
mod error;
mod escape;
mod inline;
mod parser;
mod reference;
mod sanitize;
mod validate;

pub use buffer::OutputBuffer;
pub use config::{Config, DEFAULT_BUFFER_SIZE, MAX_NESTING_DEPTH, configure_defaults};
pub use document::{
    convert_file_to_file, convert_files_to_files, convert_to_html, convert_to_html_into,
    render_document,
};
pub use error::{
    E_BUFFER_TOO_SMALL, E_INVALID_INPUT, E_INVALID_SIZE, E_IO, E_MEMORY_ALLOCATION,
    E_MISSING_ARGUMENT, E_PARSE_FAILED, Error, ErrorKind, Result,
};
pub use escape::{escape_html, escape_html_into};
pub use parser::{Parser, create_parser};
pub use reference::{ReferenceLink, ReferenceTable};
pub use sanitize::sanitize_html;
pub use validate::{Diagnostic, E_UNCLOSED_FENCE, Validation, validate};

/// Crate version as recorded at build time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
