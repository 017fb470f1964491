use std::mem;

use tracing::debug;

use crate::block::{collect_definitions, render_blocks};
use crate::buffer::OutputBuffer;
use crate::config::Config;
use crate::error::Result;
use crate::inline::InlineParser;
use crate::reference::{ReferenceScope, ReferenceTable};

const MAX_LINE_LENGTH: usize = 1024;

/// A reusable Markdown renderer.
///
/// The parser owns its configuration, a reference link table and a scratch
/// line buffer. Reference links added through [`Parser::add_reference_link`]
/// live until [`Parser::clear_reference_links`]; definitions found in a
/// document only apply to that document's parse.
#[derive(Debug)]
pub struct Parser {
    config: Config,
    refs: ReferenceTable,
    line_buffer: String,
}

impl Parser {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            refs: ReferenceTable::new(),
            line_buffer: String::with_capacity(MAX_LINE_LENGTH),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reference_links(&self) -> &ReferenceTable {
        &self.refs
    }

    pub fn add_reference_link(&mut self, label: &str, url: &str, title: Option<&str>) -> Result<()> {
        self.refs.add(label, url, title)
    }

    pub fn clear_reference_links(&mut self) {
        self.refs.clear();
    }

    /// Appends the HTML body for `markdown` to `out`.
    pub fn parse(&mut self, markdown: &str, out: &mut OutputBuffer) -> Result<()> {
        let before = out.len();
        let mut document_refs = ReferenceTable::new();
        let definitions = collect_definitions(markdown, &mut document_refs)?;
        debug!(
            bytes = markdown.len(),
            definitions, "parsing markdown document"
        );

        let mut scratch = mem::take(&mut self.line_buffer);
        let scope = ReferenceScope::new(&document_refs, &self.refs);
        let result = render_blocks(markdown, &self.config, scope, &mut scratch, out);
        self.line_buffer = scratch;
        let lines = result?;
        debug!(lines, output = out.len() - before, "parse finished");
        Ok(())
    }

    /// Renders `text` as a single inline run, with no block structure.
    pub fn parse_inline(&self, text: &str, out: &mut OutputBuffer) -> Result<()> {
        let mut inline = InlineParser::new(&self.config, ReferenceScope::parser_only(&self.refs));
        inline.parse_inline(text, 0, text.len(), out)?;
        Ok(())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Builds a parser from `config`, or from the defaults when none is given.
pub fn create_parser(config: Option<Config>) -> Parser {
    Parser::new(config.unwrap_or_default())
}
