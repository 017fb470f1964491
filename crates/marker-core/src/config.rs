pub const DEFAULT_BUFFER_SIZE: usize = 4096;
pub const MAX_NESTING_DEPTH: usize = 32;

/// Feature toggles copied into a [`Parser`](crate::Parser) when it is created.
///
/// Turning a feature off never produces an error; its syntax is emitted as
/// ordinary text instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub enable_tables: bool,
    pub enable_strikethrough: bool,
    pub enable_task_lists: bool,
    pub enable_autolinks: bool,
    pub enable_inline_html: bool,
    pub escape_html: bool,
    /// Reserved; quotes are never rewritten.
    pub smart_quotes: bool,
    pub hard_line_breaks: bool,
    /// Deepest emphasis/strikethrough/link nesting rendered as markup. Deeper
    /// markers are emitted as text.
    pub max_nesting_depth: usize,
    pub initial_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_tables: true,
            enable_strikethrough: true,
            enable_task_lists: true,
            enable_autolinks: true,
            enable_inline_html: true,
            escape_html: true,
            smart_quotes: false,
            hard_line_breaks: false,
            max_nesting_depth: MAX_NESTING_DEPTH,
            initial_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

pub fn configure_defaults() -> Config {
    Config::default()
}
