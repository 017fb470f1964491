pub const E_UNCLOSED_FENCE: &str = "E_UNCLOSED_FENCE";

const FENCE_MARKER: &[u8] = b"```";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// 1-based line of the offending marker.
    pub line: usize,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            line,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Validation {
    pub valid: bool,
    pub diagnostic: Option<Diagnostic>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Checks that backtick fence markers come in pairs.
pub fn validate(markdown: &str) -> Validation {
    let bytes = markdown.as_bytes();
    let mut markers = 0usize;
    let mut line = 1;
    let mut last_marker_line = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos..].starts_with(FENCE_MARKER) {
            markers += 1;
            last_marker_line = line;
            pos += FENCE_MARKER.len();
            continue;
        }
        if bytes[pos] == b'\n' {
            line += 1;
        }
        pos += 1;
    }

    if markers % 2 == 1 {
        return Validation {
            valid: false,
            diagnostic: Some(Diagnostic::new(
                last_marker_line,
                E_UNCLOSED_FENCE,
                "Unclosed code fence",
            )),
        };
    }
    Validation {
        valid: true,
        diagnostic: None,
    }
}
