use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Identity mismatch for {name}: declared {declared:#010x}, inferred {inferred:#010x}")]
    IdentityMismatch {
        name:     String,
        declared: u32,
        inferred: u32,
    },

    #[error("Encode error: {0}")]
    EncodeError(String),
}

impl TlError {
    /// A parse failure that is not tied to a position in a source.
    pub fn grammar(msg: impl Into<String>) -> Self {
        TlError::ParseError {
            msg:    msg.into(),
            line:   0,
            column: 0,
        }
    }

    /// Attach a line number to a positionless parse failure.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            TlError::ParseError { msg, line: 0, .. } => TlError::ParseError { msg, line, column: 1 },
            other => other,
        }
    }
}

impl From<serde_json::Error> for TlError {
    fn from(e: serde_json::Error) -> Self {
        TlError::ParseError {
            msg:    e.to_string(),
            line:   e.line(),
            column: e.column(),
        }
    }
}
