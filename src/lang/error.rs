//! Error types shared by the lexer, parser and interpreter.

/// A failure that aborts a run.
///
/// Every error carries a human-readable message and, when known, the source
/// line it originated from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("[line {line}] LexError: {message}")]
    Lex { message: String, line: usize },

    #[error("[line {line}] ParseError: {message}")]
    Parse { message: String, line: usize },

    #[error("{}RuntimeError: {message}", line_prefix(.line))]
    Runtime { message: String, line: Option<usize> },
}

fn line_prefix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("[line {line}] "),
        None => String::new(),
    }
}

impl Error {
    pub fn lex(message: impl Into<String>, line: usize) -> Self {
        Self::Lex {
            message: message.into(),
            line,
        }
    }

    pub fn parse(message: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
        }
    }

    /// A runtime error whose line is not known at the raise site.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            line: None,
        }
    }

    pub fn runtime_at(message: impl Into<String>, line: usize) -> Self {
        Self::Runtime {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Stamp a line onto a runtime error that does not have one yet.
    pub fn at_line(self, at: usize) -> Self {
        match self {
            Self::Runtime {
                message,
                line: None,
            } => Self::Runtime {
                message,
                line: Some(at),
            },
            other => other,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. } | Self::Parse { message, .. } | Self::Runtime { message, .. } => {
                message
            }
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lex { line, .. } | Self::Parse { line, .. } => Some(*line),
            Self::Runtime { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_kind() {
        let err = Error::lex("unterminated string", 3);
        assert_eq!(err.to_string(), "[line 3] LexError: unterminated string");
    }

    #[test]
    fn runtime_without_line_has_no_prefix() {
        let err = Error::runtime("undefined variable 'X'");
        assert_eq!(err.to_string(), "RuntimeError: undefined variable 'X'");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn at_line_fills_missing_line_only() {
        let err = Error::runtime("boom").at_line(7);
        assert_eq!(err.line(), Some(7));

        let precise = Error::runtime_at("boom", 2).at_line(7);
        assert_eq!(precise.line(), Some(2));

        let parse = Error::parse("expected ','", 4).at_line(9);
        assert_eq!(parse.line(), Some(4));
    }
}
