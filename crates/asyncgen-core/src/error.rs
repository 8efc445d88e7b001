use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single transform run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The parser rejected the input. Line and column are 1-based.
    #[error("SyntaxError: {message} ({line}:{column})")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },

    /// A lexical particle a rewrite depends on was not where the tree said it would be.
    #[error("expected `{expected}` near offset {offset}")]
    MissingToken { expected: &'static str, offset: u32 },

    /// A construct that cannot be expressed through the rewrite.
    #[error("unsupported {construct} in async function ({line}:{column})")]
    Unsupported {
        construct: &'static str,
        line: u32,
        column: u32,
    },
}

impl TransformError {
    #[must_use]
    pub fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    #[must_use]
    pub fn missing(expected: &'static str, offset: u32) -> Self {
        Self::MissingToken { expected, offset }
    }

    /// Short machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "ASYNCGEN_SYNTAX_ERROR",
            Self::MissingToken { .. } => "ASYNCGEN_MISSING_TOKEN",
            Self::Unsupported { .. } => "ASYNCGEN_UNSUPPORTED",
        }
    }
}

/// Host and configuration errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid glob pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to transform {path}: {source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = TransformError::syntax("Unexpected token", 3, 7);
        assert_eq!(err.to_string(), "SyntaxError: Unexpected token (3:7)");
        assert_eq!(err.code(), "ASYNCGEN_SYNTAX_ERROR");

        let err = TransformError::missing("=>", 12);
        assert_eq!(err.to_string(), "expected `=>` near offset 12");
    }

    #[test]
    fn test_host_error_wraps_transform_error() {
        let err = Error::Transform {
            path: PathBuf::from("src/a.js"),
            source: TransformError::Unsupported {
                construct: "compound assignment to computed super member",
                line: 1,
                column: 20,
            },
        };
        assert_eq!(
            err.to_string(),
            "Failed to transform src/a.js: unsupported compound assignment to computed super member in async function (1:20)"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
