//! Error types for the evaluation engine
//!
//! Scorers never return these: a degenerate sequence pair maps to the metric's
//! floor value instead. Errors are reserved for caller-level failures such as
//! batch preconditions, bad bootstrap parameters and beat-list I/O.

use std::fmt;

/// Errors that can occur around an evaluation run
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Invalid input parameters or violated batch preconditions
    InvalidInput(String),

    /// A beat list could not be parsed
    ParseError(String),

    /// Reading or writing a beat list failed
    IoError(String),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            EvaluationError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            EvaluationError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for EvaluationError {}

impl From<std::io::Error> for EvaluationError {
    fn from(err: std::io::Error) -> Self {
        EvaluationError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = EvaluationError::InvalidInput("not enough annotations".to_string());
        assert_eq!(err.to_string(), "Invalid input: not enough annotations");

        let err = EvaluationError::ParseError("line 3: 'abc'".to_string());
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        let err: EvaluationError = io.into();
        assert!(matches!(err, EvaluationError::IoError(ref msg) if msg.contains("missing.txt")));
    }
}
