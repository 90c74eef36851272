//! Error types for argument schemas and binding.

use thiserror::Error;

/// Errors that can occur while binding tokens to a schema.
#[derive(Debug, Error)]
pub enum BindError {
    /// Too few or too many tokens.
    #[error("Expected {min} to {max} arguments, got {actual}")]
    Arity {
        min: usize,
        max: usize,
        actual: usize,
    },

    /// `name=value` where `name` is not an optional parameter.
    #[error("Unknown argument name `{0}`")]
    UnknownArgument(String),

    /// The same parameter was given twice.
    #[error("Argument `{0}` was given more than once")]
    DuplicateArgument(String),

    /// A bare token followed a `name=value` token.
    #[error("Positional argument `{0}` cannot follow a named argument")]
    PositionalAfterNamed(String),

    /// The cast function rejected the raw token.
    #[error("Invalid value for `{name}`: {cause}")]
    Cast { name: String, cause: anyhow::Error },
}

/// Errors detected while declaring a schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Argument `{0}` is declared more than once")]
    DuplicateName(String),

    /// A custom type was declared without a cast function.
    #[error("Argument `{0}` has a custom type but no cast function")]
    MissingCast(String),
}

/// Result type for binding operations.
pub type BindResult<T> = Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_display() {
        let err = BindError::Arity {
            min: 1,
            max: 2,
            actual: 0,
        };
        assert_eq!(err.to_string(), "Expected 1 to 2 arguments, got 0");
    }

    #[test]
    fn test_cast_error_reports_cause_once() {
        let parse_err = "x".parse::<i64>().unwrap_err();
        let err = BindError::Cast {
            name: "n".to_string(),
            cause: parse_err.clone().into(),
        };
        assert_eq!(err.to_string(), format!("Invalid value for `n`: {parse_err}"));
        assert!(std::error::Error::source(&err).is_none());
        match err {
            BindError::Cast { cause, .. } => {
                assert!(cause.downcast_ref::<std::num::ParseIntError>().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
