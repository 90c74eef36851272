//! Error types for building and running command trees.

use thiserror::Error;

use crate::internal::args::BindError;

/// Invalid command tree declarations. Raised while building, never recovered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstructionError {
    /// Command does not match `^/?[a-z0-9_-]{1,32}$`.
    #[error("Command `{0}` is not a valid bot command")]
    InvalidCommand(String),

    #[error("A command node needs at least one command")]
    NoCommands,

    #[error("One and only one of callback and sub commands should be provided")]
    CallbackXorChildren,

    #[error("A default handler is only allowed alongside sub commands")]
    DefaultWithoutChildren,

    #[error("Filters are not supported on the empty catch-all command")]
    FilterOnCatchAll,

    #[error("The empty catch-all command cannot have sub commands")]
    ChildrenOnCatchAll,

    #[error("An argument schema is only allowed on a node with a callback")]
    SchemaWithoutCallback,
}

/// Errors raised while handling a matched verdict.
#[derive(Debug, Error)]
pub enum HandleError {
    /// The verdict's path does not fit this tree.
    #[error("Verdict does not belong to this command tree: {0}")]
    ForeignVerdict(String),

    /// The leaf's argument schema rejected the tokens.
    #[error("{cause}")]
    Bind {
        /// `Usage: ...` text of the leaf, empty if none was declared.
        usage: String,
        cause: BindError,
    },
}

impl HandleError {
    /// Message suitable for replying to the sender: the error followed by the
    /// usage line when one exists.
    pub fn user_message(&self) -> String {
        match self {
            HandleError::Bind { usage, cause } if !usage.is_empty() => {
                format!("{cause}\n{usage}")
            }
            other => other.to_string(),
        }
    }
}

/// Result type for handling operations.
pub type HandleResult<T> = Result<T, HandleError>;
