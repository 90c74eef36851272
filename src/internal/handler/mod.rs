//! Chained command handlers.
//!
//! Commands are matched token by token down a tree of [`CommandNode`]s.
//! `/plan add "daily report"` reaches the `add` leaf under the `/plan`
//! router with the tokens `["daily report"]`.

pub mod error;
pub mod node;
pub mod verdict;

pub use error::{ConstructionError, HandleError, HandleResult};
pub use node::{CATCH_ALL, Callback, CommandBuilder, CommandNode, NodeKind};
pub use verdict::{DispatchPath, Match, MatchVerdict, PathStep};
