//! Chained text-command routing for conversational bots.
//!
//! A message such as `/plan add "daily report" count=3` is matched against a
//! tree of commands and sub commands, the remaining text is split into
//! tokens, and the handling leaf can bind those tokens to typed values.

pub mod cli;
pub mod command;
pub mod internal;

pub use internal::args::{
    ArgType, ArgValue, ArgumentSchema, BindError, BoundArguments, Cast, DefaultValue,
    FromArgValue, SchemaError,
};
pub use internal::config::{CallbackRegistry, ConfigError, TreeConfig, load_tree_config};
pub use internal::dispatcher::{DEFAULT_GROUP, Dispatcher, TreeVerdict};
pub use internal::filters::{Filter, FilterData, FilterResult};
pub use internal::handler::{
    CommandNode, ConstructionError, DispatchPath, HandleError, Match, MatchVerdict, PathStep,
};
pub use internal::message::{CallbackContext, Message};
pub use internal::tokenizer::tokenize;
