//! Routing engine internals: tokenizer, filters, command trees, argument binding,
//! handler groups and declarative configuration.

pub mod args;
pub mod config;
pub mod dispatcher;
pub mod filters;
pub mod handler;
pub mod message;
pub mod tokenizer;
