//! Argument binding: raw tokens to typed values according to a declared schema.

pub mod cast;
pub mod error;
pub mod schema;
pub mod value;

pub use cast::Cast;
pub use error::{BindError, BindResult, SchemaError};
pub use schema::{ArgumentSchema, BoundArguments, DefaultValue, SchemaBuilder};
pub use value::{ArgType, ArgValue, FromArgValue};
