//! Argument schemas and the token binder.
//!
//! A schema lists required parameters, bound positionally, followed by
//! optional parameters that may be given positionally (in declaration order)
//! or as `name=value`. Once a named argument appears, no more positional
//! arguments are accepted.
//!
//! ```
//! use chaincmd::{ArgType, ArgumentSchema, DefaultValue};
//!
//! let schema = ArgumentSchema::builder()
//!     .required("amount", ArgType::Float)
//!     .optional("unit", ArgType::Str, DefaultValue::value("g"))
//!     .build()
//!     .unwrap();
//!
//! let bound = schema.bind(&["5".to_string(), "unit=kg".to_string()]).unwrap();
//! assert_eq!(bound.get::<f64>("amount"), Some(5.0));
//! assert_eq!(bound.get::<String>("unit").as_deref(), Some("kg"));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::cast::Cast;
use super::error::{BindError, BindResult, SchemaError};
use super::value::{ArgType, ArgValue, FromArgValue};

type Provider = dyn Fn() -> ArgValue + Send + Sync;

/// Value an optional parameter takes when it isn't given.
#[derive(Clone)]
pub enum DefaultValue {
    /// Binds [`ArgValue::Null`].
    Absent,
    Value(ArgValue),
    /// Evaluated every time a schema is bound, not when it is declared.
    Lazy(Arc<Provider>),
}

impl DefaultValue {
    pub fn value(value: impl Into<ArgValue>) -> Self {
        DefaultValue::Value(value.into())
    }

    pub fn lazy<F>(provider: F) -> Self
    where
        F: Fn() -> ArgValue + Send + Sync + 'static,
    {
        DefaultValue::Lazy(Arc::new(provider))
    }

    fn resolve(&self) -> ArgValue {
        match self {
            DefaultValue::Absent => ArgValue::Null,
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Lazy(provider) => provider(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Absent => f.write_str("Absent"),
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

#[derive(Debug, Clone)]
struct RequiredParam {
    name: String,
    ty: ArgType,
    cast: Cast,
}

#[derive(Debug, Clone)]
struct OptionalParam {
    name: String,
    ty: ArgType,
    default: DefaultValue,
    cast: Cast,
}

/// Declared parameters of a command, in order.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSchema {
    usage: Option<String>,
    required: Vec<RequiredParam>,
    optional: Vec<OptionalParam>,
}

/// Builder for [`ArgumentSchema`]. Declaration order is preserved.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    usage: Option<String>,
    required: Vec<RequiredParam>,
    optional: Vec<OptionalParam>,
    missing_cast: Option<String>,
}

impl SchemaBuilder {
    /// Text describing the command, e.g. `/sub now <channel> [detail]`.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Required parameter using the standard cast for `ty`.
    pub fn required(self, name: impl Into<String>, ty: ArgType) -> Self {
        let name = name.into();
        match Cast::for_type(&ty) {
            Some(cast) => self.required_with(name, ty, cast),
            None => self.record_missing_cast(name),
        }
    }

    pub fn required_with(mut self, name: impl Into<String>, ty: ArgType, cast: Cast) -> Self {
        self.required.push(RequiredParam {
            name: name.into(),
            ty,
            cast,
        });
        self
    }

    /// Optional parameter using the standard cast for `ty`.
    pub fn optional(self, name: impl Into<String>, ty: ArgType, default: DefaultValue) -> Self {
        let name = name.into();
        match Cast::for_type(&ty) {
            Some(cast) => self.optional_with(name, ty, default, cast),
            None => self.record_missing_cast(name),
        }
    }

    pub fn optional_with(
        mut self,
        name: impl Into<String>,
        ty: ArgType,
        default: DefaultValue,
        cast: Cast,
    ) -> Self {
        self.optional.push(OptionalParam {
            name: name.into(),
            ty,
            default,
            cast,
        });
        self
    }

    fn record_missing_cast(mut self, name: String) -> Self {
        self.missing_cast.get_or_insert(name);
        self
    }

    pub fn build(self) -> Result<ArgumentSchema, SchemaError> {
        if let Some(name) = self.missing_cast {
            return Err(SchemaError::MissingCast(name));
        }
        let mut seen = HashSet::new();
        let names = self
            .required
            .iter()
            .map(|p| &p.name)
            .chain(self.optional.iter().map(|p| &p.name));
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateName(name.clone()));
            }
        }
        Ok(ArgumentSchema {
            usage: self.usage,
            required: self.required,
            optional: self.optional,
        })
    }
}

impl ArgumentSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// `Usage: <text>` if usage text was declared, otherwise empty.
    pub fn usage(&self) -> String {
        self.usage
            .as_ref()
            .map(|text| format!("Usage: {text}"))
            .unwrap_or_default()
    }

    /// Usage text generated from the declared parameters,
    /// e.g. `<amount:float> [unit:str]`.
    pub fn synopsis(&self) -> String {
        let required = self.required.iter().map(|p| format!("<{}:{}>", p.name, p.ty));
        let optional = self.optional.iter().map(|p| format!("[{}:{}]", p.name, p.ty));
        required.chain(optional).collect::<Vec<_>>().join(" ")
    }

    pub fn min_args(&self) -> usize {
        self.required.len()
    }

    pub fn max_args(&self) -> usize {
        self.required.len() + self.optional.len()
    }

    /// Whether `len` tokens are acceptable for this schema.
    pub fn check_arg_len(&self, len: usize) -> bool {
        (self.min_args()..=self.max_args()).contains(&len)
    }

    /// Parameter names, required first, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.optional.iter().map(|p| p.name.as_str()))
    }

    /// Bind raw tokens to the declared parameters.
    pub fn bind<S: AsRef<str>>(&self, tokens: &[S]) -> BindResult<BoundArguments> {
        if !self.check_arg_len(tokens.len()) {
            return Err(BindError::Arity {
                min: self.min_args(),
                max: self.max_args(),
                actual: tokens.len(),
            });
        }

        let (positional, rest) = tokens.split_at(self.required.len());
        let mut values = Vec::with_capacity(self.max_args());
        for (param, token) in self.required.iter().zip(positional) {
            values.push((param.name.clone(), cast(&param.name, &param.cast, token.as_ref())?));
        }

        let mut optional: Vec<Option<ArgValue>> = vec![None; self.optional.len()];
        let mut named_mode = false;
        for token in rest {
            let token = token.as_ref();
            if let Some((name, raw)) = token.split_once('=') {
                let index = self
                    .optional
                    .iter()
                    .position(|p| p.name == name)
                    .ok_or_else(|| unknown_or_duplicate(self, name))?;
                if optional[index].is_some() {
                    return Err(BindError::DuplicateArgument(name.to_string()));
                }
                let param = &self.optional[index];
                optional[index] = Some(cast(&param.name, &param.cast, raw)?);
                named_mode = true;
            } else if named_mode {
                return Err(BindError::PositionalAfterNamed(token.to_string()));
            } else {
                // Positional tokens come before any named ones and never
                // outnumber the optional parameters, so a free slot exists.
                let index = optional
                    .iter()
                    .position(Option::is_none)
                    .ok_or(BindError::Arity {
                        min: self.min_args(),
                        max: self.max_args(),
                        actual: tokens.len(),
                    })?;
                let param = &self.optional[index];
                optional[index] = Some(cast(&param.name, &param.cast, token)?);
            }
        }

        for (param, value) in self.optional.iter().zip(optional) {
            let value = value.unwrap_or_else(|| param.default.resolve());
            values.push((param.name.clone(), value));
        }
        Ok(BoundArguments { values })
    }
}

fn cast(name: &str, cast: &Cast, raw: &str) -> BindResult<ArgValue> {
    cast.apply(raw).map_err(|cause| BindError::Cast {
        name: name.to_string(),
        cause,
    })
}

/// Naming a required parameter in `name=value` form counts as giving it twice.
fn unknown_or_duplicate(schema: &ArgumentSchema, name: &str) -> BindError {
    if schema.required.iter().any(|p| p.name == name) {
        BindError::DuplicateArgument(name.to_string())
    } else {
        BindError::UnknownArgument(name.to_string())
    }
}

/// Values produced by [`ArgumentSchema::bind`]: required parameters first,
/// then optional ones, each in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArguments {
    values: Vec<(String, ArgValue)>,
}

impl BoundArguments {
    /// Typed value of a parameter, `None` if absent or of another type.
    pub fn get<T: FromArgValue>(&self, name: &str) -> Option<T> {
        self.value(name).and_then(T::from_arg_value)
    }

    pub fn value(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values alone, in schema order.
    pub fn into_values(self) -> Vec<ArgValue> {
        self.values.into_iter().map(|(_, value)| value).collect()
    }
}

impl std::ops::Index<usize> for BoundArguments {
    type Output = ArgValue;

    fn index(&self, index: usize) -> &ArgValue {
        &self.values[index].1
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn weigh_schema() -> ArgumentSchema {
        ArgumentSchema::builder()
            .required("amount", ArgType::Float)
            .optional("unit", ArgType::Str, DefaultValue::value("g"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_required_int() {
        let schema = ArgumentSchema::builder()
            .required("n", ArgType::Int)
            .build()
            .unwrap();
        let bound = schema.bind(&tokens(&["3"])).unwrap();
        assert_eq!(bound.into_values(), vec![ArgValue::Int(3)]);

        let err = schema.bind::<String>(&[]).unwrap_err();
        assert!(matches!(err, BindError::Arity { min: 1, max: 1, actual: 0 }));
    }

    #[test]
    fn test_named_optional_and_default() {
        let schema = weigh_schema();
        let bound = schema.bind(&tokens(&["5", "unit=kg"])).unwrap();
        assert_eq!(
            bound.into_values(),
            vec![ArgValue::Float(5.0), ArgValue::Str("kg".into())]
        );
        let bound = schema.bind(&tokens(&["5"])).unwrap();
        assert_eq!(
            bound.into_values(),
            vec![ArgValue::Float(5.0), ArgValue::Str("g".into())]
        );
    }

    #[test]
    fn test_positional_optional() {
        let bound = weigh_schema().bind(&tokens(&["5", "lb"])).unwrap();
        assert_eq!(bound.get::<String>("unit").as_deref(), Some("lb"));
    }

    #[test]
    fn test_positional_after_named() {
        let schema = ArgumentSchema::builder()
            .required("amount", ArgType::Float)
            .optional("unit", ArgType::Str, DefaultValue::value("g"))
            .optional("note", ArgType::Str, DefaultValue::Absent)
            .build()
            .unwrap();
        let err = schema.bind(&tokens(&["5", "unit=kg", "fresh"])).unwrap_err();
        assert!(matches!(err, BindError::PositionalAfterNamed(ref t) if t == "fresh"));
    }

    #[test]
    fn test_output_follows_declaration_order() {
        let schema = ArgumentSchema::builder()
            .optional("a", ArgType::Int, DefaultValue::value(1i64))
            .optional("b", ArgType::Int, DefaultValue::value(2i64))
            .optional("c", ArgType::Int, DefaultValue::value(3i64))
            .build()
            .unwrap();
        let bound = schema.bind(&tokens(&["c=30", "a=10"])).unwrap();
        assert_eq!(
            bound.into_values(),
            vec![ArgValue::Int(10), ArgValue::Int(2), ArgValue::Int(30)]
        );
    }

    #[test]
    fn test_positional_fills_next_unbound() {
        let schema = ArgumentSchema::builder()
            .optional("a", ArgType::Str, DefaultValue::Absent)
            .optional("b", ArgType::Str, DefaultValue::Absent)
            .build()
            .unwrap();
        let bound = schema.bind(&tokens(&["x", "b=y"])).unwrap();
        assert_eq!(bound.get::<String>("a").as_deref(), Some("x"));
        assert_eq!(bound.get::<String>("b").as_deref(), Some("y"));

        let bound = schema.bind(&tokens(&["x"])).unwrap();
        assert!(bound.value("b").unwrap().is_null());
    }

    #[test]
    fn test_duplicate_and_unknown() {
        let schema = weigh_schema();
        let err = schema.bind(&tokens(&["5", "weight=3"])).unwrap_err();
        assert!(matches!(err, BindError::UnknownArgument(ref n) if n == "weight"));

        let schema = ArgumentSchema::builder()
            .optional("unit", ArgType::Str, DefaultValue::value("g"))
            .optional("note", ArgType::Str, DefaultValue::Absent)
            .build()
            .unwrap();
        let err = schema.bind(&tokens(&["kg", "unit=lb"])).unwrap_err();
        assert!(matches!(err, BindError::DuplicateArgument(ref n) if n == "unit"));
    }

    #[test]
    fn test_naming_required_param_is_duplicate() {
        let schema = ArgumentSchema::builder()
            .required("amount", ArgType::Float)
            .optional("unit", ArgType::Str, DefaultValue::value("g"))
            .build()
            .unwrap();
        let err = schema.bind(&tokens(&["5", "amount=6"])).unwrap_err();
        assert!(matches!(err, BindError::DuplicateArgument(ref n) if n == "amount"));
    }

    #[test]
    fn test_cast_error_names_parameter() {
        let err = weigh_schema().bind(&tokens(&["lots"])).unwrap_err();
        match err {
            BindError::Cast { name, cause } => {
                assert_eq!(name, "amount");
                assert!(cause.downcast_ref::<std::num::ParseFloatError>().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lazy_default_evaluated_per_bind() {
        let counter = Arc::new(AtomicI64::new(0));
        let provider = counter.clone();
        let schema = ArgumentSchema::builder()
            .optional(
                "tick",
                ArgType::Int,
                DefaultValue::lazy(move || ArgValue::Int(provider.fetch_add(1, Ordering::SeqCst))),
            )
            .build()
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(schema.bind::<String>(&[]).unwrap().get::<i64>("tick"), Some(0));
        assert_eq!(schema.bind::<String>(&[]).unwrap().get::<i64>("tick"), Some(1));
        // An explicit value skips the provider.
        assert_eq!(schema.bind(&tokens(&["9"])).unwrap().get::<i64>("tick"), Some(9));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_value_with_equals_sign() {
        let schema = ArgumentSchema::builder()
            .optional("expr", ArgType::Str, DefaultValue::Absent)
            .build()
            .unwrap();
        let bound = schema.bind(&tokens(&["expr=a=b"])).unwrap();
        assert_eq!(bound.get::<String>("expr").as_deref(), Some("a=b"));
    }

    #[test]
    fn test_too_many_tokens() {
        let err = weigh_schema().bind(&tokens(&["1", "kg", "extra"])).unwrap_err();
        assert!(matches!(err, BindError::Arity { min: 1, max: 2, actual: 3 }));
    }

    #[test]
    fn test_duplicate_declaration() {
        let err = ArgumentSchema::builder()
            .required("x", ArgType::Int)
            .optional("x", ArgType::Int, DefaultValue::Absent)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName("x".into()));
    }

    #[test]
    fn test_custom_type_needs_cast() {
        let err = ArgumentSchema::builder()
            .required("d", ArgType::Custom("duration".into()))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingCast("d".into()));

        let schema = ArgumentSchema::builder()
            .required_with(
                "d",
                ArgType::Custom("minutes".into()),
                Cast::new(|raw| Ok(ArgValue::Int(raw.trim_end_matches('m').parse::<i64>()? * 60))),
            )
            .build()
            .unwrap();
        assert_eq!(schema.bind(&tokens(&["5m"])).unwrap()[0], ArgValue::Int(300));
    }

    #[test]
    fn test_usage_and_synopsis() {
        let schema = ArgumentSchema::builder()
            .usage("/weigh <amount> [unit]")
            .required("amount", ArgType::Float)
            .optional("unit", ArgType::Str, DefaultValue::value("g"))
            .build()
            .unwrap();
        assert_eq!(schema.usage(), "Usage: /weigh <amount> [unit]");
        assert_eq!(schema.synopsis(), "<amount:float> [unit:str]");
        assert_eq!(weigh_schema().usage(), "");
        assert!(schema.check_arg_len(1));
        assert!(!schema.check_arg_len(3));
    }
}
