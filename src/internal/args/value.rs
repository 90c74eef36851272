//! Typed argument values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared target type of a parameter, shown in usage text and used to pick
/// a standard cast when schemas come from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgType {
    Int,
    Float,
    Bool,
    Str,
    /// One of a fixed set of lower-cased words.
    Choice(Vec<String>),
    DateTime,
    /// Produced by a user-supplied cast.
    Custom(String),
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Int => f.write_str("int"),
            ArgType::Float => f.write_str("float"),
            ArgType::Bool => f.write_str("bool"),
            ArgType::Str => f.write_str("str"),
            ArgType::Choice(options) => write!(f, "{}", options.join("|")),
            ArgType::DateTime => f.write_str("datetime"),
            ArgType::Custom(name) => f.write_str(name),
        }
    }
}

/// A bound argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Optional parameter without a default that was not given.
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    DateTime(DateTime<Utc>),
    /// Anything a custom cast wants to produce.
    Json(serde_json::Value),
}

impl ArgValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, and integers widened to float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            ArgValue::DateTime(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => f.write_str("null"),
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::Str(v) => f.write_str(v),
            ArgValue::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            ArgValue::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<DateTime<Utc>> for ArgValue {
    fn from(v: DateTime<Utc>) -> Self {
        ArgValue::DateTime(v)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ArgValue::Null, Into::into)
    }
}

/// Conversion out of a bound [`ArgValue`].
pub trait FromArgValue: Sized {
    fn from_arg_value(value: &ArgValue) -> Option<Self>;
}

impl FromArgValue for i64 {
    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromArgValue for f64 {
    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromArgValue for bool {
    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromArgValue for String {
    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromArgValue for DateTime<Utc> {
    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        value.as_datetime()
    }
}

impl<T: FromArgValue> FromArgValue for Option<T> {
    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_arg_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(ArgValue::Int(3).as_int(), Some(3));
        assert_eq!(ArgValue::Int(3).as_float(), Some(3.0));
        assert_eq!(ArgValue::Str("kg".into()).as_str(), Some("kg"));
        assert_eq!(ArgValue::Str("kg".into()).as_int(), None);
    }

    #[test]
    fn test_option_from_null() {
        assert_eq!(Option::<i64>::from_arg_value(&ArgValue::Null), Some(None));
        assert_eq!(Option::<i64>::from_arg_value(&ArgValue::Int(1)), Some(Some(1)));
        assert_eq!(Option::<i64>::from_arg_value(&ArgValue::Bool(true)), None);
    }

    #[test]
    fn test_arg_type_display() {
        assert_eq!(ArgType::Choice(vec!["on".into(), "off".into()]).to_string(), "on|off");
        assert_eq!(ArgType::Float.to_string(), "float");
    }

    #[test]
    fn test_arg_type_deserialize() {
        let ty: ArgType = serde_json::from_str(r#""date-time""#).unwrap();
        assert_eq!(ty, ArgType::DateTime);
        let ty: ArgType = serde_json::from_str(r#"{"choice": ["a", "b"]}"#).unwrap();
        assert_eq!(ty, ArgType::Choice(vec!["a".into(), "b".into()]));
    }
}
