//! Standard cast functions from raw tokens to [`ArgValue`]s.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::value::{ArgType, ArgValue};

type CastFn = dyn Fn(&str) -> anyhow::Result<ArgValue> + Send + Sync;

/// Converts one raw token into a typed value.
///
/// Errors are returned unchanged to the binder, which wraps them with the
/// parameter name; the original error stays reachable through `downcast_ref`
/// on [`BindError::Cast`](super::BindError::Cast)'s `cause`.
#[derive(Clone)]
pub struct Cast(Arc<CastFn>);

impl Cast {
    pub fn new<F>(cast: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<ArgValue> + Send + Sync + 'static,
    {
        Self(Arc::new(cast))
    }

    pub fn apply(&self, raw: &str) -> anyhow::Result<ArgValue> {
        (self.0)(raw)
    }

    /// Signed 64-bit integer.
    pub fn int() -> Self {
        Self::new(|raw| Ok(ArgValue::Int(raw.parse::<i64>()?)))
    }

    pub fn float() -> Self {
        Self::new(|raw| Ok(ArgValue::Float(raw.parse::<f64>()?)))
    }

    /// `true/false`, `yes/no`, `on/off`, `1/0`, case-insensitive.
    pub fn boolean() -> Self {
        Self::new(|raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(ArgValue::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(ArgValue::Bool(false)),
            _ => Err(anyhow!("expected a boolean, got `{raw}`")),
        })
    }

    pub fn string() -> Self {
        Self::new(|raw| Ok(ArgValue::Str(raw.to_string())))
    }

    /// One of `options`, compared case-insensitively. Produces the option as declared.
    pub fn choice<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        Self::new(move |raw| {
            options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(raw))
                .map(|option| ArgValue::Str(option.clone()))
                .ok_or_else(|| anyhow!("expected one of {}, got `{raw}`", options.join(", ")))
        })
    }

    /// RFC 3339 timestamps, or `YYYY-MM-DD[ HH:MM[:SS]]` read as UTC.
    pub fn datetime() -> Self {
        Self::new(|raw| parse_datetime(raw).map(ArgValue::DateTime))
    }

    /// The standard cast for a declared type; custom types have none.
    pub fn for_type(ty: &ArgType) -> Option<Self> {
        match ty {
            ArgType::Int => Some(Self::int()),
            ArgType::Float => Some(Self::float()),
            ArgType::Bool => Some(Self::boolean()),
            ArgType::Str => Some(Self::string()),
            ArgType::Choice(options) => Some(Self::choice(options.clone())),
            ArgType::DateTime => Some(Self::datetime()),
            ArgType::Custom(_) => None,
        }
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cast(..)")
    }
}

fn parse_datetime(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("expected a date or timestamp, got `{raw}`"))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| anyhow!("invalid date `{raw}`"))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_int_cast_error_is_parse_int_error() {
        let err = Cast::int().apply("3x").unwrap_err();
        assert!(err.downcast_ref::<std::num::ParseIntError>().is_some());
        assert_eq!(Cast::int().apply("-12").unwrap(), ArgValue::Int(-12));
    }

    #[test]
    fn test_float_cast() {
        assert_eq!(Cast::float().apply("5").unwrap(), ArgValue::Float(5.0));
        assert!(Cast::float().apply("five").is_err());
    }

    #[test]
    fn test_boolean_cast() {
        assert_eq!(Cast::boolean().apply("YES").unwrap(), ArgValue::Bool(true));
        assert_eq!(Cast::boolean().apply("off").unwrap(), ArgValue::Bool(false));
        assert!(Cast::boolean().apply("maybe").is_err());
    }

    #[test]
    fn test_choice_cast() {
        let cast = Cast::choice(["daily", "weekly"]);
        assert_eq!(cast.apply("Weekly").unwrap(), ArgValue::Str("weekly".into()));
        let err = cast.apply("hourly").unwrap_err();
        assert_eq!(err.to_string(), "expected one of daily, weekly, got `hourly`");
    }

    #[test]
    fn test_datetime_cast() {
        let value = Cast::datetime().apply("2024-03-01 08:30").unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 1));
        assert_eq!((dt.hour(), dt.minute()), (8, 30));

        let value = Cast::datetime().apply("2024-03-01T08:30:00+02:00").unwrap();
        assert_eq!(value.as_datetime().unwrap().hour(), 6);

        let value = Cast::datetime().apply("2024-03-01").unwrap();
        assert_eq!(value.as_datetime().unwrap().hour(), 0);

        assert!(Cast::datetime().apply("yesterday").is_err());
    }

    #[test]
    fn test_for_type() {
        assert!(Cast::for_type(&ArgType::Int).is_some());
        assert!(Cast::for_type(&ArgType::Custom("duration".into())).is_none());
    }
}
