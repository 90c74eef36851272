//! Binding chat tokens to typed schemas, the way a leaf callback sees them.

use anyhow::bail;
use chaincmd::{
    ArgType, ArgValue, ArgumentSchema, BindError, Cast, DefaultValue, SchemaError, tokenize,
};
use chrono::{TimeZone, Utc};

fn remind_schema() -> ArgumentSchema {
    ArgumentSchema::builder()
        .usage("/remind <what> <day> [times] [urgent]")
        .required("what", ArgType::Str)
        .required_with(
            "day",
            ArgType::Custom("weekday".into()),
            Cast::new(|raw| {
                let days = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
                match days.iter().position(|day| raw.eq_ignore_ascii_case(day)) {
                    Some(index) => Ok(ArgValue::Int(index as i64)),
                    None => bail!("`{raw}` is not a weekday"),
                }
            }),
        )
        .optional("times", ArgType::Int, DefaultValue::value(1i64))
        .optional("urgent", ArgType::Bool, DefaultValue::value(false))
        .build()
        .unwrap()
}

#[test]
fn test_tokens_from_chat_text() {
    let tokens = tokenize(r#"/remind "water plants" Fri urgent=on"#, 7);
    let bound = remind_schema().bind(&tokens).unwrap();
    assert_eq!(bound.get::<String>("what").as_deref(), Some("water plants"));
    assert_eq!(bound.get::<i64>("day"), Some(4));
    assert_eq!(bound.get::<i64>("times"), Some(1));
    assert_eq!(bound.get::<bool>("urgent"), Some(true));
}

#[test]
fn test_positional_then_named() {
    let bound = remind_schema().bind(&["call", "mon", "3", "urgent=no"]).unwrap();
    let values = bound.into_values();
    assert_eq!(
        values,
        vec![
            ArgValue::from("call"),
            ArgValue::Int(0),
            ArgValue::Int(3),
            ArgValue::Bool(false),
        ]
    );
}

#[test]
fn test_binding_errors() {
    let schema = remind_schema();
    assert!(matches!(
        schema.bind(&["call"]),
        Err(BindError::Arity { min: 2, max: 4, actual: 1 })
    ));
    assert!(matches!(
        schema.bind(&["call", "mon", "when=now"]),
        Err(BindError::UnknownArgument(name)) if name == "when"
    ));
    assert!(matches!(
        schema.bind(&["call", "mon", "day=tue"]),
        Err(BindError::DuplicateArgument(name)) if name == "day"
    ));
    assert!(matches!(
        schema.bind(&["call", "mon", "times=2", "times=3"]),
        Err(BindError::DuplicateArgument(name)) if name == "times"
    ));
    assert!(matches!(
        schema.bind(&["call", "mon", "times=2", "yes"]),
        Err(BindError::PositionalAfterNamed(token)) if token == "yes"
    ));

    let err = schema.bind(&["call", "someday"]).unwrap_err();
    assert_eq!(err.to_string(), "Invalid value for `day`: `someday` is not a weekday");
}

#[test]
fn test_lazy_defaults_resolve_per_bind() {
    let fixed = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let schema = ArgumentSchema::builder()
        .optional("at", ArgType::DateTime, DefaultValue::lazy(move || fixed.into()))
        .build()
        .unwrap();
    let bound = schema.bind::<&str>(&[]).unwrap();
    assert_eq!(bound.get("at"), Some(fixed));

    let bound = schema.bind(&["2024-06-01T12:00:00Z"]).unwrap();
    assert_eq!(
        bound.get("at"),
        Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    );
}

#[test]
fn test_schema_declaration_errors() {
    let err = ArgumentSchema::builder()
        .required("x", ArgType::Int)
        .optional("x", ArgType::Int, DefaultValue::Absent)
        .build()
        .unwrap_err();
    assert_eq!(err, SchemaError::DuplicateName("x".into()));

    let err = ArgumentSchema::builder()
        .required("color", ArgType::Custom("rgb".into()))
        .build()
        .unwrap_err();
    assert_eq!(err, SchemaError::MissingCast("color".into()));
}

#[test]
fn test_usage_and_synopsis() {
    let schema = remind_schema();
    assert_eq!(schema.usage(), "Usage: /remind <what> <day> [times] [urgent]");
    assert_eq!(
        schema.synopsis(),
        "<what:str> <day:weekday> [times:int] [urgent:bool]"
    );
    assert!(schema.check_arg_len(2));
    assert!(!schema.check_arg_len(5));
    assert_eq!(ArgumentSchema::builder().build().unwrap().usage(), "");
}
