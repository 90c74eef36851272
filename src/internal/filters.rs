//! Message filters gating whether a matched leaf accepts a message.
//!
//! Filters compose with `&`, `|` and `!`:
//!
//! ```
//! use chaincmd::{Filter, Message};
//!
//! let admin_chat = Filter::chat([42]) & !Filter::user([13]);
//! assert!(admin_chat.check(&Message::text("/ban").with_chat(42).with_user(1)).accepted());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};

use super::message::Message;

/// Structured data a filter may attach to an accepted message.
pub type FilterData = Map<String, Value>;

/// Outcome of checking a filter against a message.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    Reject,
    Accept,
    /// Accepted, with data to merge into the callback context.
    Data(FilterData),
}

impl FilterResult {
    pub fn accepted(&self) -> bool {
        !matches!(self, FilterResult::Reject)
    }

    /// The attached data, if any.
    pub fn into_data(self) -> Option<FilterData> {
        match self {
            FilterResult::Data(data) => Some(data),
            _ => None,
        }
    }
}

impl From<bool> for FilterResult {
    fn from(accepted: bool) -> Self {
        if accepted {
            FilterResult::Accept
        } else {
            FilterResult::Reject
        }
    }
}

type CheckFn = dyn Fn(&Message) -> FilterResult + Send + Sync;

/// A cloneable, thread-safe message predicate.
#[derive(Clone)]
pub struct Filter {
    name: Arc<str>,
    check: Arc<CheckFn>,
}

impl Filter {
    /// Build a filter from a closure. `name` is only used for display.
    pub fn from_fn<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Message) -> FilterResult + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            check: Arc::new(check),
        }
    }

    /// Build a filter from a plain boolean predicate.
    pub fn predicate<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self::from_fn(name, move |message| predicate(message).into())
    }

    /// Accepts every message.
    pub fn all() -> Self {
        Self::from_fn("ALL", |_| FilterResult::Accept)
    }

    /// Accepts messages that carry text.
    ///
    /// Nodes built without a filter accept every message that reaches their
    /// filter check; text is already required to match a command.
    pub fn text() -> Self {
        Self::predicate("TEXT", |message| message.text.is_some())
    }

    /// Accepts messages sent in one of the given chats.
    pub fn chat(ids: impl IntoIterator<Item = i64>) -> Self {
        let ids: HashSet<i64> = ids.into_iter().collect();
        Self::predicate("Chat", move |message| {
            message.chat_id.is_some_and(|id| ids.contains(&id))
        })
    }

    /// Accepts messages sent by one of the given users.
    pub fn user(ids: impl IntoIterator<Item = i64>) -> Self {
        let ids: HashSet<i64> = ids.into_iter().collect();
        Self::predicate("User", move |message| {
            message.from_user.is_some_and(|id| ids.contains(&id))
        })
    }

    /// Data filter: accepts messages whose text matches `pattern` and reports
    /// the matched substrings under `"matches"`.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(pattern)?;
        let name = format!("Regex({pattern})");
        Ok(Self::from_fn(name, move |message| {
            let Some(text) = message.text.as_deref() else {
                return FilterResult::Reject;
            };
            let matches: Vec<Value> = re
                .find_iter(text)
                .map(|m| Value::String(m.as_str().to_string()))
                .collect();
            if matches.is_empty() {
                return FilterResult::Reject;
            }
            let mut data = FilterData::new();
            data.insert("matches".to_string(), Value::Array(matches));
            FilterResult::Data(data)
        }))
    }

    pub fn check(&self, message: &Message) -> FilterResult {
        (self.check)(message)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filter({})", self.name)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Merge `incoming` into `base`. Arrays under the same key are concatenated,
/// anything else is overwritten.
fn merge_data(mut base: FilterData, incoming: FilterData) -> FilterData {
    for (key, value) in incoming {
        match (base.entry(key).or_insert(Value::Null), value) {
            (Value::Array(existing), Value::Array(more)) => existing.extend(more),
            (slot, value) => *slot = value,
        }
    }
    base
}

impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        let name = format!("<{} and {}>", self.name, rhs.name);
        Filter::from_fn(name, move |message| {
            let left = self.check(message);
            if !left.accepted() {
                return FilterResult::Reject;
            }
            let right = rhs.check(message);
            match (left, right) {
                (_, FilterResult::Reject) => FilterResult::Reject,
                (FilterResult::Data(l), FilterResult::Data(r)) => {
                    FilterResult::Data(merge_data(l, r))
                }
                (FilterResult::Data(d), _) | (_, FilterResult::Data(d)) => FilterResult::Data(d),
                _ => FilterResult::Accept,
            }
        })
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        let name = format!("<{} or {}>", self.name, rhs.name);
        Filter::from_fn(name, move |message| {
            let left = self.check(message);
            if left.accepted() {
                return left;
            }
            rhs.check(message)
        })
    }
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        let name = format!("<inverted {}>", self.name);
        Filter::from_fn(name, move |message| (!self.check(message).accepted()).into())
    }
}
