//! Incoming message view and the per-call callback context.

use serde::{Deserialize, Serialize};

use super::args::BoundArguments;
use super::filters::FilterData;

/// The parts of an incoming chat message the routing engine looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier assigned by the host.
    #[serde(default)]
    pub id: i64,
    /// Chat the message was sent in.
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// Sender of the message.
    #[serde(default)]
    pub from_user: Option<i64>,
    /// Text body. Messages without text (stickers, photos) carry `None`.
    #[serde(default)]
    pub text: Option<String>,
}

impl Message {
    /// Create a text message with no chat or sender information.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_chat(mut self, chat_id: i64) -> Self {
        self.chat_id = Some(chat_id);
        self
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.from_user = Some(user_id);
        self
    }

    /// Copy of this message with its text replaced.
    ///
    /// Used to show filters the message as seen at one level of the command
    /// tree, with the parent commands already consumed.
    pub fn with_text(&self, text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..self.clone()
        }
    }

    /// The text body, or `""` if the message has none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// State handed to a leaf callback.
///
/// The host creates one per message;
/// [`CommandNode::handle`](crate::internal::handler::CommandNode::handle)
/// fills in the tokens, merges filter data and, for leaves with a schema, the
/// bound arguments.
#[derive(Debug, Clone, Default)]
pub struct CallbackContext {
    /// Raw argument tokens following the matched command chain.
    pub args: Vec<String>,
    /// Data produced by data filters (e.g. regex matches).
    pub data: FilterData,
    /// Typed arguments, present when the handling leaf declares a schema.
    pub bound: Option<BoundArguments>,
}

impl CallbackContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge filter data into the context, overwriting existing keys.
    pub fn merge_data(&mut self, data: &FilterData) {
        for (key, value) in data {
            self.data.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_with_text_keeps_metadata() {
        let msg = Message::text("/plan add x").with_id(7).with_chat(42).with_user(3);
        let sub = msg.with_text("add x");
        assert_eq!(sub.text.as_deref(), Some("add x"));
        assert_eq!(sub.id, 7);
        assert_eq!(sub.chat_id, Some(42));
        assert_eq!(sub.from_user, Some(3));
    }

    #[test]
    fn test_text_or_empty() {
        assert_eq!(Message::default().text_or_empty(), "");
        assert_eq!(Message::text("hi").text_or_empty(), "hi");
    }

    #[test]
    fn test_merge_data_overwrites() {
        let mut ctx = CallbackContext::new();
        ctx.data.insert("a".into(), json!(1));
        let mut incoming = FilterData::new();
        incoming.insert("a".into(), json!(2));
        incoming.insert("b".into(), json!("x"));
        ctx.merge_data(&incoming);
        assert_eq!(ctx.data["a"], json!(2));
        assert_eq!(ctx.data["b"], json!("x"));
    }

    #[test]
    fn test_message_deserialize_defaults() {
        let msg: Message = serde_json::from_str(r#"{"text": "/start"}"#).unwrap();
        assert_eq!(msg.id, 0);
        assert!(msg.chat_id.is_none());
        assert_eq!(msg.text.as_deref(), Some("/start"));
    }
}
