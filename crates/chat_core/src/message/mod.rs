//! Message module - Role-tagged chat messages
//!
//! Shared message types used by the history buffer and the wire protocol.

mod role;

pub use role::Role;

use serde::{Deserialize, Serialize};

/// A single turn of the conversation, serialized exactly as the remote
/// service expects it inside `payload.message.text`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Character length of the serialized JSON form.
    ///
    /// This is the local proxy for the token cost of the message.
    pub fn serialized_len(&self) -> usize {
        serde_json::to_string(self)
            .map(|json| json.chars().count())
            .unwrap_or_else(|_| self.content.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_with_lowercase_role() {
        let msg = ChatMessage::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn test_serialized_len_counts_chars_not_bytes() {
        let ascii = ChatMessage::assistant("ab");
        let wide = ChatMessage::assistant("你好");
        assert_eq!(ascii.serialized_len(), wide.serialized_len());
        assert_eq!(
            ascii.serialized_len(),
            r#"{"role":"assistant","content":"ab"}"#.len()
        );
    }
}
