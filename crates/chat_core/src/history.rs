//! ChatHistory - The conversation transcript sent with every request
//!
//! Messages are kept in insertion order together with the serialized length of
//! each entry, so the trim budget can be checked without re-serializing the log.

use std::collections::VecDeque;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::CoreResult;
use crate::message::{ChatMessage, Role};

/// Safety margin applied to a model's token budget when trimming.
///
/// The service counts tokens while the history measures serialized characters.
pub const TRIM_MARGIN: f64 = 1.2;

#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: VecDeque<ChatMessage>,
    lengths: VecDeque<usize>,
    total_len: usize,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message with a role given as text.
    ///
    /// Fails with [`CoreError::InvalidRole`](crate::CoreError::InvalidRole) unless the
    /// role is `"user"` or `"assistant"`; the history is left untouched in that case.
    pub fn append(&mut self, role: &str, content: impl Into<String>) -> CoreResult<()> {
        let role = role.parse::<Role>()?;
        self.push(ChatMessage::new(role, content));
        Ok(())
    }

    pub fn push(&mut self, message: ChatMessage) {
        let len = message.serialized_len();
        self.messages.push_back(message);
        self.lengths.push_back(len);
        self.total_len += len;
    }

    /// Evict the oldest messages until the tracked size fits in
    /// `max_tokens * TRIM_MARGIN`. The most recent message is never evicted.
    ///
    /// Returns the number of messages removed.
    pub fn trim(&mut self, max_tokens: u32) -> usize {
        let budget = f64::from(max_tokens) * TRIM_MARGIN;
        let mut removed = 0;

        while self.messages.len() > 1 && self.total_len as f64 > budget {
            self.messages.pop_front();
            if let Some(len) = self.lengths.pop_front() {
                self.total_len -= len;
            }
            removed += 1;
        }

        if removed > 0 {
            log::debug!(
                "Trimmed {} message(s) from history, {} remaining ({} chars, budget {:.0})",
                removed,
                self.messages.len(),
                self.total_len,
                budget
            );
        }
        removed
    }

    /// Serialize the transcript as a JSON array of `{role, content}` objects.
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.lengths.clear();
        self.total_len = 0;
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sum of the recorded serialized lengths.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }
}

impl Serialize for ChatHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.messages.len()))?;
        for message in &self.messages {
            seq.serialize_element(message)?;
        }
        seq.end()
    }
}
