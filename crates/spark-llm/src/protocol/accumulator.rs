use crate::error::{LLMError, Result};

use super::frames::{ResponseFrame, TokenUsage, STATUS_FINAL, STATUS_FIRST};

/// Whether more frames are expected after the one just applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamProgress {
    Partial,
    Complete,
}

/// Builds one streamed answer. Create one per request.
#[derive(Debug, Default)]
pub struct AnswerAccumulator {
    answer: String,
    frames: usize,
    usage: Option<TokenUsage>,
    complete: bool,
}

impl AnswerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one response frame.
    ///
    /// A nonzero `header.code` yields [`LLMError::Protocol`] carrying the code.
    pub fn apply(&mut self, frame: ResponseFrame) -> Result<StreamProgress> {
        if frame.header.code != 0 {
            return Err(LLMError::Protocol {
                code: frame.header.code,
                message: frame.header.message,
            });
        }

        let payload = frame.payload.ok_or_else(|| {
            LLMError::MalformedFrame("success frame without payload.choices".to_string())
        })?;
        let choices = payload.choices;

        if choices.status == STATUS_FIRST {
            self.answer.clear();
        }
        if let Some(chunk) = choices.text.first() {
            self.answer.push_str(&chunk.content);
        }
        self.frames += 1;

        if let Some(usage) = payload.usage {
            self.usage = Some(usage.text);
        }

        if choices.status == STATUS_FINAL {
            self.complete = true;
            Ok(StreamProgress::Complete)
        } else {
            Ok(StreamProgress::Partial)
        }
    }

    /// Parse and apply a raw text frame.
    pub fn apply_text(&mut self, text: &str) -> Result<StreamProgress> {
        let frame = ResponseFrame::from_json(text)
            .map_err(|e| LLMError::MalformedFrame(format!("{e}: {text}")))?;
        self.apply(frame)
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn into_answer(self) -> String {
        self.answer
    }
}
