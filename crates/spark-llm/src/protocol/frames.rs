use chat_core::{ChatHistory, ChatModel, ChatParams};
use serde::{Deserialize, Serialize};

/// `choices.status` of the first chunk of an answer.
pub const STATUS_FIRST: u8 = 0;
/// `choices.status` of the terminal chunk of an answer.
pub const STATUS_FINAL: u8 = 2;

// ========== Request ==========

#[derive(Debug, Serialize)]
pub struct RequestFrame<'a> {
    pub header: RequestHeader<'a>,
    pub parameter: Parameter<'a>,
    pub payload: RequestPayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct RequestHeader<'a> {
    pub app_id: &'a str,
    pub uid: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Parameter<'a> {
    pub chat: ChatParameter<'a>,
}

#[derive(Debug, Serialize)]
pub struct ChatParameter<'a> {
    pub domain: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: u8,
}

#[derive(Debug, Serialize)]
pub struct RequestPayload<'a> {
    pub message: RequestMessage<'a>,
}

#[derive(Debug, Serialize)]
pub struct RequestMessage<'a> {
    pub text: &'a ChatHistory,
}

impl<'a> RequestFrame<'a> {
    pub fn new(
        app_id: &'a str,
        uid: &'a str,
        model: &'a ChatModel,
        params: &ChatParams,
        history: &'a ChatHistory,
    ) -> Self {
        Self {
            header: RequestHeader { app_id, uid },
            parameter: Parameter {
                chat: ChatParameter {
                    domain: &model.domain,
                    max_tokens: model.max_tokens,
                    temperature: params.temperature,
                    top_k: params.top_k,
                },
            },
            payload: RequestPayload {
                message: RequestMessage { text: history },
            },
        }
    }
}

// ========== Response ==========

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseFrame {
    pub header: ResponseHeader,
    #[serde(default)]
    pub payload: Option<ResponsePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseHeader {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePayload {
    pub choices: Choices,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choices {
    pub status: u8,
    #[serde(default)]
    pub seq: u32,
    #[serde(default)]
    pub text: Vec<TextChunk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextChunk {
    pub content: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub text: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub question_tokens: u32,
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ResponseFrame {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
