use std::time::Duration;

use chat_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("Invalid role '{0}': must be 'user' or 'assistant'")]
    InvalidRole(String),

    #[error("Invalid chat parameter: {0}")]
    InvalidParams(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// Nonzero `header.code` reported by the service.
    #[error("Protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Session busy: a request is already in flight")]
    SessionBusy,

    #[error("Config error: {0}")]
    Config(String),
}

impl LLMError {
    /// Remote error code, for protocol errors only.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_session_busy(&self) -> bool {
        matches!(self, Self::SessionBusy)
    }
}

impl From<CoreError> for LLMError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRole(role) => Self::InvalidRole(role),
            CoreError::InvalidParams(msg) => Self::InvalidParams(msg),
            CoreError::MissingCredential(name) => Self::MissingCredential(name),
            CoreError::Config(msg) => Self::Config(msg),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for LLMError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;
