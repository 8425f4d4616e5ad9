use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid role '{0}': must be 'user' or 'assistant'")]
    InvalidRole(String),

    #[error("Invalid chat parameter: {0}")]
    InvalidParams(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Config error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
