pub mod auth;
pub mod client;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod session;

pub use auth::{RequestSigner, SignedUrl};
pub use client::SparkClient;
pub use error::{LLMError, Result};
pub use protocol::{AnswerAccumulator, StreamProgress};
pub use provider::ChatTransport;
pub use session::{ChatSession, DEFAULT_TIMEOUT};
