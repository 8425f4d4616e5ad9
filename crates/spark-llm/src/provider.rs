use async_trait::async_trait;
use chat_core::{ChatHistory, ChatModel, ChatParams};

use crate::error::Result;

/// One complete request/response exchange with a remote chat model.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the conversation and wait for the full streamed answer.
    ///
    /// # Arguments
    /// * `model` - Target model; its endpoint, domain and token budget are used
    /// * `history` - Transcript to send, already ending with `question`
    /// * `params` - Sampling parameters
    /// * `question` - The user turn that triggered this exchange
    async fn send(
        &self,
        model: &ChatModel,
        history: &ChatHistory,
        params: &ChatParams,
        question: &str,
    ) -> Result<String>;
}
