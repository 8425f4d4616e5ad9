//! Streaming WebSocket client for the Spark chat endpoints.

use async_trait::async_trait;
use chat_core::{ChatHistory, ChatModel, ChatParams, Config, Credentials};
use futures_util::{SinkExt, Stream, StreamExt};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::auth::RequestSigner;
use crate::error::{LLMError, Result};
use crate::protocol::{AnswerAccumulator, RequestFrame, StreamProgress};
use crate::provider::ChatTransport;

const DEFAULT_UID: &str = "spark-chat";

/// Process-wide rustls provider for `wss://` handshakes.
static CRYPTO_PROVIDER: Lazy<()> = Lazy::new(|| {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
});

pub(crate) fn ensure_crypto_provider() {
    Lazy::force(&CRYPTO_PROVIDER);
}

pub struct SparkClient {
    signer: RequestSigner,
    uid: String,
}

impl SparkClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            signer: RequestSigner::new(credentials),
            uid: DEFAULT_UID.to_string(),
        }
    }

    /// Build a client from loaded configuration. Fails if a credential is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = config.credentials()?;
        Ok(Self::new(credentials).with_uid(config.uid.clone()))
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

#[async_trait]
impl ChatTransport for SparkClient {
    async fn send(
        &self,
        model: &ChatModel,
        history: &ChatHistory,
        params: &ChatParams,
        question: &str,
    ) -> Result<String> {
        params.validate()?;

        let signed = self.signer.sign(&model.url)?;
        let app_id = &self.signer.credentials().app_id;
        let frame = RequestFrame::new(app_id, &self.uid, model, params, history);
        let body = serde_json::to_string(&frame)?;

        ensure_crypto_provider();
        info!("Connecting to {} at {}", model.name, signed.host);
        let (mut ws, _response) = connect_async(signed.url.as_str()).await.map_err(|e| {
            error!("WebSocket handshake with {} failed: {}", signed.host, e);
            LLMError::Connection(e.to_string())
        })?;

        debug!(
            "Sending request to domain '{}': {} message(s), question of {} chars",
            model.domain,
            history.len(),
            question.chars().count()
        );
        if let Err(e) = ws.send(Message::text(body)).await {
            error!("Failed to send request frame: {}", e);
            return Err(LLMError::Connection(e.to_string()));
        }

        let result = read_answer(&mut ws).await;

        // The server may already have closed its side.
        if let Err(e) = ws.close(None).await {
            debug!("Closing WebSocket: {}", e);
        }

        match &result {
            Ok(answer) => info!("Received answer of {} chars", answer.chars().count()),
            Err(e) => warn!("Chat request to {} failed: {}", model.name, e),
        }
        result
    }
}

/// Consume frames until the terminal chunk, a protocol error, or the end of
/// the stream. The accumulator lives only for this call.
pub(crate) async fn read_answer<S>(stream: &mut S) -> Result<String>
where
    S: Stream<Item = std::result::Result<Message, WsError>> + Unpin,
{
    let mut accumulator = AnswerAccumulator::new();

    while let Some(message) = stream.next().await {
        let message = message?;
        let progress = match &message {
            Message::Text(text) => {
                debug!("Received frame: {}", text.as_str());
                accumulator.apply_text(text.as_str())?
            }
            Message::Binary(data) => {
                let text = std::str::from_utf8(data)
                    .map_err(|e| LLMError::MalformedFrame(format!("binary frame: {e}")))?;
                accumulator.apply_text(text)?
            }
            Message::Close(frame) => {
                return Err(LLMError::Connection(format!(
                    "connection closed before the final frame ({:?})",
                    frame
                )));
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };

        if progress == StreamProgress::Complete {
            if let Some(usage) = accumulator.usage() {
                debug!(
                    "Token usage: prompt={}, completion={}, total={}",
                    usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
                );
            }
            debug!("Answer complete after {} frame(s)", accumulator.frames());
            return Ok(accumulator.into_answer());
        }
    }

    Err(LLMError::Connection(
        "stream ended before the final frame".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn text_frame(status: u8, content: &str) -> std::result::Result<Message, WsError> {
        Ok(Message::text(
            serde_json::json!({
                "header": {"code": 0},
                "payload": {"choices": {"status": status, "text": [{"content": content}]}}
            })
            .to_string(),
        ))
    }

    #[tokio::test]
    async fn test_read_answer_collects_until_final_frame() {
        let mut frames = stream::iter(vec![
            text_frame(0, "Hel"),
            Ok(Message::Ping(Default::default())),
            text_frame(1, "lo "),
            text_frame(1, "wor"),
            text_frame(2, "ld"),
            text_frame(1, "ignored"),
        ]);

        let answer = read_answer(&mut frames).await.unwrap();
        assert_eq!(answer, "Hello world");
    }

    #[tokio::test]
    async fn test_read_answer_accepts_binary_json() {
        let body = r#"{"header":{"code":0},"payload":{"choices":{"status":2,"text":[{"content":"bin"}]}}}"#;
        let mut frames = stream::iter(vec![Ok(Message::binary(body.as_bytes().to_vec()))]);
        assert_eq!(read_answer(&mut frames).await.unwrap(), "bin");
    }

    #[tokio::test]
    async fn test_read_answer_stops_on_protocol_error() {
        let mut frames = stream::iter(vec![
            text_frame(0, "partial"),
            Ok(Message::text(
                r#"{"header":{"code":10007,"message":"busy"}}"#.to_string(),
            )),
            text_frame(2, "never read"),
        ]);

        let err = read_answer(&mut frames).await.unwrap_err();
        assert_eq!(err.code(), Some(10007));
    }

    #[tokio::test]
    async fn test_read_answer_fails_when_stream_ends_early() {
        let mut frames = stream::iter(vec![text_frame(0, "Hel"), text_frame(1, "lo")]);
        let err = read_answer(&mut frames).await.unwrap_err();
        assert!(matches!(err, LLMError::Connection(_)));
    }

    #[tokio::test]
    async fn test_read_answer_fails_on_close_frame() {
        let mut frames = stream::iter(vec![text_frame(0, "Hel"), Ok(Message::Close(None))]);
        let err = read_answer(&mut frames).await.unwrap_err();
        assert!(matches!(err, LLMError::Connection(_)));
    }

    #[test]
    fn test_crypto_provider_installed_once() {
        ensure_crypto_provider();
        ensure_crypto_provider();
        assert!(rustls::crypto::CryptoProvider::get_default().is_some());
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = Config::default();
        let err = SparkClient::from_config(&config).err().unwrap();
        assert!(matches!(err, LLMError::MissingCredential("app_id")));
    }

    #[test]
    fn test_from_config_uses_configured_uid() {
        let config = Config {
            app_id: "app".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            uid: "user-42".to_string(),
            ..Config::default()
        };
        let client = SparkClient::from_config(&config).unwrap();
        assert_eq!(client.uid(), "user-42");
    }
}
