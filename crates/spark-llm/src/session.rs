//! ChatSession - one conversation driving a [`ChatTransport`]
//!
//! A session owns its history and allows a single request in flight at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chat_core::{ChatHistory, ChatMessage, ChatModel, ChatParams};
use log::{debug, info, warn};
use tokio::sync::RwLock;

use crate::error::{LLMError, Result};
use crate::provider::ChatTransport;

/// Per-request deadline used unless the caller configures another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    history: RwLock<ChatHistory>,
    in_flight: AtomicBool,
    timeout: Option<Duration>,
}

/// Marks the session busy until dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LLMError::SessionBusy)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            history: RwLock::new(ChatHistory::new()),
            in_flight: AtomicBool::new(false),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait for the transport indefinitely.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_history(mut self, history: ChatHistory) -> Self {
        self.history = RwLock::new(history);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ask `question` against `model` and record the exchange.
    ///
    /// The user turn is recorded before sending and stays in the history when
    /// the request fails; the assistant turn is only added on success. The
    /// history is trimmed to `model`'s budget before it is sent.
    pub async fn ask(
        &self,
        model: &ChatModel,
        params: &ChatParams,
        question: &str,
    ) -> Result<String> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        params.validate()?;

        {
            let mut history = self.history.write().await;
            history.push(ChatMessage::user(question));
            history.trim(model.max_tokens);
        }

        let answer = {
            let history = self.history.read().await;
            debug!(
                "Asking {} with {} message(s) in history",
                model.name,
                history.len()
            );
            let exchange = self.transport.send(model, &history, params, question);
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, exchange).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("Request to {} timed out after {:?}", model.name, limit);
                        Err(LLMError::Timeout(limit))
                    }
                },
                None => exchange.await,
            }
        }?;

        self.history
            .write()
            .await
            .push(ChatMessage::assistant(answer.clone()));
        info!("Exchange with {} complete", model.name);
        Ok(answer)
    }

    /// Snapshot of the current history.
    pub async fn history(&self) -> ChatHistory {
        self.history.read().await.clone()
    }

    /// Drop every recorded message. Rejected while a request is in flight.
    pub async fn clear_history(&self) -> Result<()> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        self.history.write().await.clear();
        Ok(())
    }
}
