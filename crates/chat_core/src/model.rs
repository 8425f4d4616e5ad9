//! ChatModel - Remote model descriptors and the fixed catalog

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Immutable description of one remote model endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatModel {
    /// Display name
    pub name: String,
    /// WebSocket endpoint (`wss://...`)
    pub url: String,
    /// Service-side identifier selecting the model variant
    pub domain: String,
    /// Max token budget for history plus question
    pub max_tokens: u32,
}

impl ChatModel {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        domain: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            domain: domain.into(),
            max_tokens,
        }
    }

    /// Look up a catalog entry by its 1-based position, as shown to users.
    pub fn by_index(index: usize) -> Option<&'static ChatModel> {
        index.checked_sub(1).and_then(|i| MODEL_CATALOG.get(i))
    }

    /// Look up a catalog entry by name, ignoring ASCII case.
    pub fn by_name(name: &str) -> Option<&'static ChatModel> {
        MODEL_CATALOG
            .iter()
            .find(|model| model.name.eq_ignore_ascii_case(name.trim()))
    }

    /// The model used when nothing else is configured.
    pub fn default_model() -> &'static ChatModel {
        &MODEL_CATALOG[0]
    }
}

pub static MODEL_CATALOG: Lazy<Vec<ChatModel>> = Lazy::new(|| {
    vec![
        ChatModel::new("Spark Lite", "wss://spark-api.xf-yun.com/v1.1/chat", "lite", 4096),
        ChatModel::new("Spark Pro", "wss://spark-api.xf-yun.com/v3.1/chat", "generalv3", 8192),
        ChatModel::new(
            "Spark Pro-128K",
            "wss://spark-api.xf-yun.com/chat/pro-128k",
            "pro-128k",
            4096,
        ),
        ChatModel::new("Spark Max", "wss://spark-api.xf-yun.com/v3.5/chat", "generalv3.5", 8192),
        ChatModel::new(
            "Spark Max-32K",
            "wss://spark-api.xf-yun.com/chat/max-32k",
            "max-32k",
            8192,
        ),
        ChatModel::new("Spark4.0 Ultra", "wss://spark-api.xf-yun.com/v4.0/chat", "4.0Ultra", 8192),
    ]
});
