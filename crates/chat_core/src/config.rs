use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::params::{ChatParams, DEFAULT_TEMPERATURE, DEFAULT_TOP_K};
use crate::paths::config_json_path;

const CONFIG_FILE_PATH: &str = "config.toml";
const DEFAULT_UID: &str = "spark-chat";
const DEFAULT_TIMEOUT_SECS: u64 = 100;

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_uid")]
    pub uid: String,
    /// 1-based index into the model catalog
    #[serde(default)]
    pub model: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u8,
}

/// Signing inputs for the remote service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub api_key: String,
    pub api_secret: String,
}

fn default_uid() -> String {
    DEFAULT_UID.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_top_k() -> u8 {
    DEFAULT_TOP_K
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            uid: default_uid(),
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Config {
    /// Load configuration from `~/.spark/config.json`, falling back to
    /// `./config.toml`, then apply `SPARK_*` environment overrides.
    pub fn new() -> Self {
        let mut config = Config::default();

        let mut loaded = false;
        let json_path = config_json_path();
        if json_path.exists() {
            match Self::from_json_file(&json_path) {
                Ok(file_config) => {
                    config = file_config;
                    loaded = true;
                }
                Err(err) => log::warn!("Ignoring {}: {}", json_path.display(), err),
            }
        }

        if !loaded && Path::new(CONFIG_FILE_PATH).exists() {
            match Self::from_toml_file(Path::new(CONFIG_FILE_PATH)) {
                Ok(file_config) => config = file_config,
                Err(err) => log::warn!("Ignoring {}: {}", CONFIG_FILE_PATH, err),
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("Failed to read config: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn from_toml_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Failed to parse config: {e}")))
    }

    /// Override fields from `SPARK_*` variables. Values that fail to parse are
    /// logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_id) = lookup("SPARK_APP_ID") {
            self.app_id = app_id;
        }
        if let Some(api_key) = lookup("SPARK_API_KEY") {
            self.api_key = api_key;
        }
        if let Some(api_secret) = lookup("SPARK_API_SECRET") {
            self.api_secret = api_secret;
        }
        if let Some(uid) = lookup("SPARK_UID") {
            self.uid = uid;
        }
        if let Some(model) = lookup("SPARK_MODEL") {
            match model.trim().parse() {
                Ok(index) => self.model = Some(index),
                Err(_) => log::warn!("SPARK_MODEL must be a catalog index, got {model:?}"),
            }
        }
        if let Some(timeout) = lookup("SPARK_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => log::warn!("SPARK_TIMEOUT_SECS must be a number, got {timeout:?}"),
            }
        }
        if let Some(temperature) = lookup("SPARK_TEMPERATURE") {
            match temperature.trim().parse() {
                Ok(value) => self.temperature = value,
                Err(_) => log::warn!("SPARK_TEMPERATURE must be a number, got {temperature:?}"),
            }
        }
        if let Some(top_k) = lookup("SPARK_TOP_K") {
            match top_k.trim().parse() {
                Ok(value) => self.top_k = value,
                Err(_) => log::warn!("SPARK_TOP_K must be a number, got {top_k:?}"),
            }
        }
    }

    /// Credentials for request signing. Fails on the first empty field.
    pub fn credentials(&self) -> CoreResult<Credentials> {
        if self.app_id.trim().is_empty() {
            return Err(CoreError::MissingCredential("app_id"));
        }
        if self.api_key.trim().is_empty() {
            return Err(CoreError::MissingCredential("api_key"));
        }
        if self.api_secret.trim().is_empty() {
            return Err(CoreError::MissingCredential("api_secret"));
        }
        Ok(Credentials {
            app_id: self.app_id.clone(),
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
        })
    }

    pub fn params(&self) -> CoreResult<ChatParams> {
        ChatParams::new(self.temperature, self.top_k)
    }

    /// Per-request deadline. `timeout_secs = 0` disables it.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_id", &self.app_id)
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("uid", &self.uid)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .finish()
    }
}
