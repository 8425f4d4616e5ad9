//! chat_core - Core types for the Spark chat client
//!
//! This crate provides the data model shared by the protocol client and the CLI:
//! - `message` - Role and ChatMessage
//! - `history` - ChatHistory, the size-bounded conversation log
//! - `model` - ChatModel descriptors and the fixed model catalog
//! - `params` - ChatParams (temperature / top_k)
//! - `config` - Config and Credentials loading
//! - `error_code` - remote service error code descriptions

pub mod config;
pub mod error;
pub mod error_code;
pub mod history;
pub mod message;
pub mod model;
pub mod params;
pub mod paths;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use error::{CoreError, CoreResult};
pub use history::{ChatHistory, TRIM_MARGIN};
pub use message::{ChatMessage, Role};
pub use model::{ChatModel, MODEL_CATALOG};
pub use params::ChatParams;
