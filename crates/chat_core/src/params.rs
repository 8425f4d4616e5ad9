use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_TOP_K: u8 = 4;

/// Sampling parameters sent with each request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ChatParams {
    /// Sampling threshold, in (0, 1]. Higher values give more varied answers.
    pub temperature: f32,
    /// Number of candidates sampled from, in [1, 6].
    pub top_k: u8,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ChatParams {
    pub fn new(temperature: f32, top_k: u8) -> CoreResult<Self> {
        let params = Self { temperature, top_k };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !(self.temperature > 0.0 && self.temperature <= 1.0) {
            return Err(CoreError::InvalidParams(format!(
                "temperature must be in (0, 1], got {}",
                self.temperature
            )));
        }
        if !(1..=6).contains(&self.top_k) {
            return Err(CoreError::InvalidParams(format!(
                "top_k must be in [1, 6], got {}",
                self.top_k
            )));
        }
        Ok(())
    }
}
