//! Generator UI state and its wire encoding.

use riftworks_core::fixed::Ticks;
use serde::{Deserialize, Serialize};

/// Snapshot pushed to the generator's control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorUiState {
    /// Tick after which the next production may start.
    pub cooldown_end: Ticks,
    /// Required material currently stored in the generator.
    pub material_amount: u32,
    /// Material consumed per production.
    pub material_per_production: u32,
}

/// Errors from UI state encoding.
#[derive(Debug, thiserror::Error)]
pub enum UiStateError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

impl GeneratorUiState {
    /// True once the cooldown has elapsed at `now`.
    pub fn is_ready(&self, now: Ticks) -> bool {
        now >= self.cooldown_end
    }

    pub fn can_afford(&self) -> bool {
        self.material_amount >= self.material_per_production
    }

    /// Ticks left on the cooldown at `now`.
    pub fn cooldown_remaining(&self, now: Ticks) -> Ticks {
        self.cooldown_end.saturating_sub(now)
    }

    /// Encode for transmission to a client.
    pub fn encode(&self) -> Result<Vec<u8>, UiStateError> {
        bitcode::serialize(self).map_err(|e| UiStateError::Encode(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> Result<Self, UiStateError> {
        bitcode::deserialize(data).map_err(|e| UiStateError::Decode(e.to_string()))
    }
}
