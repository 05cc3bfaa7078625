//! Runtime configuration

use std::time::Duration;

use rundelta_state::{EngineConfig, SweepPolicy, UnknownGenerationPolicy};
use serde::Deserialize;

use crate::RuntimeResult;

/// Sweep policy as written in config files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepPolicyConfig {
    #[default]
    Placeholder,
    Remove,
}

/// Unknown-generation policy as written in config files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownGenerationConfig {
    #[default]
    Adopt,
    Reject,
}

/// Session runtime configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    /// Sweep grace window in milliseconds
    pub sweep_delay_ms: u64,
    pub sweep_policy: SweepPolicyConfig,
    pub unknown_generation: UnknownGenerationConfig,
    /// Inbound event channel capacity
    pub event_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            sweep_delay_ms: 3000,
            sweep_policy: SweepPolicyConfig::Placeholder,
            unknown_generation: UnknownGenerationConfig::Adopt,
            event_buffer: 256,
        }
    }
}

impl RuntimeConfig {
    /// Parse from JSON; missing keys take defaults, unknown keys are ignored
    pub fn from_json(json: &str) -> RuntimeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn sweep_delay(&self) -> Duration {
        Duration::from_millis(self.sweep_delay_ms)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sweep_delay: self.sweep_delay(),
            sweep_policy: match self.sweep_policy {
                SweepPolicyConfig::Placeholder => SweepPolicy::Placeholder,
                SweepPolicyConfig::Remove => SweepPolicy::Remove,
            },
            unknown_generation: match self.unknown_generation {
                UnknownGenerationConfig::Adopt => UnknownGenerationPolicy::Adopt,
                UnknownGenerationConfig::Reject => UnknownGenerationPolicy::Reject,
            },
        }
    }
}
