//! Engine, platform-limit, and logging configuration types.

use serde::{Deserialize, Serialize};

/// Runtime knobs for the provisioning engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Seconds between reconciliation sweeps.
    pub sweep_interval_secs: u32,
    /// Upper bound on any single platform call.
    pub platform_timeout_secs: u32,
    /// Capacity of the transition queue and the event bus.
    pub event_buffer: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 10,
            platform_timeout_secs: 10,
            event_buffer: 256,
        }
    }
}

/// Hard limits imposed by the hosting platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_name_len: u32,
    pub max_capacity: u32,
    pub min_bitrate: u32,
    pub max_bitrate: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_name_len: 100,
            max_capacity: 99,
            min_bitrate: 8_000,
            max_bitrate: 96_000,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for the `autoroom` targets.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}
