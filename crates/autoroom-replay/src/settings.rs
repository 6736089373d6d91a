//! Maps the TOML schema onto engine types.

use std::time::Duration;

use autoroom_config::AutoRoomConfig;
use autoroom_engine::{EngineConfig, PlatformLimits};

pub fn engine_config(config: &AutoRoomConfig) -> EngineConfig {
    EngineConfig {
        sweep_interval: Duration::from_secs(u64::from(config.engine.sweep_interval_secs)),
        platform_timeout: Duration::from_secs(u64::from(config.engine.platform_timeout_secs)),
        event_buffer: config.engine.event_buffer as usize,
        limits: PlatformLimits {
            max_name_len: config.limits.max_name_len as usize,
            max_capacity: config.limits.max_capacity,
            min_bitrate: config.limits.min_bitrate,
            max_bitrate: config.limits.max_bitrate,
        },
    }
}

/// Filter directive for the `autoroom` targets. `RUST_LOG` still wins.
pub fn log_directive(level: &str) -> String {
    format!("autoroom={}", level.to_ascii_lowercase())
}
