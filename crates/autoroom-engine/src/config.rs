//! Engine-side configuration.

use std::time::Duration;

/// Hard limits imposed by the hosting platform. Values outside them are
/// clamped or truncated, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformLimits {
    /// Maximum room name length in characters.
    pub max_name_len: usize,
    /// Maximum member limit; `0` means unlimited.
    pub max_capacity: u32,
    pub min_bitrate: u32,
    pub max_bitrate: u32,
}

impl Default for PlatformLimits {
    fn default() -> Self {
        Self {
            max_name_len: 100,
            max_capacity: 99,
            min_bitrate: 8_000,
            max_bitrate: 96_000,
        }
    }
}

impl PlatformLimits {
    /// Clamp a requested member limit. `None` and `0` both mean unlimited.
    pub fn clamp_capacity(&self, capacity: Option<u32>) -> u32 {
        capacity.unwrap_or(0).min(self.max_capacity)
    }

    pub fn clamp_bitrate(&self, bitrate: Option<u32>) -> Option<u32> {
        bitrate.map(|b| b.clamp(self.min_bitrate, self.max_bitrate.max(self.min_bitrate)))
    }
}

/// Shortest sweep period the engine will run with.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for the provisioning engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Period of the reconciliation sweep.
    pub sweep_interval: Duration,
    /// Upper bound on any single platform call.
    pub platform_timeout: Duration,
    /// Capacity of the transition queue and the event bus.
    pub event_buffer: usize,
    pub limits: PlatformLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(10),
            platform_timeout: Duration::from_secs(10),
            event_buffer: 256,
            limits: PlatformLimits::default(),
        }
    }
}

impl EngineConfig {
    /// The sweep period actually used: `sweep_interval`, raised to
    /// [`MIN_SWEEP_INTERVAL`].
    pub fn sweep_period(&self) -> Duration {
        self.sweep_interval.max(MIN_SWEEP_INTERVAL)
    }
}
