//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod engine;
mod helpers;
mod tenants;


use crate::schema::AutoRoomConfig;
use autoroom_common::ConfigError;

/// Run all validations on a config, collecting all errors.
///
/// Tenant capacity and bitrate are not range-checked; the engine clamps them
/// to the platform limits.
pub fn validate(config: &AutoRoomConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    engine::validate_engine(&mut errors, config);
    engine::validate_limits(&mut errors, config);
    engine::validate_logging(&mut errors, config);
    tenants::validate_tenants(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
