//! Validation for the engine, limits, and logging sections.

use crate::schema::AutoRoomConfig;

use super::helpers::validate_range;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub(crate) fn validate_engine(errors: &mut Vec<String>, config: &AutoRoomConfig) {
    validate_range(
        errors,
        "engine.sweep_interval_secs",
        config.engine.sweep_interval_secs,
        1,
        3600,
    );
    validate_range(
        errors,
        "engine.platform_timeout_secs",
        config.engine.platform_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "engine.event_buffer",
        config.engine.event_buffer,
        1,
        65_536,
    );
}

pub(crate) fn validate_limits(errors: &mut Vec<String>, config: &AutoRoomConfig) {
    validate_range(
        errors,
        "limits.max_name_len",
        config.limits.max_name_len,
        1,
        100,
    );
    validate_range(
        errors,
        "limits.max_capacity",
        config.limits.max_capacity,
        0,
        99,
    );
    if config.limits.min_bitrate > config.limits.max_bitrate {
        errors.push(format!(
            "limits.min_bitrate = {} exceeds limits.max_bitrate = {}",
            config.limits.min_bitrate, config.limits.max_bitrate
        ));
    }
}

pub(crate) fn validate_logging(errors: &mut Vec<String>, config: &AutoRoomConfig) {
    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "logging.level = '{}' must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }
}
