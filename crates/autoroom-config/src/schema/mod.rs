//! Configuration schema types for AutoRoom.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod engine;
mod tenant;

pub use engine::*;
pub use tenant::*;

use std::collections::BTreeMap;

use autoroom_common::{ConfigError, TenantId, TenantPolicy};
use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct AutoRoomConfig {
    pub engine: EngineSettings,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
    /// Tenant policies keyed by tenant id.
    pub tenants: BTreeMap<String, TenantConfig>,
}

impl AutoRoomConfig {
    /// Resolve the `[tenants]` table into typed policies.
    pub fn tenant_policies(&self) -> Result<Vec<(TenantId, TenantPolicy)>, ConfigError> {
        self.tenants
            .iter()
            .map(|(key, tenant)| {
                let tenant_id = key.parse::<TenantId>().map_err(|e| {
                    ConfigError::ParseError(format!("invalid tenant id '{key}': {e}"))
                })?;
                let policy = tenant
                    .to_policy()
                    .map_err(|e| ConfigError::ParseError(format!("tenants.{key}: {e}")))?;
                Ok((tenant_id, policy))
            })
            .collect()
    }
}
