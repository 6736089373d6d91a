//! Per-tenant room policy as written in the config file.

use autoroom_common::{GroupId, ResourceId, TenantPolicy, DEFAULT_NAME_TEMPLATE};
use serde::{Deserialize, Serialize};

/// One `[tenants."<id>"]` table.
///
/// Ids are strings so 64-bit snowflakes survive tools that round large
/// integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantConfig {
    pub creator_resource_id: String,
    pub parent_group_id: Option<String>,
    pub name_template: String,
    pub capacity: Option<u32>,
    pub bitrate: Option<u32>,
    pub is_private: bool,
    pub cleanup_grace_minutes: Option<u32>,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            creator_resource_id: String::new(),
            parent_group_id: None,
            name_template: DEFAULT_NAME_TEMPLATE.into(),
            capacity: None,
            bitrate: None,
            is_private: false,
            cleanup_grace_minutes: None,
        }
    }
}

impl TenantConfig {
    pub fn to_policy(&self) -> Result<TenantPolicy, String> {
        let creator = self
            .creator_resource_id
            .parse::<ResourceId>()
            .map_err(|e| format!("creator_resource_id '{}': {e}", self.creator_resource_id))?;
        let parent = match &self.parent_group_id {
            Some(raw) => Some(
                raw.parse::<GroupId>()
                    .map_err(|e| format!("parent_group_id '{raw}': {e}"))?,
            ),
            None => None,
        };

        Ok(TenantPolicy {
            creator_resource_id: creator,
            parent_group_id: parent,
            name_template: self.name_template.clone(),
            capacity: self.capacity,
            bitrate: self.bitrate,
            is_private: self.is_private,
            cleanup_grace_minutes: self.cleanup_grace_minutes,
        })
    }
}
