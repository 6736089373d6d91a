//! Per-tenant provisioning policy.

use serde::{Deserialize, Serialize};

use crate::id::{GroupId, ResourceId};

/// Name template used when a tenant does not configure one.
pub const DEFAULT_NAME_TEMPLATE: &str = "{user}'s Room";

/// How a tenant wants its rooms provisioned.
///
/// Owned by whatever configuration store the host application uses; the
/// engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPolicy {
    /// Joining this resource provisions a new room.
    pub creator_resource_id: ResourceId,
    /// Group to create rooms under. Falls back to the creator's own group.
    #[serde(default)]
    pub parent_group_id: Option<GroupId>,
    #[serde(default = "default_name_template")]
    pub name_template: String,
    /// Member limit; `0` or `None` means unlimited.
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub is_private: bool,
    /// Carried for compatibility with stored settings. Vacant rooms are
    /// deleted immediately regardless of this value.
    #[serde(default)]
    pub cleanup_grace_minutes: Option<u32>,
}

fn default_name_template() -> String {
    DEFAULT_NAME_TEMPLATE.to_string()
}

impl TenantPolicy {
    pub fn new(creator_resource_id: ResourceId) -> Self {
        Self {
            creator_resource_id,
            parent_group_id: None,
            name_template: default_name_template(),
            capacity: None,
            bitrate: None,
            is_private: false,
            cleanup_grace_minutes: None,
        }
    }

    pub fn with_name_template(mut self, template: impl Into<String>) -> Self {
        self.name_template = template.into();
        self
    }

    pub fn with_parent_group(mut self, group: GroupId) -> Self {
        self.parent_group_id = Some(group);
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }
}
