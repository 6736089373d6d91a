//! The hosting platform's gateway, as seen by the engine.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autoroom_common::{GroupId, MemberId, PlatformError, ResourceId, TenantId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    View,
    Connect,
    ManageChannel,
    MuteMembers,
    MoveMembers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTarget {
    /// The tenant-wide default role.
    Everyone,
    Member(MemberId),
}

/// One permission overwrite on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub target: AccessTarget,
    pub allow: Vec<Permission>,
    pub deny: Vec<Permission>,
}

// ---------------------------------------------------------------------------
// Resource creation
// ---------------------------------------------------------------------------

/// Everything the platform needs to create a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub parent_id: Option<GroupId>,
    /// Member limit; `0` means unlimited.
    pub capacity: u32,
    pub bitrate: Option<u32>,
    pub access: Vec<AccessRule>,
}

// ---------------------------------------------------------------------------
// Gateway seam
// ---------------------------------------------------------------------------

/// Calls the engine makes against the hosting platform.
///
/// `PlatformError::NotFound` from `delete_resource` or `live_occupancy`
/// means the resource is already gone and is treated as success.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    async fn create_resource(
        &self,
        tenant_id: TenantId,
        spec: &ResourceSpec,
    ) -> Result<ResourceId, PlatformError>;

    async fn move_member(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        resource_id: ResourceId,
    ) -> Result<(), PlatformError>;

    async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), PlatformError>;

    async fn live_occupancy(&self, resource_id: ResourceId) -> Result<u32, PlatformError>;

    /// The group a resource currently lives under, if any.
    async fn parent_group(&self, resource_id: ResourceId) -> Result<Option<GroupId>, PlatformError>;
}

/// Wraps a [`VoicePlatform`] so every call is bounded by the engine's
/// platform timeout. An elapsed call reports `Unavailable`.
#[derive(Clone)]
pub(crate) struct Gateway {
    inner: Arc<dyn VoicePlatform>,
    timeout: Duration,
}

impl Gateway {
    pub(crate) fn new(inner: Arc<dyn VoicePlatform>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, PlatformError>>,
    ) -> Result<T, PlatformError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(PlatformError::Unavailable(format!(
                "{op} timed out after {:?}",
                self.timeout
            ))),
        }
    }

    pub(crate) async fn create_resource(
        &self,
        tenant_id: TenantId,
        spec: &ResourceSpec,
    ) -> Result<ResourceId, PlatformError> {
        self.bounded("create_resource", self.inner.create_resource(tenant_id, spec))
            .await
    }

    pub(crate) async fn move_member(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        resource_id: ResourceId,
    ) -> Result<(), PlatformError> {
        self.bounded(
            "move_member",
            self.inner.move_member(tenant_id, member_id, resource_id),
        )
        .await
    }

    pub(crate) async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), PlatformError> {
        self.bounded("delete_resource", self.inner.delete_resource(resource_id))
            .await
    }

    pub(crate) async fn live_occupancy(&self, resource_id: ResourceId) -> Result<u32, PlatformError> {
        self.bounded("live_occupancy", self.inner.live_occupancy(resource_id))
            .await
    }

    pub(crate) async fn parent_group(
        &self,
        resource_id: ResourceId,
    ) -> Result<Option<GroupId>, PlatformError> {
        self.bounded("parent_group", self.inner.parent_group(resource_id))
            .await
    }
}
