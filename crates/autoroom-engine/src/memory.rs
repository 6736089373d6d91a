//! In-memory [`VoicePlatform`] for tests, local replays, and dry runs.
//!
//! Holds resources and member placement under a single lock. Failures can be
//! injected per call kind, and resources can be deleted out of band to model
//! someone removing a room by hand.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use autoroom_common::{GroupId, MemberId, PlatformError, ResourceId, TenantId};
use tokio::sync::RwLock;
use tracing::debug;

use crate::platform::{ResourceSpec, VoicePlatform};
use crate::router::VoiceTransition;

/// First id handed out by `create_resource`, kept clear of hand-seeded ids.
pub const FIRST_CREATED_ID: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MemoryResource {
    tenant_id: TenantId,
    parent_id: Option<GroupId>,
    /// Present for resources created through the platform API.
    spec: Option<ResourceSpec>,
    members: BTreeSet<MemberId>,
}

#[derive(Debug, Default)]
struct MemoryState {
    resources: HashMap<ResourceId, MemoryResource>,
    placement: HashMap<(TenantId, MemberId), ResourceId>,
    fail_creates: bool,
    fail_moves: bool,
    delete_races: bool,
    unavailable: bool,
    latency: Option<Duration>,
    create_calls: usize,
    delete_calls: usize,
}

impl MemoryState {
    fn check_available(&self) -> Result<(), PlatformError> {
        if self.unavailable {
            return Err(PlatformError::Unavailable("platform offline".into()));
        }
        Ok(())
    }

    fn place(&mut self, tenant_id: TenantId, member_id: MemberId, target: Option<ResourceId>) {
        if let Some(old) = self.placement.remove(&(tenant_id, member_id)) {
            if let Some(resource) = self.resources.get_mut(&old) {
                resource.members.remove(&member_id);
            }
        }
        let Some(target) = target else {
            return;
        };
        if let Some(resource) = self.resources.get_mut(&target) {
            resource.members.insert(member_id);
            self.placement.insert((tenant_id, member_id), target);
        }
    }

    fn drop_resource(&mut self, resource_id: ResourceId) -> Option<MemoryResource> {
        let resource = self.resources.remove(&resource_id)?;
        for member in &resource.members {
            self.placement.remove(&(resource.tenant_id, *member));
        }
        Some(resource)
    }
}

// ---------------------------------------------------------------------------
// MemoryPlatform
// ---------------------------------------------------------------------------

pub struct MemoryPlatform {
    state: RwLock<MemoryState>,
    next_id: AtomicU64,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            next_id: AtomicU64::new(FIRST_CREATED_ID),
        }
    }

    /// Seed a resource that already exists on the platform, such as a
    /// creator resource or a lobby.
    pub async fn add_resource(
        &self,
        tenant_id: TenantId,
        resource_id: ResourceId,
        parent_id: Option<GroupId>,
    ) {
        let mut state = self.state.write().await;
        state.resources.insert(
            resource_id,
            MemoryResource {
                tenant_id,
                parent_id,
                spec: None,
                members: BTreeSet::new(),
            },
        );
    }

    /// Apply a membership change the way the platform would before
    /// notifying the engine.
    pub async fn apply_transition(&self, transition: &VoiceTransition) {
        let mut state = self.state.write().await;
        state.place(
            transition.tenant_id,
            transition.member_id,
            transition.current_resource_id,
        );
    }

    /// Put a member into a resource, leaving wherever they were.
    pub async fn connect(&self, tenant_id: TenantId, member_id: MemberId, resource_id: ResourceId) {
        self.state
            .write()
            .await
            .place(tenant_id, member_id, Some(resource_id));
    }

    /// Disconnect a member from voice entirely.
    pub async fn disconnect(&self, tenant_id: TenantId, member_id: MemberId) {
        self.state.write().await.place(tenant_id, member_id, None);
    }

    /// Delete a resource behind the engine's back.
    pub async fn remove_out_of_band(&self, resource_id: ResourceId) -> bool {
        self.state.write().await.drop_resource(resource_id).is_some()
    }

    // -- Failure injection -------------------------------------------------

    pub async fn fail_creates(&self, fail: bool) {
        self.state.write().await.fail_creates = fail;
    }

    pub async fn fail_moves(&self, fail: bool) {
        self.state.write().await.fail_moves = fail;
    }

    /// While set, a delete removes the resource but reports `NotFound`, as if
    /// someone else deleted it between the occupancy check and the delete.
    pub async fn set_delete_races(&self, on: bool) {
        self.state.write().await.delete_races = on;
    }

    /// Every call reports `Unavailable` while set.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Delay every call by `latency` before it touches state.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.write().await.latency = latency;
    }

    // -- Inspection --------------------------------------------------------

    pub async fn exists(&self, resource_id: ResourceId) -> bool {
        self.state.read().await.resources.contains_key(&resource_id)
    }

    pub async fn occupancy(&self, resource_id: ResourceId) -> Option<usize> {
        self.state
            .read()
            .await
            .resources
            .get(&resource_id)
            .map(|r| r.members.len())
    }

    pub async fn members(&self, resource_id: ResourceId) -> Vec<MemberId> {
        self.state
            .read()
            .await
            .resources
            .get(&resource_id)
            .map(|r| r.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The spec a resource was created with.
    pub async fn spec(&self, resource_id: ResourceId) -> Option<ResourceSpec> {
        self.state
            .read()
            .await
            .resources
            .get(&resource_id)
            .and_then(|r| r.spec.clone())
    }

    pub async fn location(&self, tenant_id: TenantId, member_id: MemberId) -> Option<ResourceId> {
        self.state
            .read()
            .await
            .placement
            .get(&(tenant_id, member_id))
            .copied()
    }

    /// Resources created through the platform API that still exist.
    pub async fn created_resources(&self, tenant_id: TenantId) -> Vec<ResourceId> {
        let state = self.state.read().await;
        let mut ids: Vec<ResourceId> = state
            .resources
            .iter()
            .filter(|(_, r)| r.tenant_id == tenant_id && r.spec.is_some())
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub async fn create_calls(&self) -> usize {
        self.state.read().await.create_calls
    }

    pub async fn delete_calls(&self) -> usize {
        self.state.read().await.delete_calls
    }

    async fn simulate_latency(&self) {
        let latency = self.state.read().await.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl VoicePlatform for MemoryPlatform {
    async fn create_resource(
        &self,
        tenant_id: TenantId,
        spec: &ResourceSpec,
    ) -> Result<ResourceId, PlatformError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.create_calls += 1;
        state.check_available()?;
        if state.fail_creates {
            return Err(PlatformError::Unavailable("create rejected".into()));
        }

        let mut id = ResourceId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        while state.resources.contains_key(&id) {
            id = ResourceId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        }
        state.resources.insert(
            id,
            MemoryResource {
                tenant_id,
                parent_id: spec.parent_id,
                spec: Some(spec.clone()),
                members: BTreeSet::new(),
            },
        );
        debug!(tenant = %tenant_id, resource = %id, name = %spec.name, "Memory resource created");
        Ok(id)
    }

    async fn move_member(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        resource_id: ResourceId,
    ) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.check_available()?;
        if state.fail_moves {
            return Err(PlatformError::Unavailable("move rejected".into()));
        }
        if !state.resources.contains_key(&resource_id) {
            return Err(PlatformError::NotFound(format!("resource {resource_id}")));
        }
        state.place(tenant_id, member_id, Some(resource_id));
        Ok(())
    }

    async fn delete_resource(&self, resource_id: ResourceId) -> Result<(), PlatformError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.delete_calls += 1;
        state.check_available()?;
        let dropped = state.drop_resource(resource_id);
        match dropped {
            Some(_) if !state.delete_races => Ok(()),
            _ => Err(PlatformError::NotFound(format!("resource {resource_id}"))),
        }
    }

    async fn live_occupancy(&self, resource_id: ResourceId) -> Result<u32, PlatformError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        state.check_available()?;
        state
            .resources
            .get(&resource_id)
            .map(|r| u32::try_from(r.members.len()).unwrap_or(u32::MAX))
            .ok_or_else(|| PlatformError::NotFound(format!("resource {resource_id}")))
    }

    async fn parent_group(&self, resource_id: ResourceId) -> Result<Option<GroupId>, PlatformError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        state.check_available()?;
        state
            .resources
            .get(&resource_id)
            .map(|r| r.parent_id)
            .ok_or_else(|| PlatformError::NotFound(format!("resource {resource_id}")))
    }
}
