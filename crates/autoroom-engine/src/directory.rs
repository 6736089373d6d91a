//! Directory of managed rooms: tenant → resource → ownership record.
//!
//! This is the engine's only shared mutable state. Locks are layered:
//!
//! - the tenant map lock is held only long enough to find or detach a bucket;
//! - each tenant bucket has its own lock, so tenants never contend;
//! - each room has a guard ([`ResourceSlot::guard`]) that serialises the
//!   check-occupancy/delete/deregister sequence for that room alone.
//!
//! A bucket lock may be taken while the tenant map lock is held, never the
//! reverse. No directory lock is ever held across a platform call; only a
//! room's own guard is.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use autoroom_common::{EngineError, MemberId, ResourceId, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Point-in-time view of a managed room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedResource {
    pub resource_id: ResourceId,
    pub tenant_id: TenantId,
    pub owner_id: MemberId,
    pub created_at: DateTime<Utc>,
    pub occupancy_count: u32,
}

/// Last occupancy reading and when the query that produced it started.
#[derive(Debug, Clone, Copy)]
struct Observation {
    count: u32,
    observed_at: Option<Instant>,
}

/// Live directory entry for one room.
pub(crate) struct ResourceSlot {
    pub(crate) resource_id: ResourceId,
    pub(crate) tenant_id: TenantId,
    pub(crate) owner_id: MemberId,
    created_at: DateTime<Utc>,
    occupancy: std::sync::Mutex<Observation>,
    /// `true` while the room is registered. Flipped to `false`, under the
    /// guard, by whoever deregisters it.
    live: Mutex<bool>,
}

impl ResourceSlot {
    fn new(record: &ManagedResource) -> Self {
        Self {
            resource_id: record.resource_id,
            tenant_id: record.tenant_id,
            owner_id: record.owner_id,
            created_at: record.created_at,
            occupancy: std::sync::Mutex::new(Observation {
                count: record.occupancy_count,
                observed_at: None,
            }),
            live: Mutex::new(true),
        }
    }

    /// Acquire this room's guard. Holders must check the flag before acting.
    pub(crate) async fn guard(&self) -> MutexGuard<'_, bool> {
        self.live.lock().await
    }

    /// Record an occupancy reading taken by a query that started at
    /// `observed_at`. Readings older than the stored one are discarded, so
    /// a slow query never overwrites a fresher count. Returns whether the
    /// reading was applied.
    pub(crate) fn set_occupancy(&self, count: u32, observed_at: Instant) -> bool {
        let mut current = self
            .occupancy
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if current.observed_at.is_some_and(|last| last > observed_at) {
            return false;
        }
        *current = Observation {
            count,
            observed_at: Some(observed_at),
        };
        true
    }

    fn occupancy_count(&self) -> u32 {
        self.occupancy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }

    pub(crate) fn snapshot(&self) -> ManagedResource {
        ManagedResource {
            resource_id: self.resource_id,
            tenant_id: self.tenant_id,
            owner_id: self.owner_id,
            created_at: self.created_at,
            occupancy_count: self.occupancy_count(),
        }
    }
}

type Bucket = Arc<RwLock<HashMap<ResourceId, Arc<ResourceSlot>>>>;

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Source of truth for which rooms the engine owns.
#[derive(Default)]
pub struct Directory {
    tenants: RwLock<HashMap<TenantId, Bucket>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    async fn bucket(&self, tenant_id: TenantId) -> Option<Bucket> {
        self.tenants.read().await.get(&tenant_id).cloned()
    }

    /// Register a freshly provisioned room.
    ///
    /// The tenant map read lock is held across the bucket insert so a
    /// concurrent [`Directory::detach_tenant`] cannot drop the entry unseen.
    pub(crate) async fn register(&self, record: ManagedResource) -> Result<(), EngineError> {
        loop {
            {
                let tenants = self.tenants.read().await;
                if let Some(bucket) = tenants.get(&record.tenant_id) {
                    let mut rooms = bucket.write().await;
                    if rooms.contains_key(&record.resource_id) {
                        return Err(EngineError::DuplicateResource(record.resource_id));
                    }
                    rooms.insert(record.resource_id, Arc::new(ResourceSlot::new(&record)));
                    return Ok(());
                }
            }
            self.tenants
                .write()
                .await
                .entry(record.tenant_id)
                .or_default();
        }
    }

    pub(crate) async fn slot(
        &self,
        tenant_id: TenantId,
        resource_id: ResourceId,
    ) -> Option<Arc<ResourceSlot>> {
        let bucket = self.bucket(tenant_id).await?;
        let rooms = bucket.read().await;
        rooms.get(&resource_id).cloned()
    }

    pub async fn contains(&self, tenant_id: TenantId, resource_id: ResourceId) -> bool {
        self.slot(tenant_id, resource_id).await.is_some()
    }

    pub async fn get(&self, tenant_id: TenantId, resource_id: ResourceId) -> Option<ManagedResource> {
        self.slot(tenant_id, resource_id)
            .await
            .map(|slot| slot.snapshot())
    }

    /// All rooms currently managed for a tenant, oldest first.
    pub async fn list(&self, tenant_id: TenantId) -> Vec<ManagedResource> {
        let mut records: Vec<ManagedResource> = self
            .tenant_slots(tenant_id)
            .await
            .iter()
            .map(|slot| slot.snapshot())
            .collect();
        records.sort_by_key(|r| (r.created_at, r.resource_id));
        records
    }

    /// Number of rooms a member owns in a tenant.
    pub async fn owned_count(&self, tenant_id: TenantId, owner_id: MemberId) -> usize {
        self.tenant_slots(tenant_id)
            .await
            .iter()
            .filter(|slot| slot.owner_id == owner_id)
            .count()
    }

    /// Tenants that currently have a bucket.
    pub async fn tenants(&self) -> Vec<TenantId> {
        let mut ids: Vec<TenantId> = self.tenants.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Total number of managed rooms across all tenants.
    pub async fn len(&self) -> usize {
        let buckets: Vec<Bucket> = self.tenants.read().await.values().cloned().collect();
        let mut total = 0;
        for bucket in buckets {
            total += bucket.read().await.len();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of one tenant's slots. No lock is held once this returns.
    pub(crate) async fn tenant_slots(&self, tenant_id: TenantId) -> Vec<Arc<ResourceSlot>> {
        let Some(bucket) = self.bucket(tenant_id).await else {
            return Vec::new();
        };
        let rooms = bucket.read().await;
        rooms.values().cloned().collect()
    }

    /// Snapshot of every slot in every tenant. No lock is held once this returns.
    pub(crate) async fn all_slots(&self) -> Vec<Arc<ResourceSlot>> {
        let buckets: Vec<Bucket> = self.tenants.read().await.values().cloned().collect();
        let mut slots = Vec::new();
        for bucket in buckets {
            slots.extend(bucket.read().await.values().cloned());
        }
        slots
    }

    /// Deregister a room. Only removes the exact slot given, so a stale
    /// handle can never evict a newer entry. Returns whether it was removed.
    pub(crate) async fn remove(&self, slot: &Arc<ResourceSlot>) -> bool {
        let Some(bucket) = self.bucket(slot.tenant_id).await else {
            return false;
        };
        let mut rooms = bucket.write().await;
        let same = rooms
            .get(&slot.resource_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot));
        if same {
            rooms.remove(&slot.resource_id);
        }
        same
    }

    /// Drop a tenant's bucket and hand back its slots. Rooms registered for
    /// the tenant afterwards land in a fresh bucket.
    pub(crate) async fn detach_tenant(&self, tenant_id: TenantId) -> Vec<Arc<ResourceSlot>> {
        let Some(bucket) = self.tenants.write().await.remove(&tenant_id) else {
            return Vec::new();
        };
        let rooms = bucket.read().await;
        rooms.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tenant: u64, resource: u64, owner: u64) -> ManagedResource {
        ManagedResource {
            resource_id: ResourceId::new(resource),
            tenant_id: TenantId::new(tenant),
            owner_id: MemberId::new(owner),
            created_at: Utc::now(),
            occupancy_count: 1,
        }
    }

    #[tokio::test]
    async fn register_and_get() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();

        let got = dir.get(TenantId::new(1), ResourceId::new(10)).await.unwrap();
        assert_eq!(got.owner_id, MemberId::new(100));
        assert_eq!(got.occupancy_count, 1);
        assert!(dir.contains(TenantId::new(1), ResourceId::new(10)).await);
        assert!(!dir.contains(TenantId::new(2), ResourceId::new(10)).await);
    }

    #[tokio::test]
    async fn duplicate_resource_is_rejected() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();
        let err = dir.register(record(1, 10, 101)).await.unwrap_err();
        assert!(matches!(err, EngineError::DuplicateResource(id) if id == ResourceId::new(10)));
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn owned_count_is_per_tenant_and_owner() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();
        dir.register(record(1, 11, 100)).await.unwrap();
        dir.register(record(1, 12, 200)).await.unwrap();
        dir.register(record(2, 13, 100)).await.unwrap();

        assert_eq!(dir.owned_count(TenantId::new(1), MemberId::new(100)).await, 2);
        assert_eq!(dir.owned_count(TenantId::new(1), MemberId::new(200)).await, 1);
        assert_eq!(dir.owned_count(TenantId::new(2), MemberId::new(100)).await, 1);
        assert_eq!(dir.owned_count(TenantId::new(3), MemberId::new(100)).await, 0);
    }

    #[tokio::test]
    async fn remove_only_evicts_matching_slot() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();
        let slot = dir.slot(TenantId::new(1), ResourceId::new(10)).await.unwrap();

        assert!(dir.remove(&slot).await);
        assert!(!dir.remove(&slot).await);

        // A stale handle must not evict a re-registered entry.
        dir.register(record(1, 10, 100)).await.unwrap();
        assert!(!dir.remove(&slot).await);
        assert!(dir.contains(TenantId::new(1), ResourceId::new(10)).await);
    }

    #[tokio::test]
    async fn detach_tenant_leaves_others_untouched() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();
        dir.register(record(1, 11, 101)).await.unwrap();
        dir.register(record(2, 20, 200)).await.unwrap();

        let detached = dir.detach_tenant(TenantId::new(1)).await;
        assert_eq!(detached.len(), 2);
        assert!(dir.list(TenantId::new(1)).await.is_empty());
        assert_eq!(dir.list(TenantId::new(2)).await.len(), 1);
        assert_eq!(dir.tenants().await, vec![TenantId::new(2)]);
    }

    #[tokio::test]
    async fn snapshots_hold_no_locks() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();
        dir.register(record(2, 20, 200)).await.unwrap();

        let slots = dir.all_slots().await;
        assert_eq!(slots.len(), 2);
        // Mutating while holding the snapshot must not deadlock.
        dir.register(record(1, 11, 100)).await.unwrap();
        assert!(dir.remove(&slots[0]).await);
        assert_eq!(dir.len().await, 2);
    }

    #[tokio::test]
    async fn occupancy_updates_show_in_snapshots() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();
        let slot = dir.slot(TenantId::new(1), ResourceId::new(10)).await.unwrap();
        assert!(slot.set_occupancy(4, Instant::now()));
        let got = dir.get(TenantId::new(1), ResourceId::new(10)).await.unwrap();
        assert_eq!(got.occupancy_count, 4);
    }

    #[tokio::test]
    async fn stale_occupancy_reading_is_discarded() {
        let dir = Directory::new();
        dir.register(record(1, 10, 100)).await.unwrap();
        let slot = dir.slot(TenantId::new(1), ResourceId::new(10)).await.unwrap();

        // A slow query started first but reports after a fresher one.
        let slow_started = Instant::now();
        let fresh_started = slow_started + std::time::Duration::from_millis(5);
        assert!(slot.set_occupancy(0, fresh_started));
        assert!(!slot.set_occupancy(3, slow_started));

        let got = dir.get(TenantId::new(1), ResourceId::new(10)).await.unwrap();
        assert_eq!(got.occupancy_count, 0);
    }

    #[tokio::test]
    async fn list_is_sorted_oldest_first() {
        let dir = Directory::new();
        let mut older = record(1, 50, 100);
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        dir.register(record(1, 10, 100)).await.unwrap();
        dir.register(older).await.unwrap();

        let ids: Vec<ResourceId> = dir
            .list(TenantId::new(1))
            .await
            .into_iter()
            .map(|r| r.resource_id)
            .collect();
        assert_eq!(ids, vec![ResourceId::new(50), ResourceId::new(10)]);
    }
}
