use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::{MemberId, ResourceId, TenantId};

/// Why a managed room left the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclaimReason {
    /// Observed empty and deleted.
    Vacant,
    /// The platform no longer had the resource; nothing to delete.
    AlreadyGone,
    /// Removed as part of a tenant reset.
    TenantReset,
}

/// Lifecycle notifications published by the engine for the command layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineEvent {
    Provisioned {
        tenant_id: TenantId,
        resource_id: ResourceId,
        owner_id: MemberId,
        name: String,
    },
    ProvisionFailed {
        tenant_id: TenantId,
        member_id: MemberId,
        error: String,
    },
    Reclaimed {
        tenant_id: TenantId,
        resource_id: ResourceId,
        reason: ReclaimReason,
    },
    SweepCompleted {
        inspected: usize,
        reclaimed: usize,
        failed: usize,
    },
    TenantReset {
        tenant_id: TenantId,
        deleted: usize,
        failed: usize,
    },
}

pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: EngineEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(EngineEvent::Reclaimed {
            tenant_id: TenantId::new(1),
            resource_id: ResourceId::new(2),
            reason: ReclaimReason::Vacant,
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            EngineEvent::Reclaimed { resource_id, reason: ReclaimReason::Vacant, .. }
                if resource_id == ResourceId::new(2)
        ));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(EngineEvent::SweepCompleted {
            inspected: 3,
            reclaimed: 1,
            failed: 0,
        });

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert!(matches!(e1, EngineEvent::SweepCompleted { inspected: 3, .. }));
        assert!(matches!(e2, EngineEvent::SweepCompleted { reclaimed: 1, .. }));
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        let count = bus.publish(EngineEvent::TenantReset {
            tenant_id: TenantId::new(1),
            deleted: 0,
            failed: 0,
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn events_serialize_tagged() {
        let event = EngineEvent::Provisioned {
            tenant_id: TenantId::new(1),
            resource_id: ResourceId::new(2),
            owner_id: MemberId::new(3),
            name: "Ana's Room".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Provisioned");
        assert_eq!(json["data"]["resource_id"], 2);
        assert_eq!(json["data"]["name"], "Ana's Room");
    }

    #[test]
    fn reclaim_reason_is_snake_case() {
        let json = serde_json::to_string(&ReclaimReason::AlreadyGone).unwrap();
        assert_eq!(json, "\"already_gone\"");
    }
}
