//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use autoroom_common::{EngineEvent, GroupId, MemberId, ResourceId, TenantId, TenantPolicy};
use autoroom_engine::{
    AutoRoomManager, Dispatch, EngineConfig, MemoryPlatform, StaticPolicyProvider, VoiceTransition,
};
use tokio::sync::broadcast;

pub const TENANT: TenantId = TenantId::new(1);
pub const OTHER_TENANT: TenantId = TenantId::new(2);
pub const CREATOR: ResourceId = ResourceId::new(100);
pub const OTHER_CREATOR: ResourceId = ResourceId::new(200);
pub const LOBBY: ResourceId = ResourceId::new(300);
pub const GROUP: GroupId = GroupId::new(50);
pub const BOB: MemberId = MemberId::new(7);
pub const ANA: MemberId = MemberId::new(8);

pub struct Harness {
    pub platform: Arc<MemoryPlatform>,
    pub policies: Arc<StaticPolicyProvider>,
    pub manager: AutoRoomManager,
}

impl Harness {
    pub async fn new(policy: TenantPolicy) -> Self {
        Self::with_config(policy, EngineConfig::default()).await
    }

    pub async fn with_config(policy: TenantPolicy, config: EngineConfig) -> Self {
        let platform = Arc::new(MemoryPlatform::new());
        platform.add_resource(TENANT, CREATOR, Some(GROUP)).await;
        platform.add_resource(TENANT, LOBBY, Some(GROUP)).await;

        let policies = Arc::new(StaticPolicyProvider::from_policies([(TENANT, policy)]));
        let manager = AutoRoomManager::new(platform.clone(), policies.clone(), config);
        Self {
            platform,
            policies,
            manager,
        }
    }

    /// Deliver a transition the way the gateway would: platform state first,
    /// then the notification.
    pub async fn deliver(&self, transition: VoiceTransition) -> Dispatch {
        self.platform.apply_transition(&transition).await;
        self.manager.handle_transition(transition).await
    }

    /// Member joins the creator and gets a room. Returns the room id.
    pub async fn join_creator(&self, member: MemberId, name: &str) -> ResourceId {
        let dispatch = self
            .deliver(VoiceTransition::joined(TENANT, member, CREATOR).with_display_name(name))
            .await;
        assert!(dispatch.create);
        self.platform
            .location(TENANT, member)
            .await
            .expect("member should have been moved into a room")
    }
}

pub fn default_policy() -> TenantPolicy {
    TenantPolicy::new(CREATOR).with_capacity(0)
}

/// Wait for the first event matching `pred`, failing after two seconds.
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<EngineEvent>, mut pred: F) -> EngineEvent
where
    F: FnMut(&EngineEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for engine event")
}
