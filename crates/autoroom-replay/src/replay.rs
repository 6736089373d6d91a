//! Replays a recorded stream of membership transitions against an
//! in-memory platform.
//!
//! The input is JSON lines, one [`VoiceTransition`] per line. Blank lines
//! and lines starting with `#` are skipped. Rooms created during the replay
//! are numbered from [`FIRST_CREATED_ID`], so later lines can refer to them.

use std::collections::BTreeMap;
use std::sync::Arc;

use autoroom_common::{EngineEvent, ResourceId, TenantId, TenantPolicy};
use autoroom_engine::memory::FIRST_CREATED_ID;
use autoroom_engine::{AutoRoomManager, ManagedResource, MemoryPlatform, SweepReport, VoiceTransition};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("config error: {0}")]
    Config(#[from] autoroom_common::ConfigError),

    #[error("could not read events: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Engine(#[from] autoroom_common::EngineError),
}

/// What a replay did, printed as JSON at the end of a run.
#[derive(Debug, Default, Serialize)]
pub struct ReplaySummary {
    pub transitions: usize,
    pub provisioned: usize,
    pub provision_failed: usize,
    pub reclaimed: usize,
    pub final_sweep: SweepReport,
    pub rooms: BTreeMap<TenantId, Vec<ManagedResource>>,
}

pub fn parse_transitions(input: &str) -> Result<Vec<VoiceTransition>, ReplayError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| ReplayError::Parse {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

/// Seed every tenant's creator resource.
pub async fn seed_platform(platform: &MemoryPlatform, policies: &[(TenantId, TenantPolicy)]) {
    for (tenant_id, policy) in policies {
        platform
            .add_resource(*tenant_id, policy.creator_resource_id, policy.parent_group_id)
            .await;
    }
}

/// Make sure a resource named by a transition exists. Ids in the created
/// range are left alone: those rooms exist only if the engine made them.
async fn ensure_resource(platform: &MemoryPlatform, tenant_id: TenantId, id: Option<ResourceId>) {
    let Some(id) = id else {
        return;
    };
    if id.get() < FIRST_CREATED_ID && !platform.exists(id).await {
        debug!(tenant = %tenant_id, resource = %id, "Seeding unknown resource");
        platform.add_resource(tenant_id, id, None).await;
    }
}

pub struct Replay {
    pub platform: Arc<MemoryPlatform>,
    pub manager: AutoRoomManager,
}

impl Replay {
    /// Apply and handle every transition in order, one at a time.
    pub async fn run_sequential(
        &self,
        transitions: Vec<VoiceTransition>,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut events = self.manager.subscribe();
        let count = transitions.len();

        for transition in transitions {
            ensure_resource(&self.platform, transition.tenant_id, transition.current_resource_id)
                .await;
            self.platform.apply_transition(&transition).await;
            let dispatch = self.manager.handle_transition(transition).await;
            debug!(?dispatch, "Transition handled");
        }

        self.finish(count, &mut events).await
    }

    /// Feed every transition through a running engine, then shut it down.
    /// Handlers run concurrently, so the outcome may differ from a
    /// sequential replay when transitions for one member overlap.
    pub async fn run_concurrent(
        &self,
        transitions: Vec<VoiceTransition>,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut events = self.manager.subscribe();
        let count = transitions.len();
        let engine = self.manager.start();

        for transition in transitions {
            ensure_resource(&self.platform, transition.tenant_id, transition.current_resource_id)
                .await;
            self.platform.apply_transition(&transition).await;
            engine.submit(transition).await?;
        }
        engine.shutdown().await;

        self.finish(count, &mut events).await
    }

    async fn finish(
        &self,
        transitions: usize,
        events: &mut broadcast::Receiver<EngineEvent>,
    ) -> Result<ReplaySummary, ReplayError> {
        let final_sweep = self.manager.sweep_once().await;

        let mut summary = ReplaySummary {
            transitions,
            final_sweep,
            ..ReplaySummary::default()
        };
        while let Ok(event) = events.try_recv() {
            match event {
                EngineEvent::Provisioned { .. } => summary.provisioned += 1,
                EngineEvent::ProvisionFailed { .. } => summary.provision_failed += 1,
                EngineEvent::Reclaimed { .. } => summary.reclaimed += 1,
                EngineEvent::SweepCompleted { .. } | EngineEvent::TenantReset { .. } => {}
            }
        }

        for tenant_id in self.manager.directory().tenants().await {
            let rooms = self.manager.list_managed_resources(tenant_id).await;
            if !rooms.is_empty() {
                summary.rooms.insert(tenant_id, rooms);
            }
        }

        info!(
            transitions = summary.transitions,
            provisioned = summary.provisioned,
            reclaimed = summary.reclaimed,
            "Replay finished"
        );
        Ok(summary)
    }
}
