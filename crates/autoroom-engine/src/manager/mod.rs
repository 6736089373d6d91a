//! Room manager: the engine's public facade.

mod handle;

pub use handle::EngineHandle;

use std::sync::Arc;

use autoroom_common::{EngineError, EngineEvent, MemberId, ResourceId, TenantId};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::directory::{Directory, ManagedResource};
use crate::platform::VoicePlatform;
use crate::policy::PolicyProvider;
use crate::reclaimer::{self, ReclaimOutcome};
use crate::reset::{self, ResetReport};
use crate::router::{self, Dispatch, VoiceTransition};
use crate::sweeper::{self, SweepReport};

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Provisions and reclaims ephemeral rooms for every tenant.
///
/// Cheap to clone; clones share one directory.
#[derive(Clone)]
pub struct AutoRoomManager {
    ctx: Arc<EngineContext>,
}

impl AutoRoomManager {
    pub fn new(
        platform: Arc<dyn VoicePlatform>,
        policies: Arc<dyn PolicyProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ctx: Arc::new(EngineContext::new(platform, policies, config)),
        }
    }

    /// Spawn the dispatch loop and the sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> EngineHandle {
        let (tx, rx) = mpsc::channel(self.ctx.config.event_buffer.max(1));
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let dispatch = tokio::spawn(router::dispatch_loop(
            Arc::clone(&self.ctx),
            rx,
            tracker.clone(),
            cancel.clone(),
        ));
        let sweeper = tokio::spawn(sweeper::run(Arc::clone(&self.ctx), cancel.clone()));

        info!(
            sweep_interval = ?self.ctx.config.sweep_period(),
            "Room manager started"
        );
        EngineHandle::new(tx, cancel, tracker, dispatch, sweeper)
    }

    /// Handle one transition inline, bypassing the queue. Returns what the
    /// router decided to do.
    pub async fn handle_transition(&self, transition: VoiceTransition) -> Dispatch {
        router::route(&self.ctx, transition).await
    }

    /// Check a single room for vacancy.
    pub async fn reclaim(
        &self,
        tenant_id: TenantId,
        resource_id: ResourceId,
    ) -> Result<ReclaimOutcome, EngineError> {
        reclaimer::reclaim(&self.ctx, tenant_id, resource_id).await
    }

    /// Run one reconciliation pass now.
    pub async fn sweep_once(&self) -> SweepReport {
        sweeper::sweep_once(&self.ctx).await
    }

    // -- Administrative surface ------------------------------------------

    pub async fn list_managed_resources(&self, tenant_id: TenantId) -> Vec<ManagedResource> {
        self.ctx.directory.list(tenant_id).await
    }

    /// Rooms owned by `member_id` in a tenant.
    pub async fn owned_by(&self, tenant_id: TenantId, member_id: MemberId) -> Vec<ManagedResource> {
        self.ctx
            .directory
            .list(tenant_id)
            .await
            .into_iter()
            .filter(|r| r.owner_id == member_id)
            .collect()
    }

    /// Reconcile every room of one tenant right away, deleting the empty ones.
    pub async fn force_reclaim(&self, tenant_id: TenantId) -> SweepReport {
        let slots = self.ctx.directory.tenant_slots(tenant_id).await;
        let report = sweeper::reconcile(&self.ctx, slots).await;
        info!(
            tenant = %tenant_id,
            inspected = report.inspected,
            reclaimed = report.reclaimed,
            "Forced reclaim"
        );
        report
    }

    /// Delete every room managed for a tenant and forget the tenant.
    pub async fn reset_tenant(&self, tenant_id: TenantId) -> ResetReport {
        reset::reset_tenant(&self.ctx, tenant_id).await
    }

    // -- Accessors -------------------------------------------------------

    pub fn directory(&self) -> &Directory {
        &self.ctx.directory
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.ctx.events().subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }
}
