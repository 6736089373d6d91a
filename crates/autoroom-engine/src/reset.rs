//! Tenant reset: best-effort delete of every room managed for one tenant.

use std::sync::Arc;

use autoroom_common::{EngineEvent, ReclaimReason, TenantId};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::EngineContext;
use crate::directory::ResourceSlot;

const RESET_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    pub deleted: usize,
    pub already_gone: usize,
    /// Delete calls that failed. These rooms are no longer tracked.
    pub failed: usize,
}

#[derive(Debug, Clone, Copy)]
enum Removal {
    Skipped,
    Deleted,
    AlreadyGone,
    Failed,
}

/// The tenant's bucket is detached first, so rooms provisioned while the
/// reset runs are tracked normally and other tenants are never touched.
pub(crate) async fn reset_tenant(ctx: &EngineContext, tenant_id: TenantId) -> ResetReport {
    let slots = ctx.directory.detach_tenant(tenant_id).await;

    let removals: Vec<Removal> = stream::iter(slots)
        .map(|slot| async move { remove_slot(ctx, &slot).await })
        .buffer_unordered(RESET_CONCURRENCY)
        .collect()
        .await;

    let mut report = ResetReport::default();
    for removal in removals {
        match removal {
            Removal::Skipped => {}
            Removal::Deleted => report.deleted += 1,
            Removal::AlreadyGone => report.already_gone += 1,
            Removal::Failed => report.failed += 1,
        }
    }

    info!(
        tenant = %tenant_id,
        deleted = report.deleted,
        already_gone = report.already_gone,
        failed = report.failed,
        "Tenant reset"
    );
    ctx.publish(EngineEvent::TenantReset {
        tenant_id,
        deleted: report.deleted + report.already_gone,
        failed: report.failed,
    });
    report
}

async fn remove_slot(ctx: &EngineContext, slot: &Arc<ResourceSlot>) -> Removal {
    let mut live = slot.guard().await;
    if !*live {
        return Removal::Skipped;
    }

    let removal = match ctx.gateway.delete_resource(slot.resource_id).await {
        Ok(()) => Removal::Deleted,
        Err(e) if e.is_not_found() => Removal::AlreadyGone,
        Err(e) => {
            warn!(resource = %slot.resource_id, error = %e, "Reset could not delete room");
            Removal::Failed
        }
    };
    *live = false;
    drop(live);

    if !matches!(removal, Removal::Failed) {
        ctx.publish(EngineEvent::Reclaimed {
            tenant_id: slot.tenant_id,
            resource_id: slot.resource_id,
            reason: ReclaimReason::TenantReset,
        });
    }
    removal
}
