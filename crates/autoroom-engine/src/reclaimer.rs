//! Vacancy handling: delete a managed room once it is observed empty.
//!
//! Safe to call any number of times, from the router and the sweeper at
//! once. The room's guard serialises callers; whoever finds the entry
//! already deregistered does nothing.

use std::sync::Arc;

use autoroom_common::{EngineError, EngineEvent, ReclaimReason, ResourceId, TenantId};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::context::EngineContext;
use crate::directory::ResourceSlot;

/// What a reclaim attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclaimOutcome {
    /// Not in the directory; someone else already reclaimed it.
    NotManaged,
    /// Still has members; the recorded occupancy was refreshed.
    Occupied(u32),
    /// Was empty and has been deleted and deregistered.
    Deleted,
    /// The platform no longer had it; deregistered without a delete.
    AlreadyGone,
}

impl ReclaimOutcome {
    /// Whether the room left the directory as a result of this call.
    pub fn removed(self) -> bool {
        matches!(self, Self::Deleted | Self::AlreadyGone)
    }
}

/// Reclaim a room by id if it is managed and empty.
pub(crate) async fn reclaim(
    ctx: &EngineContext,
    tenant_id: TenantId,
    resource_id: ResourceId,
) -> Result<ReclaimOutcome, EngineError> {
    match ctx.directory.slot(tenant_id, resource_id).await {
        Some(slot) => reclaim_slot(ctx, &slot).await,
        None => Ok(ReclaimOutcome::NotManaged),
    }
}

/// Re-check occupancy under the room's guard, then delete and deregister.
///
/// A transient platform failure leaves the entry in place for the next sweep.
pub(crate) async fn reclaim_slot(
    ctx: &EngineContext,
    slot: &Arc<ResourceSlot>,
) -> Result<ReclaimOutcome, EngineError> {
    let mut live = slot.guard().await;
    if !*live {
        return Ok(ReclaimOutcome::NotManaged);
    }

    let resource_id = slot.resource_id;
    let observed_at = Instant::now();
    let outcome = match ctx.gateway.live_occupancy(resource_id).await {
        Ok(0) => {
            slot.set_occupancy(0, observed_at);
            match ctx.gateway.delete_resource(resource_id).await {
                Ok(()) => ReclaimOutcome::Deleted,
                Err(e) if e.is_not_found() => ReclaimOutcome::AlreadyGone,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(count) => {
            slot.set_occupancy(count, observed_at);
            debug!(resource = %resource_id, occupancy = count, "Room still occupied");
            return Ok(ReclaimOutcome::Occupied(count));
        }
        Err(e) if e.is_not_found() => ReclaimOutcome::AlreadyGone,
        Err(e) => return Err(e.into()),
    };

    *live = false;
    ctx.directory.remove(slot).await;
    drop(live);

    let reason = match outcome {
        ReclaimOutcome::Deleted => ReclaimReason::Vacant,
        _ => ReclaimReason::AlreadyGone,
    };
    info!(
        tenant = %slot.tenant_id,
        resource = %resource_id,
        ?reason,
        "Room reclaimed"
    );
    ctx.publish(EngineEvent::Reclaimed {
        tenant_id: slot.tenant_id,
        resource_id,
        reason,
    });

    Ok(outcome)
}
