//! Periodic reconciliation of the directory against live platform state.
//!
//! This is the backstop for missed, duplicated, or reordered notifications:
//! an empty room survives at most one sweep interval. Each pass works on a
//! snapshot of the directory, queries occupancy without holding any lock,
//! and only takes a room's guard (re-checking occupancy under it) when the
//! room looks empty or gone.

use std::sync::Arc;

use autoroom_common::{EngineError, EngineEvent};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::EngineContext;
use crate::directory::ResourceSlot;
use crate::reclaimer::{reclaim_slot, ReclaimOutcome};

/// Rooms inspected in parallel during one pass.
const SWEEP_CONCURRENCY: usize = 8;

/// Tally of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub inspected: usize,
    /// Deleted or dropped as already gone.
    pub reclaimed: usize,
    pub occupied: usize,
    /// Platform failures; these entries stay for the next pass.
    pub failed: usize,
}

/// Background loop. Stops at the next tick boundary after `cancel` fires;
/// a pass already in progress runs to completion.
pub(crate) async fn run(ctx: Arc<EngineContext>, cancel: CancellationToken) {
    let period = ctx.config.sweep_period();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval = ?period, "Sweeper started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                sweep_once(&ctx).await;
            }
        }
    }

    info!("Sweeper stopped");
}

/// One full pass over every tenant.
pub(crate) async fn sweep_once(ctx: &EngineContext) -> SweepReport {
    let slots = ctx.directory.all_slots().await;
    let report = reconcile(ctx, slots).await;

    if report.failed > 0 {
        warn!(
            inspected = report.inspected,
            reclaimed = report.reclaimed,
            failed = report.failed,
            "Sweep finished with failures"
        );
    } else {
        debug!(
            inspected = report.inspected,
            reclaimed = report.reclaimed,
            "Sweep finished"
        );
    }
    ctx.publish(EngineEvent::SweepCompleted {
        inspected: report.inspected,
        reclaimed: report.reclaimed,
        failed: report.failed,
    });

    report
}

/// Reconcile a snapshot of slots. Shared with the admin force-reclaim.
pub(crate) async fn reconcile(ctx: &EngineContext, slots: Vec<Arc<ResourceSlot>>) -> SweepReport {
    let inspected = slots.len();
    let outcomes: Vec<Result<ReclaimOutcome, EngineError>> = stream::iter(slots)
        .map(|slot| async move { sweep_slot(ctx, &slot).await })
        .buffer_unordered(SWEEP_CONCURRENCY)
        .collect()
        .await;

    let mut report = SweepReport {
        inspected,
        ..SweepReport::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(ReclaimOutcome::Deleted | ReclaimOutcome::AlreadyGone) => report.reclaimed += 1,
            Ok(ReclaimOutcome::Occupied(_)) => report.occupied += 1,
            Ok(ReclaimOutcome::NotManaged) => {}
            Err(e) => {
                debug!(error = %e, "Sweep could not reconcile room");
                report.failed += 1;
            }
        }
    }
    report
}

async fn sweep_slot(
    ctx: &EngineContext,
    slot: &Arc<ResourceSlot>,
) -> Result<ReclaimOutcome, EngineError> {
    // Occupied rooms are never locked; only likely candidates take the guard.
    // The reading is stamped with the query start, so it cannot overwrite a
    // fresher count recorded by a concurrent reclaim.
    let observed_at = Instant::now();
    match ctx.gateway.live_occupancy(slot.resource_id).await {
        Ok(count) if count > 0 => {
            slot.set_occupancy(count, observed_at);
            Ok(ReclaimOutcome::Occupied(count))
        }
        Ok(_) => reclaim_slot(ctx, slot).await,
        Err(e) if e.is_not_found() => reclaim_slot(ctx, slot).await,
        Err(e) => Err(e.into()),
    }
}
