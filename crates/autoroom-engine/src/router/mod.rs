//! Event routing: classify each transition and hand it to the provisioner
//! or the reclaimer.
//!
//! Transitions arrive on an mpsc queue consumed by a single dispatch loop.
//! Every transition is handled in its own task, so handlers run
//! concurrently and a failing (or panicking) handler never stops the loop.

mod transition;

pub use transition::{classify, Dispatch, VoiceTransition};

use std::sync::Arc;

use autoroom_common::{new_correlation_id, EngineEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::context::EngineContext;
use crate::provisioner::{self, ProvisionRequest};
use crate::reclaimer;

/// Consume transitions until the queue closes or `cancel` fires. On cancel,
/// transitions already queued are still dispatched.
pub(crate) async fn dispatch_loop(
    ctx: Arc<EngineContext>,
    mut rx: mpsc::Receiver<VoiceTransition>,
    tracker: TaskTracker,
    cancel: CancellationToken,
) {
    loop {
        let transition = tokio::select! {
            _ = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(transition) => transition,
                None => break,
            },
        };
        spawn_handler(&ctx, &tracker, transition);
    }

    rx.close();
    while let Some(transition) = rx.recv().await {
        spawn_handler(&ctx, &tracker, transition);
    }
    info!("Dispatch loop stopped");
}

fn spawn_handler(ctx: &Arc<EngineContext>, tracker: &TaskTracker, transition: VoiceTransition) {
    let ctx = Arc::clone(ctx);
    tracker.spawn(async move {
        route(&ctx, transition).await;
    });
}

/// Classify and handle one transition. Never returns an error: failures are
/// logged and published, and the next sweep retries reclamation.
pub(crate) async fn route(ctx: &EngineContext, transition: VoiceTransition) -> Dispatch {
    let span = info_span!(
        "transition",
        cid = %new_correlation_id(),
        tenant = %transition.tenant_id,
        member = %transition.member_id,
    );
    route_inner(ctx, transition).instrument(span).await
}

async fn route_inner(ctx: &EngineContext, transition: VoiceTransition) -> Dispatch {
    let tenant_id = transition.tenant_id;
    let Some(policy) = ctx.policies.tenant_policy(tenant_id).await else {
        debug!("No policy for tenant, ignoring transition");
        return Dispatch::default();
    };

    let previous_managed = match transition.previous_resource_id {
        Some(id) => ctx.directory.contains(tenant_id, id).await,
        None => false,
    };
    let current_managed = match transition.current_resource_id {
        Some(id) => ctx.directory.contains(tenant_id, id).await,
        None => false,
    };

    let dispatch = classify(
        &transition,
        policy.creator_resource_id,
        previous_managed,
        current_managed,
    );

    if let Some(resource_id) = dispatch.vacate {
        match reclaimer::reclaim(ctx, tenant_id, resource_id).await {
            Ok(outcome) => debug!(resource = %resource_id, ?outcome, "Vacancy handled"),
            Err(e) => warn!(
                resource = %resource_id,
                error = %e,
                "Vacancy check failed, leaving room for the sweeper"
            ),
        }
    }

    if dispatch.create {
        let request = ProvisionRequest {
            tenant_id,
            member_id: transition.member_id,
            display_name: transition.member_display_name,
            activity: transition.member_activity,
        };
        if let Err(e) = provisioner::provision(ctx, &request, &policy).await {
            warn!(error = %e, "Provisioning failed");
            ctx.publish(EngineEvent::ProvisionFailed {
                tenant_id,
                member_id: request.member_id,
                error: e.to_string(),
            });
        }
    }

    dispatch
}
