//! Room provisioning: create a room for a member who joined the creator,
//! move them into it, and register it.
//!
//! Registration is the last step. Any failure before it leaves the
//! directory untouched, and a room that was created but could not be
//! occupied is deleted again.

mod access;
mod naming;

pub use access::room_access;
pub use naming::{render_name, NameContext};

use autoroom_common::{EngineError, EngineEvent, MemberId, TenantId, TenantPolicy};
use chrono::Utc;
use tracing::{info, warn};

use crate::context::EngineContext;
use crate::directory::ManagedResource;
use crate::platform::ResourceSpec;

/// The member a room is being provisioned for.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub tenant_id: TenantId,
    pub member_id: MemberId,
    pub display_name: String,
    pub activity: Option<String>,
}

pub(crate) async fn provision(
    ctx: &EngineContext,
    request: &ProvisionRequest,
    policy: &TenantPolicy,
) -> Result<ManagedResource, EngineError> {
    let tenant_id = request.tenant_id;
    let member_id = request.member_id;

    let parent_id = match policy.parent_group_id {
        Some(group) => Some(group),
        None => ctx.gateway.parent_group(policy.creator_resource_id).await?,
    };

    let owned = ctx.directory.owned_count(tenant_id, member_id).await;
    let name = render_name(
        &policy.name_template,
        &NameContext {
            user: &request.display_name,
            count: owned + 1,
            game: request.activity.as_deref(),
        },
        ctx.config.limits.max_name_len,
    );

    let spec = ResourceSpec {
        name,
        parent_id,
        capacity: ctx.config.limits.clamp_capacity(policy.capacity),
        bitrate: ctx.config.limits.clamp_bitrate(policy.bitrate),
        access: room_access(member_id, policy.is_private),
    };

    let resource_id = ctx.gateway.create_resource(tenant_id, &spec).await?;

    if let Err(e) = ctx.gateway.move_member(tenant_id, member_id, resource_id).await {
        warn!(
            tenant = %tenant_id,
            member = %member_id,
            resource = %resource_id,
            error = %e,
            "Could not move member into new room, rolling back"
        );
        if let Err(rollback) = ctx.gateway.delete_resource(resource_id).await {
            if !rollback.is_not_found() {
                warn!(resource = %resource_id, error = %rollback, "Rollback delete failed");
            }
        }
        return Err(e.into());
    }

    let record = ManagedResource {
        resource_id,
        tenant_id,
        owner_id: member_id,
        created_at: Utc::now(),
        occupancy_count: 1,
    };
    ctx.directory.register(record.clone()).await?;

    info!(
        tenant = %tenant_id,
        owner = %member_id,
        resource = %resource_id,
        name = %spec.name,
        "Room provisioned"
    );
    ctx.publish(EngineEvent::Provisioned {
        tenant_id,
        resource_id,
        owner_id: member_id,
        name: spec.name,
    });

    Ok(record)
}
