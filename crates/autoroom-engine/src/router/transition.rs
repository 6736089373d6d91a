//! Membership transitions and their classification.

use autoroom_common::{MemberId, ResourceId, TenantId};
use serde::{Deserialize, Serialize};

/// One membership change as delivered by the platform gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceTransition {
    pub tenant_id: TenantId,
    pub member_id: MemberId,
    #[serde(default)]
    pub previous_resource_id: Option<ResourceId>,
    #[serde(default)]
    pub current_resource_id: Option<ResourceId>,
    #[serde(default)]
    pub member_display_name: String,
    #[serde(default)]
    pub member_activity: Option<String>,
}

impl VoiceTransition {
    /// Member connected to `resource` from nowhere.
    pub fn joined(tenant_id: TenantId, member_id: MemberId, resource: ResourceId) -> Self {
        Self::moved(tenant_id, member_id, None, Some(resource))
    }

    /// Member disconnected from `resource`.
    pub fn left(tenant_id: TenantId, member_id: MemberId, resource: ResourceId) -> Self {
        Self::moved(tenant_id, member_id, Some(resource), None)
    }

    pub fn moved(
        tenant_id: TenantId,
        member_id: MemberId,
        previous: Option<ResourceId>,
        current: Option<ResourceId>,
    ) -> Self {
        Self {
            tenant_id,
            member_id,
            previous_resource_id: previous,
            current_resource_id: current,
            member_display_name: String::new(),
            member_activity: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.member_display_name = name.into();
        self
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.member_activity = Some(activity.into());
        self
    }
}

/// What a transition asks the engine to do. At most one of each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Provision a room for the member.
    pub create: bool,
    /// Check this room for vacancy.
    pub vacate: Option<ResourceId>,
}

impl Dispatch {
    pub fn is_empty(&self) -> bool {
        !self.create && self.vacate.is_none()
    }
}

/// Classify a transition.
///
/// - creation: no previous resource, and the current one is the creator;
/// - vacancy: the previous resource is managed, and the member is now
///   nowhere, in the creator, or in another managed room.
///
/// Same-resource updates (mute, deafen, stream) never dispatch.
pub fn classify(
    transition: &VoiceTransition,
    creator: ResourceId,
    previous_managed: bool,
    current_managed: bool,
) -> Dispatch {
    let previous = transition.previous_resource_id;
    let current = transition.current_resource_id;
    if previous == current {
        return Dispatch::default();
    }

    let create = previous.is_none() && current == Some(creator);
    let vacate = match previous {
        Some(id)
            if previous_managed
                && (current.is_none() || current == Some(creator) || current_managed) =>
        {
            Some(id)
        }
        _ => None,
    };

    Dispatch { create, vacate }
}
