//! Permission overwrites for a new room.

use autoroom_common::MemberId;

use crate::platform::{AccessRule, AccessTarget, Permission};

const OWNER_PERMISSIONS: &[Permission] = &[
    Permission::View,
    Permission::Connect,
    Permission::ManageChannel,
    Permission::MuteMembers,
    Permission::MoveMembers,
];

const VISIBILITY: &[Permission] = &[Permission::View, Permission::Connect];

/// Owner gets control of their own room; everyone else is let in or kept out
/// depending on `is_private`.
pub fn room_access(owner_id: MemberId, is_private: bool) -> Vec<AccessRule> {
    let everyone = if is_private {
        AccessRule {
            target: AccessTarget::Everyone,
            allow: Vec::new(),
            deny: VISIBILITY.to_vec(),
        }
    } else {
        AccessRule {
            target: AccessTarget::Everyone,
            allow: VISIBILITY.to_vec(),
            deny: Vec::new(),
        }
    };

    vec![
        everyone,
        AccessRule {
            target: AccessTarget::Member(owner_id),
            allow: OWNER_PERMISSIONS.to_vec(),
            deny: Vec::new(),
        },
    ]
}
