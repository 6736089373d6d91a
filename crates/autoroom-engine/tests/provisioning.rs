mod common;

use std::sync::Arc;

use autoroom_common::{EngineEvent, MemberId, TenantId, TenantPolicy};
use autoroom_engine::{AccessTarget, Permission, ReclaimOutcome, VoiceTransition};
use common::*;

#[tokio::test]
async fn join_and_leave_creates_then_deletes_room() {
    let h = Harness::new(default_policy()).await;

    let room = h.join_creator(BOB, "Bob").await;
    assert_ne!(room, CREATOR);
    assert_eq!(h.platform.members(room).await, vec![BOB]);
    assert_eq!(h.platform.occupancy(CREATOR).await, Some(0));

    let managed = h.manager.list_managed_resources(TENANT).await;
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].resource_id, room);
    assert_eq!(managed[0].owner_id, BOB);
    assert_eq!(managed[0].occupancy_count, 1);

    let spec = h.platform.spec(room).await.unwrap();
    assert_eq!(spec.name, "Bob's Room");
    assert_eq!(spec.parent_id, Some(GROUP));
    assert_eq!(spec.capacity, 0);

    let dispatch = h.deliver(VoiceTransition::left(TENANT, BOB, room)).await;
    assert_eq!(dispatch.vacate, Some(room));
    assert!(!h.platform.exists(room).await);
    assert!(h.manager.directory().is_empty().await);
}

#[tokio::test]
async fn occupied_room_survives_owner_leaving() {
    let h = Harness::new(default_policy()).await;
    let room = h.join_creator(BOB, "Bob").await;
    h.platform.connect(TENANT, ANA, room).await;

    h.deliver(VoiceTransition::left(TENANT, BOB, room)).await;

    assert!(h.platform.exists(room).await);
    let record = h.manager.directory().get(TENANT, room).await.unwrap();
    assert_eq!(record.occupancy_count, 1);

    h.deliver(VoiceTransition::left(TENANT, ANA, room)).await;
    assert!(!h.platform.exists(room).await);
    assert!(h.manager.directory().is_empty().await);
}

#[tokio::test]
async fn moving_back_to_creator_swaps_rooms() {
    let h = Harness::new(default_policy()).await;
    let first = h.join_creator(BOB, "Bob").await;

    let dispatch = h
        .deliver(VoiceTransition::moved(TENANT, BOB, Some(first), Some(CREATOR)))
        .await;
    assert!(!dispatch.create);
    assert_eq!(dispatch.vacate, Some(first));
    assert!(!h.platform.exists(first).await);
    assert!(h.manager.directory().is_empty().await);
}

#[tokio::test]
async fn concurrent_joins_get_distinct_rooms() {
    let h = Arc::new(Harness::new(default_policy()).await);

    let mut tasks = Vec::new();
    for i in 0..16u64 {
        let h = Arc::clone(&h);
        tasks.push(tokio::spawn(async move {
            let member = MemberId::new(1_000 + i);
            h.join_creator(member, &format!("user{i}")).await
        }));
    }

    let mut rooms = Vec::new();
    for task in tasks {
        rooms.push(task.await.unwrap());
    }
    rooms.sort();
    rooms.dedup();
    assert_eq!(rooms.len(), 16);
    assert_eq!(h.manager.directory().len().await, 16);
}

#[tokio::test]
async fn name_template_counts_owned_rooms() {
    let policy = default_policy().with_name_template("{user}'s {game} #{count}");
    let h = Harness::new(policy).await;

    let first = h
        .deliver(
            VoiceTransition::joined(TENANT, ANA, CREATOR)
                .with_display_name("Ana")
                .with_activity("Chess"),
        )
        .await;
    assert!(first.create);
    let first_room = h.platform.location(TENANT, ANA).await.unwrap();
    assert_eq!(h.platform.spec(first_room).await.unwrap().name, "Ana's Chess #1");

    // A friend keeps the first room alive while Ana starts another.
    h.platform.connect(TENANT, BOB, first_room).await;
    h.deliver(VoiceTransition::left(TENANT, ANA, first_room)).await;

    let second_room = h.join_creator(ANA, "Ana").await;
    assert_eq!(h.platform.spec(second_room).await.unwrap().name, "Ana's #2");
    assert_eq!(h.manager.owned_by(TENANT, ANA).await.len(), 2);
}

#[tokio::test]
async fn private_policy_and_limits_shape_the_room() {
    let policy = TenantPolicy::new(CREATOR)
        .with_capacity(500)
        .with_bitrate(1_000_000)
        .private(true);
    let h = Harness::new(policy).await;

    let room = h.join_creator(BOB, "Bob").await;
    let spec = h.platform.spec(room).await.unwrap();
    assert_eq!(spec.capacity, 99);
    assert_eq!(spec.bitrate, Some(96_000));

    let everyone = spec
        .access
        .iter()
        .find(|rule| rule.target == AccessTarget::Everyone)
        .unwrap();
    assert!(everyone.deny.contains(&Permission::Connect));
    let owner = spec
        .access
        .iter()
        .find(|rule| rule.target == AccessTarget::Member(BOB))
        .unwrap();
    assert!(owner.allow.contains(&Permission::ManageChannel));
}

#[tokio::test]
async fn failed_create_leaves_no_entry() {
    let h = Harness::new(default_policy()).await;
    let mut events = h.manager.subscribe();
    h.platform.fail_creates(true).await;

    let dispatch = h
        .deliver(VoiceTransition::joined(TENANT, BOB, CREATOR).with_display_name("Bob"))
        .await;
    assert!(dispatch.create);
    assert!(h.manager.directory().is_empty().await);
    assert_eq!(h.platform.location(TENANT, BOB).await, Some(CREATOR));

    let event = wait_for(&mut events, |e| matches!(e, EngineEvent::ProvisionFailed { .. })).await;
    assert!(matches!(
        event,
        EngineEvent::ProvisionFailed { member_id, .. } if member_id == BOB
    ));
}

#[tokio::test]
async fn failed_move_rolls_back_the_room() {
    let h = Harness::new(default_policy()).await;
    h.platform.fail_moves(true).await;

    h.deliver(VoiceTransition::joined(TENANT, BOB, CREATOR)).await;

    assert!(h.manager.directory().is_empty().await);
    assert!(h.platform.created_resources(TENANT).await.is_empty());
    assert_eq!(h.platform.create_calls().await, 1);
    assert_eq!(h.platform.delete_calls().await, 1);
}

#[tokio::test]
async fn tenant_without_policy_is_ignored() {
    let h = Harness::new(default_policy()).await;
    let stranger = TenantId::new(99);

    let dispatch = h
        .manager
        .handle_transition(VoiceTransition::joined(stranger, BOB, CREATOR))
        .await;
    assert!(dispatch.is_empty());
    assert_eq!(h.platform.create_calls().await, 0);

    h.policies.remove_policy(TENANT).await;
    let dispatch = h.deliver(VoiceTransition::joined(TENANT, BOB, CREATOR)).await;
    assert!(dispatch.is_empty());
    assert!(h.manager.directory().is_empty().await);
}

#[tokio::test]
async fn same_resource_updates_are_ignored() {
    let h = Harness::new(default_policy()).await;
    let room = h.join_creator(BOB, "Bob").await;

    let dispatch = h
        .deliver(VoiceTransition::moved(TENANT, BOB, Some(room), Some(room)))
        .await;
    assert!(dispatch.is_empty());
    assert!(h.manager.directory().contains(TENANT, room).await);
}

#[tokio::test]
async fn reclaim_is_idempotent_when_room_is_already_gone() {
    let h = Harness::new(default_policy()).await;
    let room = h.join_creator(BOB, "Bob").await;
    h.platform.remove_out_of_band(room).await;

    let outcome = h.manager.reclaim(TENANT, room).await.unwrap();
    assert_eq!(outcome, ReclaimOutcome::AlreadyGone);
    assert!(h.manager.directory().is_empty().await);

    let again = h.manager.reclaim(TENANT, room).await.unwrap();
    assert_eq!(again, ReclaimOutcome::NotManaged);
}

#[tokio::test]
async fn unavailable_platform_keeps_the_entry() {
    let h = Harness::new(default_policy()).await;
    let room = h.join_creator(BOB, "Bob").await;
    h.platform.disconnect(TENANT, BOB).await;
    h.platform.set_unavailable(true).await;

    assert!(h.manager.reclaim(TENANT, room).await.is_err());
    h.manager
        .handle_transition(VoiceTransition::left(TENANT, BOB, room))
        .await;
    assert!(h.manager.directory().contains(TENANT, room).await);

    h.platform.set_unavailable(false).await;
    assert_eq!(
        h.manager.reclaim(TENANT, room).await.unwrap(),
        ReclaimOutcome::Deleted
    );
}
