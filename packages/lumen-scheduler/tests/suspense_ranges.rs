use lumen_core::{ContainerId, ExpirationTime, RootTag, TreeNodeId};
use lumen_scheduler::{CallbackId, CallbackPriority, InteractionId, RootState, TimeoutHandle};

fn t(raw: u32) -> ExpirationTime {
    ExpirationTime::from_raw(raw)
}

fn new_root() -> RootState {
    RootState::new(
        ContainerId(0),
        RootTag::Concurrent,
        TreeNodeId::default(),
        false,
        None,
    )
}

fn assert_range_invariant(root: &RootState) {
    let first = root.first_suspended_time();
    let last = root.last_suspended_time();
    if !first.is_no_work() {
        assert!(
            first >= last,
            "suspended range stored highest-first: {first:?} >= {last:?}"
        );
        assert!(!last.is_no_work(), "a present range has two real bounds");
    }
}

#[test]
fn fresh_root_has_no_work_anywhere() {
    let root = new_root();
    assert_eq!(root.first_pending_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.first_suspended_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.last_suspended_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.last_pinged_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.last_expired_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.callback_priority, CallbackPriority::NoPriority);
    assert!(root.first_batch().is_none());
    assert!(root.timeout_handle().is_none());
    assert!(!root.has_pending_work());
    assert!(!root.is_suspended_at(t(1)));
}

#[test]
fn update_raises_first_pending_only_upward() {
    let mut root = new_root();
    root.mark_updated_at(t(5));
    assert_eq!(root.first_pending_time(), t(5));

    root.mark_updated_at(t(3));
    assert_eq!(root.first_pending_time(), t(5));

    root.mark_updated_at(t(7));
    assert_eq!(root.first_pending_time(), t(7));
    assert!(root.has_pending_work());
}

#[test]
fn suspend_then_update_at_same_level_clears_the_range() {
    let mut root = new_root();
    root.mark_updated_at(t(5));
    root.mark_suspended_at(t(5));
    assert!(root.is_suspended_at(t(5)));

    root.mark_updated_at(t(5));
    assert_eq!(root.first_suspended_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.last_suspended_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.next_known_pending_level(), ExpirationTime::NO_WORK);
    assert!(!root.is_suspended_at(t(5)));
}

#[test]
fn update_above_the_range_clears_it() {
    let mut root = new_root();
    root.mark_suspended_at(t(5));
    root.mark_suspended_at(t(3));
    assert_eq!(root.first_suspended_time(), t(5));
    assert_eq!(root.last_suspended_time(), t(3));

    root.mark_updated_at(t(6));
    assert!(!root.is_suspended_at(t(4)));
    assert_eq!(root.first_suspended_time(), ExpirationTime::NO_WORK);
}

#[test]
fn update_inside_the_range_narrows_the_lower_bound() {
    let mut root = new_root();
    root.mark_suspended_at(t(7));
    root.mark_suspended_at(t(3));

    root.mark_updated_at(t(4));
    assert_range_invariant(&root);
    // Everything strictly below 4 may still be suspended, 4 itself is not.
    assert_eq!(root.last_suspended_time(), t(5));
    assert!(!root.is_suspended_at(t(4)));
    assert!(root.is_suspended_at(t(5)));
    assert!(root.is_suspended_at(t(7)));
    assert_eq!(root.next_known_pending_level(), t(4));
}

#[test]
fn update_below_the_range_leaves_the_bounds_alone() {
    let mut root = new_root();
    root.mark_suspended_at(t(7));
    root.mark_suspended_at(t(5));

    root.mark_updated_at(t(3));
    assert_eq!(root.first_suspended_time(), t(7));
    assert_eq!(root.last_suspended_time(), t(5));
    assert_eq!(root.next_known_pending_level(), t(3));
}

#[test]
fn finish_sets_first_pending_to_the_remaining_level() {
    let mut root = new_root();
    root.mark_updated_at(t(5));
    root.mark_finished_at(t(5), t(3));
    assert_eq!(root.first_pending_time(), t(3));
}

#[test]
fn finish_at_or_below_the_lower_bound_clears_the_range() {
    let mut root = new_root();
    root.mark_suspended_at(t(5));
    root.mark_suspended_at(t(3));

    root.mark_finished_at(t(3), ExpirationTime::NO_WORK);
    assert_eq!(root.first_suspended_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.last_suspended_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.next_known_pending_level(), ExpirationTime::NO_WORK);
}

#[test]
fn finish_inside_the_range_narrows_the_upper_bound() {
    let mut root = new_root();
    root.mark_suspended_at(t(7));
    root.mark_suspended_at(t(3));

    root.mark_finished_at(t(5), t(3));
    assert_range_invariant(&root);
    assert_eq!(root.first_suspended_time(), t(4));
    assert!(!root.is_suspended_at(t(5)));
    assert!(root.is_suspended_at(t(4)));
    assert!(root.is_suspended_at(t(3)));
}

#[test]
fn membership_is_inclusive_of_both_bounds() {
    let mut root = new_root();
    root.mark_suspended_at(t(8));
    root.mark_suspended_at(t(4));

    assert!(root.is_suspended_at(t(4)));
    assert!(root.is_suspended_at(t(6)));
    assert!(root.is_suspended_at(t(8)));
    assert!(!root.is_suspended_at(t(3)));
    assert!(!root.is_suspended_at(t(9)));
}

#[test]
fn range_invariant_holds_across_interleaved_sequences() {
    let mut root = new_root();
    let script: &[(&str, u32)] = &[
        ("update", 10),
        ("suspend", 10),
        ("update", 4),
        ("suspend", 7),
        ("update", 8),
        ("suspend", 3),
        ("finish", 6),
        ("suspend", 9),
        ("update", 12),
    ];
    for &(op, raw) in script {
        match op {
            "update" => root.mark_updated_at(t(raw)),
            "suspend" => root.mark_suspended_at(t(raw)),
            "finish" => root.mark_finished_at(t(raw), t(raw.saturating_sub(1))),
            _ => unreachable!(),
        }
        assert_range_invariant(&root);
    }
}

#[test]
fn expiry_keeps_the_first_level_to_expire() {
    let mut root = new_root();
    root.mark_expired_at(t(5));
    assert_eq!(root.last_expired_time(), t(5));

    // A less urgent (higher-valued) deadline does not displace it.
    root.mark_expired_at(t(7));
    assert_eq!(root.last_expired_time(), t(5));

    root.mark_expired_at(t(3));
    assert_eq!(root.last_expired_time(), t(3));
}

#[test]
fn suspending_clears_pings_and_expiries_at_or_above_the_level() {
    let mut root = new_root();
    root.mark_pinged_at(t(5));
    root.mark_expired_at(t(6));

    root.mark_suspended_at(t(5));
    assert_eq!(root.last_pinged_time(), ExpirationTime::NO_WORK);
    assert_eq!(root.last_expired_time(), ExpirationTime::NO_WORK);
}

#[test]
fn suspending_above_an_expiry_leaves_it_recorded() {
    let mut root = new_root();
    root.mark_expired_at(t(4));
    root.mark_suspended_at(t(5));
    assert_eq!(root.last_expired_time(), t(4));
}

#[test]
fn finishing_clears_pings_at_or_above_the_finished_level() {
    let mut root = new_root();
    root.mark_pinged_at(t(6));
    root.mark_finished_at(t(5), t(3));
    assert_eq!(root.last_pinged_time(), ExpirationTime::NO_WORK);

    root.mark_pinged_at(t(2));
    root.mark_finished_at(t(5), t(2));
    assert_eq!(root.last_pinged_time(), t(2));
}

#[test]
fn next_time_to_work_on_prefers_expired_levels() {
    let mut root = new_root();
    root.mark_updated_at(t(5));
    root.mark_expired_at(t(3));
    assert_eq!(root.next_time_to_work_on(), t(3));
}

#[test]
fn next_time_to_work_on_returns_unsuspended_pending_level() {
    let mut root = new_root();
    root.mark_updated_at(t(5));
    assert_eq!(root.next_time_to_work_on(), t(5));
}

#[test]
fn next_time_to_work_on_waits_for_a_ping_while_suspended() {
    let mut root = new_root();
    root.mark_updated_at(t(5));
    root.mark_suspended_at(t(5));
    assert_eq!(root.next_time_to_work_on(), ExpirationTime::NO_WORK);

    root.mark_pinged_at(t(5));
    assert_eq!(root.next_time_to_work_on(), t(5));
}

#[test]
fn timeout_handles_supersede_one_at_a_time() {
    let mut root = new_root();
    assert_eq!(root.install_timeout_handle(TimeoutHandle(1)), None);
    // The previous handle comes back so the caller can cancel it.
    assert_eq!(
        root.install_timeout_handle(TimeoutHandle(2)),
        Some(TimeoutHandle(1))
    );
    assert_eq!(root.take_timeout_handle(), Some(TimeoutHandle(2)));
    assert_eq!(root.timeout_handle(), None);
}

#[test]
fn render_callback_bookkeeping_round_trips() {
    let mut root = new_root();
    root.set_render_callback(CallbackId(7), t(5), CallbackPriority::UserBlocking);
    assert_eq!(root.callback_node, Some(CallbackId(7)));
    assert_eq!(root.callback_expiration_time, t(5));
    assert_eq!(root.callback_priority, CallbackPriority::UserBlocking);

    root.clear_render_callback();
    assert_eq!(root.callback_node, None);
    assert_eq!(root.callback_expiration_time, ExpirationTime::NO_WORK);
    assert_eq!(root.callback_priority, CallbackPriority::NoPriority);
}

#[test]
fn finished_work_resets_when_taken() {
    let mut root = new_root();
    root.set_finished(TreeNodeId::default(), t(5));
    assert_eq!(root.finished_expiration_time, t(5));

    let taken = root.take_finished();
    assert_eq!(taken, Some((TreeNodeId::default(), t(5))));
    assert_eq!(root.finished_expiration_time, ExpirationTime::NO_WORK);
    assert!(root.finished_work.is_none());
    assert_eq!(root.take_finished(), None);
}

#[test]
fn interaction_tracing_is_inert_unless_enabled() {
    let mut root = new_root();
    root.schedule_interactions(t(5), [InteractionId(1)]);
    assert!(root.tracing.is_none());
}

#[test]
fn finished_interactions_drop_committed_levels() {
    let mut root = new_root();
    root.enable_interaction_tracing(42);
    root.schedule_interactions(t(5), [InteractionId(1), InteractionId(2)]);
    root.schedule_interactions(t(2), [InteractionId(3)]);

    // Levels above the remaining time committed; their interactions drop.
    root.finish_interactions(t(3));
    let tracing = root.tracing.as_ref().unwrap();
    assert!(!tracing.pending_interaction_map.contains_key(&t(5)));
    assert!(tracing.pending_interaction_map.contains_key(&t(2)));
    assert!(tracing.memoized_interactions.contains(&InteractionId(3)));
    assert!(!tracing.memoized_interactions.contains(&InteractionId(1)));
}
