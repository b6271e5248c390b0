use lumen_core::{Children, ContainerId, Context, ExpirationTime, RootTag, TreeNodeId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::batch::BatchId;

/// Identity of the single outstanding scheduling request for a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

/// Handle to a host deferred-commit timer. At most one is live per root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutHandle(pub u64);

/// Priority level of the outstanding scheduling callback, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum CallbackPriority {
    #[default]
    NoPriority,
    Idle,
    Low,
    Normal,
    UserBlocking,
    Immediate,
}

/// Identity of a traced interaction, when interaction tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionId(pub u64);

/// Per-root interaction-tracing bookkeeping. Maintained only when the
/// embedder enables tracing; never consulted by the scheduling logic.
pub struct RootTracing {
    pub thread_id: u64,
    pub memoized_interactions: FxHashSet<InteractionId>,
    pub pending_interaction_map: FxHashMap<ExpirationTime, FxHashSet<InteractionId>>,
}

impl RootTracing {
    pub fn new(thread_id: u64) -> Self {
        Self {
            thread_id,
            memoized_interactions: FxHashSet::default(),
            pending_interaction_map: FxHashMap::default(),
        }
    }
}

/// Callbacks invoked by the reconciler while hydrating pre-existing markup.
/// Stored here at construction, never called by this core.
#[derive(Default)]
pub struct HydrationCallbacks {
    pub on_hydrated: Option<Box<dyn Fn(TreeNodeId)>>,
    pub on_deleted: Option<Box<dyn Fn(TreeNodeId)>>,
}

/// The persistent per-mounted-tree scheduling record.
///
/// Owns the pending/suspended/finished priority ranges for one root and the
/// head of its deferred batch queue. The range fields are written only
/// through the `mark_*` mutators below, which are invoked by the reconciler
/// in real event order: an update is discovered, then possibly suspends,
/// then possibly finishes. Each mutator relies on the invariants left by the
/// previous one.
pub struct RootState {
    pub tag: RootTag,
    /// The active tree-root node. The node's `state_node` points back here;
    /// both sides of the cycle are arena handles.
    pub current: TreeNodeId,
    pub container_info: ContainerId,
    /// Host-specific staging data; only the host-mutation layer reads or
    /// writes it.
    pub pending_children: Option<Children>,
    pub finished_expiration_time: ExpirationTime,
    pub finished_work: Option<TreeNodeId>,
    timeout_handle: Option<TimeoutHandle>,
    pub context: Option<Context>,
    pub pending_context: Option<Context>,
    /// True if this root reconciles against pre-existing markup instead of
    /// building from empty. Fixed at construction.
    pub hydrate: bool,
    /// Head of the deferred batch queue, ordered by decreasing priority.
    pub(crate) first_batch: Option<BatchId>,
    pub callback_node: Option<CallbackId>,
    pub callback_expiration_time: ExpirationTime,
    pub callback_priority: CallbackPriority,

    // Priority ranges. `first_pending_time` is the most urgent pending
    // level. The suspended range is stored highest-first:
    // `first_suspended_time >= last_suspended_time` whenever it is present,
    // and NO_WORK in either bound means no suspension at all.
    first_pending_time: ExpirationTime,
    first_suspended_time: ExpirationTime,
    last_suspended_time: ExpirationTime,
    next_known_pending_level: ExpirationTime,
    last_pinged_time: ExpirationTime,
    last_expired_time: ExpirationTime,

    pub tracing: Option<RootTracing>,
    pub hydration_callbacks: Option<HydrationCallbacks>,
}

impl RootState {
    pub fn new(
        container_info: ContainerId,
        tag: RootTag,
        current: TreeNodeId,
        hydrate: bool,
        hydration_callbacks: Option<HydrationCallbacks>,
    ) -> Self {
        Self {
            tag,
            current,
            container_info,
            pending_children: None,
            finished_expiration_time: ExpirationTime::NO_WORK,
            finished_work: None,
            timeout_handle: None,
            context: None,
            pending_context: None,
            hydrate,
            first_batch: None,
            callback_node: None,
            callback_expiration_time: ExpirationTime::NO_WORK,
            callback_priority: CallbackPriority::NoPriority,
            first_pending_time: ExpirationTime::NO_WORK,
            first_suspended_time: ExpirationTime::NO_WORK,
            last_suspended_time: ExpirationTime::NO_WORK,
            next_known_pending_level: ExpirationTime::NO_WORK,
            last_pinged_time: ExpirationTime::NO_WORK,
            last_expired_time: ExpirationTime::NO_WORK,
            tracing: None,
            hydration_callbacks,
        }
    }

    // Read-only views of the range fields. External components query these;
    // only the mutators below may write them.

    pub fn first_pending_time(&self) -> ExpirationTime {
        self.first_pending_time
    }

    pub fn first_suspended_time(&self) -> ExpirationTime {
        self.first_suspended_time
    }

    pub fn last_suspended_time(&self) -> ExpirationTime {
        self.last_suspended_time
    }

    pub fn next_known_pending_level(&self) -> ExpirationTime {
        self.next_known_pending_level
    }

    pub fn last_pinged_time(&self) -> ExpirationTime {
        self.last_pinged_time
    }

    pub fn last_expired_time(&self) -> ExpirationTime {
        self.last_expired_time
    }

    pub fn first_batch(&self) -> Option<BatchId> {
        self.first_batch
    }

    /// Record that priority `time` now has pending work.
    ///
    /// A root must never believe work is suspended at a level for which a
    /// fresh, unsuspended update has since arrived, so an update at or above
    /// the suspended range clears the whole range, and an update inside it
    /// narrows the lower bound past the updated level.
    pub fn mark_updated_at(&mut self, time: ExpirationTime) {
        if time > self.first_pending_time {
            self.first_pending_time = time;
        }

        let first_suspended = self.first_suspended_time;
        if !first_suspended.is_no_work() {
            if time >= first_suspended {
                // The entire suspended range is superseded.
                self.first_suspended_time = ExpirationTime::NO_WORK;
                self.last_suspended_time = ExpirationTime::NO_WORK;
                self.next_known_pending_level = ExpirationTime::NO_WORK;
            } else if time >= self.last_suspended_time {
                // Everything strictly below `time` may still be suspended,
                // but `time` itself is not.
                self.last_suspended_time = time.succ();
            }

            if time > self.next_known_pending_level {
                self.next_known_pending_level = time;
            }
        }
    }

    /// Record that priority `time` is blocked on an external async signal.
    pub fn mark_suspended_at(&mut self, time: ExpirationTime) {
        tracing::debug!(?time, "root suspended");
        let first_suspended = self.first_suspended_time;
        let last_suspended = self.last_suspended_time;
        if first_suspended < time {
            self.first_suspended_time = time;
        }
        if last_suspended > time || first_suspended.is_no_work() {
            self.last_suspended_time = time;
        }

        // A freshly suspended level cannot simultaneously be ready to retry
        // or overdue.
        if time <= self.last_pinged_time {
            self.last_pinged_time = ExpirationTime::NO_WORK;
        }
        if time <= self.last_expired_time {
            self.last_expired_time = ExpirationTime::NO_WORK;
        }
    }

    /// Record that a suspended level was notified ready-to-retry.
    pub fn mark_pinged_at(&mut self, time: ExpirationTime) {
        self.last_pinged_time = time;
    }

    /// Record that all work at or above `finished_time` has committed, with
    /// `remaining_time` the next most urgent pending level (or NO_WORK).
    pub fn mark_finished_at(
        &mut self,
        finished_time: ExpirationTime,
        remaining_time: ExpirationTime,
    ) {
        self.first_pending_time = remaining_time;

        if finished_time <= self.last_suspended_time {
            // The finished work subsumed the entire suspended range.
            self.first_suspended_time = ExpirationTime::NO_WORK;
            self.last_suspended_time = ExpirationTime::NO_WORK;
            self.next_known_pending_level = ExpirationTime::NO_WORK;
        } else if finished_time <= self.first_suspended_time {
            // Only the upper portion resolved; narrow the range to what is
            // strictly below the finished level.
            self.first_suspended_time = finished_time.pred();
        }

        if finished_time <= self.last_pinged_time {
            self.last_pinged_time = ExpirationTime::NO_WORK;
        }
        if finished_time <= self.last_expired_time {
            self.last_expired_time = ExpirationTime::NO_WORK;
        }
    }

    /// Record that priority `time` is overdue and must run synchronously.
    /// The lowest recorded level wins: everything at or above it is flushed,
    /// so the widest deadline covers the rest.
    pub fn mark_expired_at(&mut self, time: ExpirationTime) {
        if self.last_expired_time.is_no_work() || self.last_expired_time > time {
            tracing::debug!(?time, "root expired");
            self.last_expired_time = time;
        }
    }

    /// True iff a suspended range exists and `time` lies within its
    /// inclusive bounds.
    pub fn is_suspended_at(&self, time: ExpirationTime) -> bool {
        let first_suspended = self.first_suspended_time;
        let last_suspended = self.last_suspended_time;
        !first_suspended.is_no_work() && first_suspended >= time && last_suspended <= time
    }

    /// The level the scheduler should work on next: an expired level wins
    /// outright, then an unsuspended `first_pending_time`, then whichever is
    /// higher of the last ping and the next known pending level. An
    /// idle-or-lower level is not picked up until something pings it, unless
    /// it is the only pending work.
    pub fn next_time_to_work_on(&self) -> ExpirationTime {
        if !self.last_expired_time.is_no_work() {
            return self.last_expired_time;
        }

        let first_pending = self.first_pending_time;
        if !self.is_suspended_at(first_pending) {
            return first_pending;
        }

        let next_level = self.last_pinged_time.max(self.next_known_pending_level);
        if next_level <= ExpirationTime::IDLE && first_pending != next_level {
            return ExpirationTime::NO_WORK;
        }
        next_level
    }

    pub fn has_pending_work(&self) -> bool {
        !self.first_pending_time.is_no_work() || !self.last_expired_time.is_no_work()
    }

    /// Install a deferred-commit timer handle, returning the superseded one.
    /// The caller must cancel the returned handle; a root never has two live
    /// timers.
    pub fn install_timeout_handle(&mut self, handle: TimeoutHandle) -> Option<TimeoutHandle> {
        self.timeout_handle.replace(handle)
    }

    pub fn take_timeout_handle(&mut self) -> Option<TimeoutHandle> {
        self.timeout_handle.take()
    }

    pub fn timeout_handle(&self) -> Option<TimeoutHandle> {
        self.timeout_handle
    }

    /// Record the single outstanding scheduling request for this root.
    pub fn set_render_callback(
        &mut self,
        node: CallbackId,
        time: ExpirationTime,
        priority: CallbackPriority,
    ) {
        self.callback_node = Some(node);
        self.callback_expiration_time = time;
        self.callback_priority = priority;
    }

    pub fn clear_render_callback(&mut self) {
        self.callback_node = None;
        self.callback_expiration_time = ExpirationTime::NO_WORK;
        self.callback_priority = CallbackPriority::NoPriority;
    }

    /// Record the most recently completed, not-yet-committed render.
    pub fn set_finished(&mut self, node: TreeNodeId, time: ExpirationTime) {
        self.finished_work = Some(node);
        self.finished_expiration_time = time;
    }

    /// Consume the finished render at commit; resets both fields.
    pub fn take_finished(&mut self) -> Option<(TreeNodeId, ExpirationTime)> {
        let node = self.finished_work.take()?;
        let time = self.finished_expiration_time;
        self.finished_expiration_time = ExpirationTime::NO_WORK;
        Some((node, time))
    }

    pub fn enable_interaction_tracing(&mut self, thread_id: u64) {
        self.tracing = Some(RootTracing::new(thread_id));
    }

    /// Associate interactions with a pending priority level. No-op unless
    /// tracing is enabled.
    pub fn schedule_interactions(
        &mut self,
        time: ExpirationTime,
        interactions: impl IntoIterator<Item = InteractionId>,
    ) {
        if let Some(tracing) = &mut self.tracing {
            let pending = tracing.pending_interaction_map.entry(time).or_default();
            for interaction in interactions {
                pending.insert(interaction);
                tracing.memoized_interactions.insert(interaction);
            }
        }
    }

    /// Drop interaction entries for every level more urgent than
    /// `remaining_time`; those levels just committed.
    pub fn finish_interactions(&mut self, remaining_time: ExpirationTime) {
        if let Some(tracing) = &mut self.tracing {
            tracing
                .pending_interaction_map
                .retain(|&scheduled, _| scheduled <= remaining_time);
            let still_pending: FxHashSet<InteractionId> = tracing
                .pending_interaction_map
                .values()
                .flatten()
                .copied()
                .collect();
            tracing
                .memoized_interactions
                .retain(|interaction| still_pending.contains(interaction));
        }
    }
}
