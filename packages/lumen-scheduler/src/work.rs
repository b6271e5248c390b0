use smallvec::SmallVec;

pub type Callback = Box<dyn FnOnce()>;

/// One-shot latch state. Modeling this as a two-state enum makes the
/// "queue vs. fire immediately" branch a total match instead of a boolean
/// flag paired with a nullable list.
enum WorkState {
    Pending(SmallVec<[Callback; 2]>),
    Resolved,
}

/// A one-shot completion token.
///
/// Continuations registered before resolution are queued and run in FIFO
/// order by the first `resolve` call; continuations registered afterwards run
/// immediately. Resolution happens at most once.
pub struct Work {
    state: WorkState,
}

impl Work {
    pub fn new() -> Self {
        Self {
            state: WorkState::Pending(SmallVec::new()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, WorkState::Resolved)
    }

    pub fn then(&mut self, on_complete: Callback) {
        match &mut self.state {
            WorkState::Pending(callbacks) => callbacks.push(on_complete),
            WorkState::Resolved => on_complete(),
        }
    }

    /// Flip the latch and run every queued continuation in registration
    /// order. Idempotent: later calls are no-ops.
    pub fn resolve(&mut self) {
        // The latch reads Resolved before the continuations run, so a
        // re-entrant `then` from inside a continuation fires immediately.
        match std::mem::replace(&mut self.state, WorkState::Resolved) {
            WorkState::Pending(callbacks) => {
                for callback in callbacks {
                    callback();
                }
            }
            WorkState::Resolved => {}
        }
    }
}

impl Default for Work {
    fn default() -> Self {
        Self::new()
    }
}
