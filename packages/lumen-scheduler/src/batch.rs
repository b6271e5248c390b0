use lumen_core::{Children, ExpirationTime, RootId};
use slotmap::new_key_type;

use crate::work::Work;

new_key_type! {
    /// Handle to a deferred render batch.
    pub struct BatchId;
}

/// A deferred unit of rendering work attached to exactly one root.
///
/// Batches live in their root's queue, a singly linked list ordered by
/// decreasing priority with ties broken by insertion order. A batch's
/// priority is fixed at creation from the scheduler's unique descending
/// allocator; the one exception is promotion during commit, which reassigns
/// it to the current head's priority.
pub struct Batch {
    pub(crate) root: RootId,
    pub(crate) expiration_time: ExpirationTime,
    /// The next lower-or-later batch in the queue.
    pub(crate) next: Option<BatchId>,
    /// Most recent content rendered into this batch, if any. Replayed on
    /// promotion and when this batch becomes the head after a commit.
    pub(crate) children: Option<Children>,
    pub(crate) completion: Work,
    /// True until the batch commits. Committing is not repeatable.
    pub(crate) defer: bool,
}

impl Batch {
    pub(crate) fn new(root: RootId, expiration_time: ExpirationTime) -> Self {
        Self {
            root,
            expiration_time,
            next: None,
            children: None,
            completion: Work::new(),
            defer: true,
        }
    }

    pub fn root(&self) -> RootId {
        self.root
    }

    pub fn expiration_time(&self) -> ExpirationTime {
        self.expiration_time
    }

    pub fn next(&self) -> Option<BatchId> {
        self.next
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<Children> {
        self.children
    }

    pub fn is_deferred(&self) -> bool {
        self.defer
    }

    pub fn did_complete(&self) -> bool {
        self.completion.is_resolved()
    }
}
