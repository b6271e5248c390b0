use std::sync::atomic::{AtomicU32, Ordering};

use lumen_core::{Children, ContainerId, ExpirationTime, Reconciler, RootId, RootTag};
use slotmap::SlotMap;

use crate::batch::{Batch, BatchId};
use crate::error::SchedulerError;
use crate::root::{HydrationCallbacks, RootState};
use crate::work::Callback;

/// Where the unique async priority allocator starts, just below `SYNC`.
const FIRST_BATCH_PRIORITY: u32 = u32::MAX - 2;

/// The owning scheduler instance: the arena of root records, the arena of
/// deferred batches, the reconciliation collaborator, and the unique async
/// priority counter. One of these exists per embedding application; all
/// calls happen on the single logical scheduling thread.
pub struct Scheduler<R: Reconciler> {
    roots: SlotMap<RootId, RootState>,
    batches: SlotMap<BatchId, Batch>,
    pub reconciler: R,
    /// Counts down so newer batches default to lower urgency, which keeps
    /// async requests FIFO. Reset only when the scheduler is reconstructed.
    next_async_priority: AtomicU32,
}

impl<R: Reconciler> Scheduler<R> {
    pub fn new(reconciler: R) -> Self {
        Self {
            roots: SlotMap::with_key(),
            batches: SlotMap::with_key(),
            reconciler,
            next_async_priority: AtomicU32::new(FIRST_BATCH_PRIORITY),
        }
    }

    /// Construct a root record together with its paired tree-root node and
    /// establish the mutual handle pair. Pure allocation; no errors.
    pub fn create_root(
        &mut self,
        container_info: ContainerId,
        tag: RootTag,
        hydrate: bool,
        hydration_callbacks: Option<HydrationCallbacks>,
    ) -> RootId {
        let node = self.reconciler.create_host_root(tag, hydrate);
        let root = self.roots.insert(RootState::new(
            container_info,
            tag,
            node,
            hydrate,
            hydration_callbacks,
        ));
        self.reconciler.bind_state_node(node, root);
        tracing::info!(?root, ?tag, hydrate, "created root");
        root
    }

    pub fn root(&self, id: RootId) -> Option<&RootState> {
        self.roots.get(id)
    }

    pub fn root_mut(&mut self, id: RootId) -> Option<&mut RootState> {
        self.roots.get_mut(id)
    }

    pub fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.batches.get(id)
    }

    /// A globally unique priority for a new async batch. Strictly
    /// decreasing, so two batches never compare equal and newer requests
    /// queue behind older ones.
    fn compute_unique_async_priority(&self) -> ExpirationTime {
        ExpirationTime::from_raw(self.next_async_priority.fetch_sub(1, Ordering::Relaxed))
    }

    /// Allocate a deferred batch against `root` at a fresh async priority.
    pub fn create_batch(&mut self, root: RootId) -> Result<BatchId, SchedulerError> {
        let time = self.compute_unique_async_priority();
        self.create_batch_at(root, time)
    }

    /// Insert a batch at an explicit priority. Embedders that manage their
    /// own priority scale use this; `create_batch` is the normal path.
    pub fn create_batch_at(
        &mut self,
        root_id: RootId,
        time: ExpirationTime,
    ) -> Result<BatchId, SchedulerError> {
        if !self.roots.contains_key(root_id) {
            return Err(SchedulerError::UnknownRoot);
        }
        let id = self.batches.insert(Batch::new(root_id, time));

        let Self { roots, batches, .. } = self;
        let root = &mut roots[root_id];

        // Sorted by descending priority; a new batch goes after existing
        // batches of equal or higher priority.
        let mut insert_after = None;
        let mut insert_before = root.first_batch;
        while let Some(current) = insert_before {
            let batch = &batches[current];
            if batch.expiration_time >= time {
                insert_after = Some(current);
                insert_before = batch.next;
            } else {
                break;
            }
        }
        batches[id].next = insert_before;
        match insert_after {
            Some(previous) => batches[previous].next = Some(id),
            None => root.first_batch = Some(id),
        }
        Ok(id)
    }

    /// Record `children` as the batch's content and enqueue a render request
    /// with the reconciler at the batch's fixed priority. The request's
    /// commit is what eventually resolves the batch's completion token.
    pub fn render_batch(
        &mut self,
        batch_id: BatchId,
        children: Children,
    ) -> Result<(), SchedulerError> {
        let Self {
            batches,
            reconciler,
            ..
        } = self;
        let batch = batches
            .get_mut(batch_id)
            .ok_or(SchedulerError::UnknownBatch)?;
        if !batch.defer {
            return Err(SchedulerError::RenderAfterCommit);
        }
        batch.children = Some(children);
        reconciler.update_container(children, batch.root, None, batch.expiration_time);
        Ok(())
    }

    /// Register a completion continuation on a batch. Fires immediately if
    /// the batch already committed, otherwise FIFO at commit.
    pub fn batch_then(
        &mut self,
        batch_id: BatchId,
        on_complete: Callback,
    ) -> Result<(), SchedulerError> {
        let batch = self
            .batches
            .get_mut(batch_id)
            .ok_or(SchedulerError::UnknownBatch)?;
        batch.completion.then(on_complete);
        Ok(())
    }

    /// Commit a deferred batch: flush everything at or above its priority
    /// through the reconciler, pop it from its root's queue, and resolve its
    /// completion token exactly once.
    ///
    /// A batch that is not the current head is first promoted: it adopts the
    /// head's priority and its children are rendered again at that priority,
    /// since a more urgent batch must not be skipped past. The re-render can
    /// re-run a side-effecting children generator; callers who pass one
    /// should treat commit-out-of-order as a duplicate-invocation hazard.
    pub fn commit_batch(&mut self, batch_id: BatchId) -> Result<(), SchedulerError> {
        let Self {
            roots,
            batches,
            reconciler,
            ..
        } = self;
        let batch = batches.get(batch_id).ok_or(SchedulerError::UnknownBatch)?;
        let root_id = batch.root;
        let root = roots.get_mut(root_id).ok_or(SchedulerError::UnknownRoot)?;
        let Some(first) = root.first_batch else {
            return Err(SchedulerError::AlreadyCommitted);
        };
        if !batch.defer {
            return Err(SchedulerError::AlreadyCommitted);
        }

        let Some(children) = batch.children else {
            // Nothing was ever rendered into this batch; drop it from
            // scheduling without flushing. Its continuations never fire.
            Self::unlink(root, batches, batch_id)?;
            let batch = &mut batches[batch_id];
            batch.next = None;
            batch.defer = false;
            return Ok(());
        };

        let mut time = batch.expiration_time;
        if first != batch_id {
            // Promote: adopt the head's priority, render again at it, and
            // relink at the front.
            time = batches[first].expiration_time;
            batches[batch_id].expiration_time = time;
            tracing::debug!(?root_id, ?time, "promoting batch to queue head");
            reconciler.update_container(children, root_id, None, time);

            Self::unlink(root, batches, batch_id)?;
            batches[batch_id].next = Some(first);
            root.first_batch = Some(batch_id);
        }

        batches[batch_id].defer = false;
        tracing::debug!(?root_id, ?time, "committing batch");
        reconciler.flush_root_up_to(root_id, time);

        // Pop from the head.
        let next = batches[batch_id].next.take();
        root.first_batch = next;

        // Committing may have consumed the update-queue entries the next
        // batch depended on; re-issue its render so they are freshly
        // enqueued before its own commit.
        if let Some(next_id) = next {
            if let Some(next_children) = batches[next_id].children {
                reconciler.update_container(
                    next_children,
                    root_id,
                    None,
                    batches[next_id].expiration_time,
                );
            }
        }

        batches[batch_id].completion.resolve();
        Ok(())
    }

    /// The batches currently queued on `root`, head first.
    pub fn queued_batches(&self, root_id: RootId) -> Vec<BatchId> {
        let mut out = Vec::new();
        let Some(root) = self.roots.get(root_id) else {
            return out;
        };
        let mut cursor = root.first_batch;
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.batches[id].next;
        }
        out
    }

    /// Remove `batch_id` from its root's singly linked queue. This is the
    /// previous-pointer walk: O(queue length), acceptable because queues
    /// stay shallow in practice.
    fn unlink(
        root: &mut RootState,
        batches: &mut SlotMap<BatchId, Batch>,
        batch_id: BatchId,
    ) -> Result<(), SchedulerError> {
        let Some(first) = root.first_batch else {
            return Err(SchedulerError::AlreadyCommitted);
        };
        if first == batch_id {
            root.first_batch = batches[batch_id].next;
            return Ok(());
        }
        let mut previous = first;
        loop {
            match batches[previous].next {
                Some(id) if id == batch_id => {
                    batches[previous].next = batches[batch_id].next;
                    return Ok(());
                }
                Some(id) => previous = id,
                // Fell off the end: the batch is not in this root's queue.
                None => return Err(SchedulerError::AlreadyCommitted),
            }
        }
    }
}
