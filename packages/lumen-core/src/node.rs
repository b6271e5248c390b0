use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a root record owned by the scheduler.
    pub struct RootId;
    /// Handle to a node in the host tree arena.
    pub struct TreeNodeId;
}

/// Scheduling policy selector for a root. Stored on both the root record and
/// its tree-root node; this core passes it through without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootTag {
    Legacy,
    Batched,
    Concurrent,
}

/// The tree-root node paired with a root record.
///
/// The record and the node reference each other. Both sides of the cycle are
/// arena handles, so tearing either down never dangles.
pub struct TreeNode {
    pub tag: RootTag,
    /// Back-reference to the owning root record; set by the root factory.
    pub state_node: Option<RootId>,
    pub children: SmallVec<[TreeNodeId; 4]>,
}

impl TreeNode {
    pub fn new(tag: RootTag) -> Self {
        Self {
            tag,
            state_node: None,
            children: SmallVec::new(),
        }
    }
}

#[derive(Default)]
pub struct TreeArena {
    pub nodes: SlotMap<TreeNodeId, TreeNode>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }
}

/// Opaque handle to a host element description rendered into a batch. The
/// scheduling core stores and replays it; only the reconciler interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Children(pub u64);

/// Opaque handle to the host container a root was mounted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u64);
