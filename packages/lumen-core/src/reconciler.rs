use std::any::Any;
use std::rc::Rc;

use crate::expiration::ExpirationTime;
use crate::node::{Children, RootId, RootTag, TreeNodeId};

/// Top-level contextual data threaded through to the reconciler. The
/// scheduling core stores it but never looks inside.
pub type Context = Rc<dyn Any>;

/// The narrow interface the scheduling core consumes from the reconciliation
/// collaborator. The core decides *when* work runs; implementations of this
/// trait decide *what* a render actually does to the tree.
///
/// All calls happen synchronously on the single logical scheduling thread.
pub trait Reconciler {
    /// Allocate the tree-root node that will pair with a new root record.
    fn create_host_root(&mut self, tag: RootTag, hydrate: bool) -> TreeNodeId;

    /// Establish the node -> root back-reference once the record exists.
    fn bind_state_node(&mut self, node: TreeNodeId, root: RootId);

    /// Enqueue a render of `children` against `root` at the given priority.
    fn update_container(
        &mut self,
        children: Children,
        root: RootId,
        parent_context: Option<Context>,
        time: ExpirationTime,
    );

    /// Synchronously drain all work on `root` at or above the given priority.
    fn flush_root_up_to(&mut self, root: RootId, time: ExpirationTime);
}
