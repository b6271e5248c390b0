pub mod expiration;
pub mod node;
pub mod reconciler;

pub use expiration::ExpirationTime;
pub use node::{Children, ContainerId, RootId, RootTag, TreeArena, TreeNode, TreeNodeId};
pub use reconciler::{Context, Reconciler};
