use thiserror::Error;

/// Contract violations by the calling collaborator. None of these are
/// retryable: a double commit or a post-commit render is a scheduling bug in
/// the caller and must surface immediately rather than be masked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("cannot render into a batch that has already committed")]
    RenderAfterCommit,

    /// Double commit, or commit of a batch no longer in its root's queue.
    #[error("cannot commit a batch more than once")]
    AlreadyCommitted,

    #[error("unknown batch handle")]
    UnknownBatch,

    #[error("unknown root handle")]
    UnknownRoot,
}
