pub mod batch;
pub mod error;
pub mod root;
pub mod scheduler;
pub mod work;

pub use batch::{Batch, BatchId};
pub use error::SchedulerError;
pub use root::{
    CallbackId, CallbackPriority, HydrationCallbacks, InteractionId, RootState, RootTracing,
    TimeoutHandle,
};
pub use scheduler::Scheduler;
pub use work::Work;
