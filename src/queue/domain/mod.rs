//! Domain model for background task admission and lifecycle tracking.
//!
//! The queue domain models task submissions, the pending/in-progress queue
//! rows they become, the append-only activity history they end in, and the
//! cluster-wide pause states, while keeping all infrastructure concerns
//! outside of the domain boundary.

mod error;
mod ids;
mod pause;
mod record;
mod submission;
mod task;

pub use error::{ParseActivityStatusError, ParseTaskStatusError, QueueDomainError};
pub use ids::{ComponentId, EntityId, SubmitterId, TaskId, WorkerId};
pub use pause::WorkersPauseStatus;
pub use record::{
    ActivityRecord, ActivityStatus, PersistedActivityData, PersistedQueueData, QueueRecord,
    TaskFailure, TaskStatus,
};
pub use submission::{TaskComponent, TaskSubmission, UniquenessPolicy};
pub use task::{ComponentSnapshot, SubmitterSnapshot, Task};
