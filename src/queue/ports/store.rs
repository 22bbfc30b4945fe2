//! Store port for queue and activity persistence.

use crate::queue::domain::{ActivityRecord, EntityId, QueueRecord, TaskId, WorkerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for queue store operations.
pub type QueueStoreResult<T> = Result<T, QueueStoreError>;

/// Scope a guarded insert checks for occupancy.
///
/// A scope is occupied when any queue row matches it, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionScope {
    /// Rows whose owning entity matches.
    Entity(EntityId),
    /// Rows whose task type matches.
    TaskType(String),
}

/// Outcome of a guarded insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The scope was free and the record was inserted.
    Inserted,
    /// A queue row already occupies the scope; nothing was inserted.
    ScopeOccupied,
}

/// Queue persistence contract.
///
/// `insert_unless_matching`, `try_claim`, and `archive` must each execute
/// as one atomic operation against the backing store; concurrent callers
/// serialize on them rather than on any in-memory lock.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Stores a new queue record.
    ///
    /// # Errors
    ///
    /// Returns [`QueueStoreError::DuplicateTask`] when the task id already
    /// has a queue row.
    async fn insert(&self, record: &QueueRecord) -> QueueStoreResult<()>;

    /// Stores a new queue record unless the scope is already occupied.
    ///
    /// The occupancy check and the insert happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`QueueStoreError::DuplicateTask`] when the task id already
    /// has a queue row.
    async fn insert_unless_matching(
        &self,
        record: &QueueRecord,
        scope: &AdmissionScope,
    ) -> QueueStoreResult<InsertOutcome>;

    /// Finds a queue record by task id.
    ///
    /// Returns `None` when the task is unknown or already terminal.
    async fn find_by_id(&self, id: TaskId) -> QueueStoreResult<Option<QueueRecord>>;

    /// Finds the terminal activity record for a task id.
    async fn find_activity(&self, id: TaskId) -> QueueStoreResult<Option<ActivityRecord>>;

    /// Returns all pending records in ascending creation order.
    async fn list_pending(&self) -> QueueStoreResult<Vec<QueueRecord>>;

    /// Counts the in-progress records.
    async fn count_in_progress(&self) -> QueueStoreResult<u64>;

    /// Atomically claims a pending record for a worker.
    ///
    /// Transitions the row to in-progress and stamps the worker id.
    /// Returns the claimed record, or `None` when no pending row with the
    /// id exists; under concurrent claims of one row, at most one caller
    /// receives `Some`.
    async fn try_claim(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> QueueStoreResult<Option<QueueRecord>>;

    /// Moves a task from the queue into the activity history.
    ///
    /// Deletes the queue row and inserts the activity row in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`QueueStoreError::NotFound`] when the queue row is gone and
    /// [`QueueStoreError::DuplicateActivity`] when a terminal outcome was
    /// already recorded.
    async fn archive(&self, id: TaskId, activity: &ActivityRecord) -> QueueStoreResult<()>;

    /// Persists the cluster-wide worker pause request flag.
    async fn set_pause_requested(&self, requested: bool) -> QueueStoreResult<()>;

    /// Reads the cluster-wide worker pause request flag.
    async fn pause_requested(&self) -> QueueStoreResult<bool>;
}

/// Errors returned by queue store implementations.
#[derive(Debug, Clone, Error)]
pub enum QueueStoreError {
    /// A queue row with the same task id already exists.
    #[error("duplicate queue task: {0}")]
    DuplicateTask(TaskId),

    /// An activity row with the same task id already exists.
    #[error("duplicate activity record: {0}")]
    DuplicateActivity(TaskId),

    /// The queue row was not found.
    #[error("queue task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl QueueStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
