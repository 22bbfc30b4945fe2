//! Persisted queue and activity records with their status state machines.

use super::{
    ParseActivityStatusError, ParseTaskStatusError, QueueDomainError, SubmitterId, TaskComponent,
    TaskId, TaskSubmission, WorkerId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status of a task still present in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is waiting to be claimed by a worker.
    Pending,
    /// Task has been claimed and is executing.
    InProgress,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Terminal outcome recorded in the activity history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    /// Task executed to completion.
    Success,
    /// Task execution was reported as failed.
    Failed,
    /// Task was canceled before being claimed.
    Canceled,
}

impl ActivityStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl TryFrom<&str> for ActivityStatus {
    type Error = ParseActivityStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            "CANCELED" => Ok(Self::Canceled),
            _ => Err(ParseActivityStatusError(value.to_owned())),
        }
    }
}

/// Error details reported by a worker for a failed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    error_type: String,
    error_message: String,
}

impl TaskFailure {
    /// Creates failure details.
    #[must_use]
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
        }
    }

    /// Returns the machine-readable error classification.
    #[must_use]
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Returns the human-readable error description.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

/// Queue row for a task that has not yet reached a terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRecord {
    id: TaskId,
    task_type: String,
    component: Option<TaskComponent>,
    submitter_id: Option<SubmitterId>,
    worker_id: Option<WorkerId>,
    status: TaskStatus,
    characteristics: BTreeMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted queue record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedQueueData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task type.
    pub task_type: String,
    /// Persisted component reference, if any.
    pub component: Option<TaskComponent>,
    /// Persisted submitting user, if any.
    pub submitter_id: Option<SubmitterId>,
    /// Persisted claiming worker, if any.
    pub worker_id: Option<WorkerId>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted task metadata.
    pub characteristics: BTreeMap<String, String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl QueueRecord {
    /// Creates the pending record for an admitted submission.
    #[must_use]
    pub fn admitted(id: TaskId, submission: TaskSubmission, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            task_type: submission.task_type().to_owned(),
            component: submission.component().copied(),
            submitter_id: submission.submitter_id(),
            worker_id: None,
            status: TaskStatus::Pending,
            characteristics: submission.into_characteristics(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedQueueData) -> Self {
        Self {
            id: data.id,
            task_type: data.task_type,
            component: data.component,
            submitter_id: data.submitter_id,
            worker_id: data.worker_id,
            status: data.status,
            characteristics: data.characteristics,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task type.
    #[must_use]
    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// Returns the component reference, if any.
    #[must_use]
    pub const fn component(&self) -> Option<&TaskComponent> {
        self.component.as_ref()
    }

    /// Returns the submitting user, if any.
    #[must_use]
    pub const fn submitter_id(&self) -> Option<SubmitterId> {
        self.submitter_id
    }

    /// Returns the claiming worker, if any.
    #[must_use]
    pub const fn worker_id(&self) -> Option<WorkerId> {
        self.worker_id
    }

    /// Returns the queue status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the task metadata map.
    #[must_use]
    pub const fn characteristics(&self) -> &BTreeMap<String, String> {
        &self.characteristics
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the in-progress copy of a pending record, claimed by the
    /// given worker.
    ///
    /// Returns `None` when the record is not pending, so a store can use
    /// this as the compare half of its claim compare-and-swap.
    #[must_use]
    pub fn claimed(&self, worker_id: WorkerId, clock: &impl Clock) -> Option<Self> {
        if self.status != TaskStatus::Pending {
            return None;
        }
        let mut claimed = self.clone();
        claimed.status = TaskStatus::InProgress;
        claimed.worker_id = Some(worker_id);
        claimed.updated_at = clock.utc();
        Some(claimed)
    }
}

/// Append-only history row for a task that reached a terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    id: TaskId,
    task_type: String,
    status: ActivityStatus,
    failure: Option<TaskFailure>,
    executed_at: DateTime<Utc>,
    worker_id: Option<WorkerId>,
    node_name: Option<String>,
}

/// Parameter object for reconstructing a persisted activity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActivityData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task type.
    pub task_type: String,
    /// Persisted terminal status.
    pub status: ActivityStatus,
    /// Persisted failure details, if any.
    pub failure: Option<TaskFailure>,
    /// Persisted terminal transition timestamp.
    pub executed_at: DateTime<Utc>,
    /// Persisted executing worker, if any.
    pub worker_id: Option<WorkerId>,
    /// Persisted cluster node name, if any.
    pub node_name: Option<String>,
}

impl ActivityRecord {
    /// Records cancellation of a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`QueueDomainError::CancelInProgress`] when the record has
    /// already been claimed.
    pub fn canceled(
        record: &QueueRecord,
        clock: &impl Clock,
        node_name: Option<String>,
    ) -> Result<Self, QueueDomainError> {
        if record.status() != TaskStatus::Pending {
            return Err(QueueDomainError::CancelInProgress(record.id()));
        }
        Ok(Self::terminal(record, ActivityStatus::Canceled, None, clock, node_name))
    }

    /// Records failure of an in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`QueueDomainError::FailNotInProgress`] when the record was
    /// never claimed.
    pub fn failed(
        record: &QueueRecord,
        failure: TaskFailure,
        clock: &impl Clock,
        node_name: Option<String>,
    ) -> Result<Self, QueueDomainError> {
        if record.status() != TaskStatus::InProgress {
            return Err(QueueDomainError::FailNotInProgress(record.id()));
        }
        Ok(Self::terminal(record, ActivityStatus::Failed, Some(failure), clock, node_name))
    }

    /// Records successful completion of an in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`QueueDomainError::CompleteNotInProgress`] when the record
    /// was never claimed.
    pub fn succeeded(
        record: &QueueRecord,
        clock: &impl Clock,
        node_name: Option<String>,
    ) -> Result<Self, QueueDomainError> {
        if record.status() != TaskStatus::InProgress {
            return Err(QueueDomainError::CompleteNotInProgress(record.id()));
        }
        Ok(Self::terminal(record, ActivityStatus::Success, None, clock, node_name))
    }

    fn terminal(
        record: &QueueRecord,
        status: ActivityStatus,
        failure: Option<TaskFailure>,
        clock: &impl Clock,
        node_name: Option<String>,
    ) -> Self {
        Self {
            id: record.id(),
            task_type: record.task_type().to_owned(),
            status,
            failure,
            executed_at: clock.utc(),
            worker_id: record.worker_id(),
            node_name,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            task_type: data.task_type,
            status: data.status,
            failure: data.failure,
            executed_at: data.executed_at,
            worker_id: data.worker_id,
            node_name: data.node_name,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task type.
    #[must_use]
    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// Returns the terminal status.
    #[must_use]
    pub const fn status(&self) -> ActivityStatus {
        self.status
    }

    /// Returns the failure details, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&TaskFailure> {
        self.failure.as_ref()
    }

    /// Returns the terminal transition timestamp.
    #[must_use]
    pub const fn executed_at(&self) -> DateTime<Utc> {
        self.executed_at
    }

    /// Returns the executing worker, if any.
    #[must_use]
    pub const fn worker_id(&self) -> Option<WorkerId> {
        self.worker_id
    }

    /// Returns the cluster node name at transition time, if known.
    #[must_use]
    pub fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref()
    }
}
