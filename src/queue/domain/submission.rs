//! Task submission values and admission policies.

use super::{ComponentId, EntityId, QueueDomainError, SubmitterId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Component reference carried by a submission.
///
/// Pairs the specific sub-resource the task concerns with the top-level
/// entity that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComponent {
    component_id: ComponentId,
    entity_id: EntityId,
}

impl TaskComponent {
    /// Creates a component reference.
    #[must_use]
    pub const fn new(component_id: ComponentId, entity_id: EntityId) -> Self {
        Self {
            component_id,
            entity_id,
        }
    }

    /// Returns the component identifier.
    #[must_use]
    pub const fn component_id(&self) -> ComponentId {
        self.component_id
    }

    /// Returns the owning entity identifier.
    #[must_use]
    pub const fn entity_id(&self) -> EntityId {
        self.entity_id
    }
}

/// Uniqueness constraint applied when admitting a submission.
///
/// Scopes are evaluated against every queue record regardless of status;
/// rejection is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniquenessPolicy {
    /// No uniqueness check; the submission is always admitted.
    #[default]
    None,
    /// At most one queued task per owning entity. Submissions without a
    /// component are exempt and never collide.
    PerEntity,
    /// At most one queued task per task type.
    PerTaskType,
}

/// Immutable request to enqueue one unit of background work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSubmission {
    id: Option<TaskId>,
    task_type: String,
    component: Option<TaskComponent>,
    submitter_id: Option<SubmitterId>,
    characteristics: BTreeMap<String, String>,
}

impl TaskSubmission {
    /// Creates a submission for the given task type.
    ///
    /// # Errors
    ///
    /// Returns [`QueueDomainError::EmptyTaskType`] when the type is empty
    /// after trimming.
    pub fn new(task_type: impl Into<String>) -> Result<Self, QueueDomainError> {
        let raw = task_type.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(QueueDomainError::EmptyTaskType);
        }
        Ok(Self {
            id: None,
            task_type: normalized.to_owned(),
            component: None,
            submitter_id: None,
            characteristics: BTreeMap::new(),
        })
    }

    /// Pins the task identifier instead of letting admission generate one.
    #[must_use]
    pub const fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the component reference.
    #[must_use]
    pub const fn with_component(mut self, component: TaskComponent) -> Self {
        self.component = Some(component);
        self
    }

    /// Sets the submitting user.
    #[must_use]
    pub const fn with_submitter(mut self, submitter_id: SubmitterId) -> Self {
        self.submitter_id = Some(submitter_id);
        self
    }

    /// Sets arbitrary task metadata.
    #[must_use]
    pub fn with_characteristics(
        mut self,
        characteristics: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.characteristics = characteristics.into_iter().collect();
        self
    }

    /// Returns the pinned task identifier, if any.
    #[must_use]
    pub const fn id(&self) -> Option<TaskId> {
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

    /// Returns the task metadata map.
    #[must_use]
    pub const fn characteristics(&self) -> &BTreeMap<String, String> {
        &self.characteristics
    }

    /// Consumes the submission, returning the task metadata map.
    #[must_use]
    pub fn into_characteristics(self) -> BTreeMap<String, String> {
        self.characteristics
    }
}
