//! Task handle returned to submitters.

use super::{ComponentId, EntityId, SubmitterId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Display metadata for a component or entity, captured at submit time.
///
/// The identifier is always carried; `key` and `name` stay empty when the
/// referenced resource could not be looked up anymore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    id: Uuid,
    key: Option<String>,
    name: Option<String>,
}

impl ComponentSnapshot {
    /// Creates a snapshot carrying only the identifier.
    #[must_use]
    pub const fn unresolved(id: Uuid) -> Self {
        Self {
            id,
            key: None,
            name: None,
        }
    }

    /// Creates a snapshot with resolved display metadata.
    #[must_use]
    pub fn resolved(id: Uuid, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            key: Some(key.into()),
            name: Some(name.into()),
        }
    }

    /// Returns the resource identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the resource key, when resolved.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the resource display name, when resolved.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Submitting user metadata captured at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitterSnapshot {
    id: SubmitterId,
    login: Option<String>,
}

impl SubmitterSnapshot {
    /// Creates a snapshot carrying only the identifier.
    #[must_use]
    pub const fn unresolved(id: SubmitterId) -> Self {
        Self { id, login: None }
    }

    /// Creates a snapshot with the resolved login.
    #[must_use]
    pub fn resolved(id: SubmitterId, login: impl Into<String>) -> Self {
        Self {
            id,
            login: Some(login.into()),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> SubmitterId {
        self.id
    }

    /// Returns the user login, when resolved.
    #[must_use]
    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }
}

/// Handle for an admitted task, enriched with resolved display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    task_type: String,
    component: Option<ComponentSnapshot>,
    entity: Option<ComponentSnapshot>,
    submitter: Option<SubmitterSnapshot>,
    characteristics: BTreeMap<String, String>,
}

impl Task {
    /// Assembles a task handle from its resolved parts.
    #[must_use]
    pub fn new(
        id: TaskId,
        task_type: impl Into<String>,
        component: Option<ComponentSnapshot>,
        entity: Option<ComponentSnapshot>,
        submitter: Option<SubmitterSnapshot>,
        characteristics: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id,
            task_type: task_type.into(),
            component,
            entity,
            submitter,
            characteristics,
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

    /// Returns the component snapshot, if the submission carried one.
    #[must_use]
    pub const fn component(&self) -> Option<&ComponentSnapshot> {
        self.component.as_ref()
    }

    /// Returns the owning entity snapshot, if the submission carried a
    /// component.
    #[must_use]
    pub const fn entity(&self) -> Option<&ComponentSnapshot> {
        self.entity.as_ref()
    }

    /// Returns the submitter snapshot, if the submission named one.
    #[must_use]
    pub const fn submitter(&self) -> Option<&SubmitterSnapshot> {
        self.submitter.as_ref()
    }

    /// Returns the task metadata map.
    #[must_use]
    pub const fn characteristics(&self) -> &BTreeMap<String, String> {
        &self.characteristics
    }
}

/// Convenience conversions so snapshots can be built straight from ids.
impl From<ComponentId> for ComponentSnapshot {
    fn from(id: ComponentId) -> Self {
        Self::unresolved(id.into_inner())
    }
}

impl From<EntityId> for ComponentSnapshot {
    fn from(id: EntityId) -> Self {
        Self::unresolved(id.into_inner())
    }
}
