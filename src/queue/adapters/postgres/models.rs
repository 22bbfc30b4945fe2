//! Diesel row models for queue persistence.

use super::schema::{coordination_properties, task_activity, task_queue};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for queue records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_queue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QueueTaskRow {
    /// Task identifier.
    pub uuid: uuid::Uuid,
    /// Kind of background work.
    pub task_type: String,
    /// Optional sub-resource the task concerns.
    pub component_uuid: Option<uuid::Uuid>,
    /// Optional owning entity of the component.
    pub entity_uuid: Option<uuid::Uuid>,
    /// Optional submitting user.
    pub submitter_uuid: Option<uuid::Uuid>,
    /// Worker that claimed the task, once claimed.
    pub worker_uuid: Option<uuid::Uuid>,
    /// Queue status.
    pub status: String,
    /// Arbitrary task metadata.
    pub characteristics: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for queue records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_queue)]
pub struct NewQueueTaskRow {
    /// Task identifier.
    pub uuid: uuid::Uuid,
    /// Kind of background work.
    pub task_type: String,
    /// Optional sub-resource the task concerns.
    pub component_uuid: Option<uuid::Uuid>,
    /// Optional owning entity of the component.
    pub entity_uuid: Option<uuid::Uuid>,
    /// Optional submitting user.
    pub submitter_uuid: Option<uuid::Uuid>,
    /// Worker that claimed the task, once claimed.
    pub worker_uuid: Option<uuid::Uuid>,
    /// Queue status.
    pub status: String,
    /// Arbitrary task metadata.
    pub characteristics: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for activity records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_activity)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityTaskRow {
    /// Task identifier.
    pub uuid: uuid::Uuid,
    /// Kind of background work.
    pub task_type: String,
    /// Terminal status.
    pub status: String,
    /// Failure classification, set for failed tasks only.
    pub error_type: Option<String>,
    /// Failure description, set for failed tasks only.
    pub error_message: Option<String>,
    /// Terminal transition timestamp.
    pub executed_at: DateTime<Utc>,
    /// Worker that executed the task, if it was claimed.
    pub worker_uuid: Option<uuid::Uuid>,
    /// Cluster node name at transition time.
    pub node_name: Option<String>,
}

/// Insert model for activity records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_activity)]
pub struct NewActivityTaskRow {
    /// Task identifier.
    pub uuid: uuid::Uuid,
    /// Kind of background work.
    pub task_type: String,
    /// Terminal status.
    pub status: String,
    /// Failure classification, set for failed tasks only.
    pub error_type: Option<String>,
    /// Failure description, set for failed tasks only.
    pub error_message: Option<String>,
    /// Terminal transition timestamp.
    pub executed_at: DateTime<Utc>,
    /// Worker that executed the task, if it was claimed.
    pub worker_uuid: Option<uuid::Uuid>,
    /// Cluster node name at transition time.
    pub node_name: Option<String>,
}

/// Upsert model for coordination flags.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coordination_properties)]
pub struct NewCoordinationProperty {
    /// Flag key.
    pub property_key: String,
    /// Flag value.
    pub property_value: String,
}
