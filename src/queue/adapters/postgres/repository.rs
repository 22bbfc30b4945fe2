//! `PostgreSQL` queue store implementation.

use super::{
    models::{ActivityTaskRow, NewActivityTaskRow, NewCoordinationProperty, NewQueueTaskRow, QueueTaskRow},
    schema::{coordination_properties, task_activity, task_queue},
};
use crate::queue::{
    domain::{
        ActivityRecord, ActivityStatus, ComponentId, EntityId, PersistedActivityData,
        PersistedQueueData, QueueRecord, SubmitterId, TaskComponent, TaskFailure, TaskId,
        TaskStatus, WorkerId,
    },
    ports::{AdmissionScope, InsertOutcome, QueueStore, QueueStoreError, QueueStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mockable::{Clock, DefaultClock};
use std::collections::BTreeMap;

/// `PostgreSQL` connection pool type used by queue adapters.
pub type QueuePgPool = Pool<ConnectionManager<PgConnection>>;

/// Coordination flag key for the cluster-wide worker pause request.
const WORKERS_PAUSE_FLAG: &str = "workers.pause";

/// `PostgreSQL`-backed queue store.
#[derive(Debug, Clone)]
pub struct PostgresQueueStore {
    pool: QueuePgPool,
}

enum ArchiveStep {
    Archived,
    MissingQueueRow,
    AlreadyRecorded,
}

impl PostgresQueueStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: QueuePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> QueueStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> QueueStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(QueueStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(QueueStoreError::persistence)?
    }
}

#[async_trait]
impl QueueStore for PostgresQueueStore {
    async fn insert(&self, record: &QueueRecord) -> QueueStoreResult<()> {
        let task_id = record.id();
        let new_row = to_new_row(record)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(task_queue::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_queue_insert_error(err, task_id))?;
            Ok(())
        })
        .await
    }

    async fn insert_unless_matching(
        &self,
        record: &QueueRecord,
        scope: &AdmissionScope,
    ) -> QueueStoreResult<InsertOutcome> {
        let task_id = record.id();
        let new_row = to_new_row(record)?;
        let guard_scope = scope.clone();

        self.run_blocking(move |connection| {
            connection
                .transaction::<InsertOutcome, DieselError, _>(|transaction| {
                    let occupied = scope_row_count(transaction, &guard_scope)?;
                    if occupied > 0 {
                        return Ok(InsertOutcome::ScopeOccupied);
                    }
                    diesel::insert_into(task_queue::table)
                        .values(&new_row)
                        .execute(transaction)?;
                    Ok(InsertOutcome::Inserted)
                })
                .map_err(|err| map_queue_insert_error(err, task_id))
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> QueueStoreResult<Option<QueueRecord>> {
        let task_uuid = id.into_inner();
        self.run_blocking(move |connection| {
            let row = task_queue::table
                .filter(task_queue::uuid.eq(task_uuid))
                .select(QueueTaskRow::as_select())
                .first::<QueueTaskRow>(connection)
                .optional()
                .map_err(QueueStoreError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn find_activity(&self, id: TaskId) -> QueueStoreResult<Option<ActivityRecord>> {
        let task_uuid = id.into_inner();
        self.run_blocking(move |connection| {
            let row = task_activity::table
                .filter(task_activity::uuid.eq(task_uuid))
                .select(ActivityTaskRow::as_select())
                .first::<ActivityTaskRow>(connection)
                .optional()
                .map_err(QueueStoreError::persistence)?;
            row.map(row_to_activity).transpose()
        })
        .await
    }

    async fn list_pending(&self) -> QueueStoreResult<Vec<QueueRecord>> {
        self.run_blocking(move |connection| {
            let rows = task_queue::table
                .filter(task_queue::status.eq(TaskStatus::Pending.as_str()))
                .order(task_queue::created_at.asc())
                .then_order_by(task_queue::uuid.asc())
                .select(QueueTaskRow::as_select())
                .load::<QueueTaskRow>(connection)
                .map_err(QueueStoreError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn count_in_progress(&self) -> QueueStoreResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = task_queue::table
                .filter(task_queue::status.eq(TaskStatus::InProgress.as_str()))
                .count()
                .get_result(connection)
                .map_err(QueueStoreError::persistence)?;
            u64::try_from(count).map_err(QueueStoreError::persistence)
        })
        .await
    }

    async fn try_claim(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> QueueStoreResult<Option<QueueRecord>> {
        let task_uuid = id.into_inner();
        let worker_uuid = worker_id.into_inner();
        let claimed_at = DefaultClock.utc();

        self.run_blocking(move |connection| {
            // The status guard makes the update the compare-and-swap: a row
            // already claimed or canceled matches zero rows.
            let updated = diesel::update(
                task_queue::table
                    .filter(task_queue::uuid.eq(task_uuid))
                    .filter(task_queue::status.eq(TaskStatus::Pending.as_str())),
            )
            .set((
                task_queue::status.eq(TaskStatus::InProgress.as_str()),
                task_queue::worker_uuid.eq(worker_uuid),
                task_queue::updated_at.eq(claimed_at),
            ))
            .execute(connection)
            .map_err(QueueStoreError::persistence)?;

            if updated == 0 {
                return Ok(None);
            }
            let row = task_queue::table
                .filter(task_queue::uuid.eq(task_uuid))
                .select(QueueTaskRow::as_select())
                .first::<QueueTaskRow>(connection)
                .optional()
                .map_err(QueueStoreError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn archive(&self, id: TaskId, activity: &ActivityRecord) -> QueueStoreResult<()> {
        let task_id = id;
        let task_uuid = id.into_inner();
        let new_row = to_new_activity_row(activity);

        self.run_blocking(move |connection| {
            let step = connection
                .transaction::<ArchiveStep, DieselError, _>(|transaction| {
                    let recorded: i64 = task_activity::table
                        .filter(task_activity::uuid.eq(task_uuid))
                        .count()
                        .get_result(transaction)?;
                    if recorded > 0 {
                        return Ok(ArchiveStep::AlreadyRecorded);
                    }
                    let deleted = diesel::delete(
                        task_queue::table.filter(task_queue::uuid.eq(task_uuid)),
                    )
                    .execute(transaction)?;
                    if deleted == 0 {
                        return Ok(ArchiveStep::MissingQueueRow);
                    }
                    diesel::insert_into(task_activity::table)
                        .values(&new_row)
                        .execute(transaction)?;
                    Ok(ArchiveStep::Archived)
                })
                .map_err(|err| map_activity_insert_error(err, task_id))?;

            match step {
                ArchiveStep::Archived => Ok(()),
                ArchiveStep::MissingQueueRow => Err(QueueStoreError::NotFound(task_id)),
                ArchiveStep::AlreadyRecorded => Err(QueueStoreError::DuplicateActivity(task_id)),
            }
        })
        .await
    }

    async fn set_pause_requested(&self, requested: bool) -> QueueStoreResult<()> {
        self.run_blocking(move |connection| {
            if requested {
                let property = NewCoordinationProperty {
                    property_key: WORKERS_PAUSE_FLAG.to_owned(),
                    property_value: "true".to_owned(),
                };
                diesel::insert_into(coordination_properties::table)
                    .values(&property)
                    .on_conflict(coordination_properties::property_key)
                    .do_update()
                    .set(coordination_properties::property_value.eq("true"))
                    .execute(connection)
                    .map_err(QueueStoreError::persistence)?;
            } else {
                diesel::delete(
                    coordination_properties::table
                        .filter(coordination_properties::property_key.eq(WORKERS_PAUSE_FLAG)),
                )
                .execute(connection)
                .map_err(QueueStoreError::persistence)?;
            }
            Ok(())
        })
        .await
    }

    async fn pause_requested(&self) -> QueueStoreResult<bool> {
        self.run_blocking(move |connection| {
            let value = coordination_properties::table
                .filter(coordination_properties::property_key.eq(WORKERS_PAUSE_FLAG))
                .select(coordination_properties::property_value)
                .first::<String>(connection)
                .optional()
                .map_err(QueueStoreError::persistence)?;
            Ok(value.is_some_and(|flag| flag == "true"))
        })
        .await
    }
}

fn scope_row_count(
    connection: &mut PgConnection,
    scope: &AdmissionScope,
) -> Result<i64, DieselError> {
    let mut query = task_queue::table.into_boxed();
    query = match scope {
        AdmissionScope::Entity(entity_id) => {
            query.filter(task_queue::entity_uuid.eq(entity_id.into_inner()))
        }
        AdmissionScope::TaskType(task_type) => {
            query.filter(task_queue::task_type.eq(task_type.clone()))
        }
    };
    query.count().get_result(connection)
}

fn map_queue_insert_error(err: DieselError, task_id: TaskId) -> QueueStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            QueueStoreError::DuplicateTask(task_id)
        }
        other => QueueStoreError::persistence(other),
    }
}

fn map_activity_insert_error(err: DieselError, task_id: TaskId) -> QueueStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            QueueStoreError::DuplicateActivity(task_id)
        }
        other => QueueStoreError::persistence(other),
    }
}

fn to_new_row(record: &QueueRecord) -> QueueStoreResult<NewQueueTaskRow> {
    let characteristics =
        serde_json::to_value(record.characteristics()).map_err(QueueStoreError::persistence)?;

    Ok(NewQueueTaskRow {
        uuid: record.id().into_inner(),
        task_type: record.task_type().to_owned(),
        component_uuid: record
            .component()
            .map(|component| component.component_id().into_inner()),
        entity_uuid: record
            .component()
            .map(|component| component.entity_id().into_inner()),
        submitter_uuid: record.submitter_id().map(SubmitterId::into_inner),
        worker_uuid: record.worker_id().map(WorkerId::into_inner),
        status: record.status().as_str().to_owned(),
        characteristics,
        created_at: record.created_at(),
        updated_at: record.updated_at(),
    })
}

fn row_to_record(row: QueueTaskRow) -> QueueStoreResult<QueueRecord> {
    let QueueTaskRow {
        uuid,
        task_type,
        component_uuid,
        entity_uuid,
        submitter_uuid,
        worker_uuid,
        status: persisted_status,
        characteristics: persisted_characteristics,
        created_at,
        updated_at,
    } = row;

    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(QueueStoreError::persistence)?;
    let characteristics =
        serde_json::from_value::<BTreeMap<String, String>>(persisted_characteristics)
            .map_err(QueueStoreError::persistence)?;
    let component = match (component_uuid, entity_uuid) {
        (Some(component), Some(entity)) => Some(TaskComponent::new(
            ComponentId::from_uuid(component),
            EntityId::from_uuid(entity),
        )),
        _ => None,
    };

    let data = PersistedQueueData {
        id: TaskId::from_uuid(uuid),
        task_type,
        component,
        submitter_id: submitter_uuid.map(SubmitterId::from_uuid),
        worker_id: worker_uuid.map(WorkerId::from_uuid),
        status,
        characteristics,
        created_at,
        updated_at,
    };
    Ok(QueueRecord::from_persisted(data))
}

fn to_new_activity_row(activity: &ActivityRecord) -> NewActivityTaskRow {
    NewActivityTaskRow {
        uuid: activity.id().into_inner(),
        task_type: activity.task_type().to_owned(),
        status: activity.status().as_str().to_owned(),
        error_type: activity
            .failure()
            .map(|failure| failure.error_type().to_owned()),
        error_message: activity
            .failure()
            .map(|failure| failure.error_message().to_owned()),
        executed_at: activity.executed_at(),
        worker_uuid: activity.worker_id().map(WorkerId::into_inner),
        node_name: activity.node_name().map(str::to_owned),
    }
}

fn row_to_activity(row: ActivityTaskRow) -> QueueStoreResult<ActivityRecord> {
    let ActivityTaskRow {
        uuid,
        task_type,
        status: persisted_status,
        error_type,
        error_message,
        executed_at,
        worker_uuid,
        node_name,
    } = row;

    let status = ActivityStatus::try_from(persisted_status.as_str())
        .map_err(QueueStoreError::persistence)?;
    let failure = error_type
        .map(|kind| TaskFailure::new(kind, error_message.unwrap_or_default()));

    let data = PersistedActivityData {
        id: TaskId::from_uuid(uuid),
        task_type,
        status,
        failure,
        executed_at,
        worker_id: worker_uuid.map(WorkerId::from_uuid),
        node_name,
    };
    Ok(ActivityRecord::from_persisted(data))
}
