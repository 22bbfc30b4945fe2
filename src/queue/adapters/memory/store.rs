//! In-memory queue store for tests and embedded use.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::queue::{
    domain::{ActivityRecord, QueueRecord, TaskId, TaskStatus, WorkerId},
    ports::{AdmissionScope, InsertOutcome, QueueStore, QueueStoreError, QueueStoreResult},
};

/// Thread-safe in-memory queue store.
///
/// All port operations serialize on one lock, which gives the same
/// atomicity the transactional adapters provide.
#[derive(Debug)]
pub struct InMemoryQueueStore<C>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<QueueState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct QueueState {
    queue: HashMap<TaskId, QueueRecord>,
    activity: HashMap<TaskId, ActivityRecord>,
    pause_requested: bool,
}

impl InMemoryQueueStore<DefaultClock> {
    /// Creates an empty store stamping claims with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryQueueStore<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryQueueStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store stamping claims with the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(QueueState::default())),
            clock,
        }
    }

    fn read_state(&self) -> QueueStoreResult<std::sync::RwLockReadGuard<'_, QueueState>> {
        self.state.read().map_err(|err| {
            QueueStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> QueueStoreResult<std::sync::RwLockWriteGuard<'_, QueueState>> {
        self.state.write().map_err(|err| {
            QueueStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl<C> Clone for InMemoryQueueStore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

fn scope_occupied(state: &QueueState, scope: &AdmissionScope) -> bool {
    state.queue.values().any(|record| match scope {
        AdmissionScope::Entity(entity_id) => record
            .component()
            .is_some_and(|component| component.entity_id() == *entity_id),
        AdmissionScope::TaskType(task_type) => record.task_type() == task_type,
    })
}

fn insert_new(state: &mut QueueState, record: &QueueRecord) -> QueueStoreResult<()> {
    if state.queue.contains_key(&record.id()) {
        return Err(QueueStoreError::DuplicateTask(record.id()));
    }
    state.queue.insert(record.id(), record.clone());
    Ok(())
}

#[async_trait]
impl<C> QueueStore for InMemoryQueueStore<C>
where
    C: Clock + Send + Sync,
{
    async fn insert(&self, record: &QueueRecord) -> QueueStoreResult<()> {
        let mut state = self.write_state()?;
        insert_new(&mut state, record)
    }

    async fn insert_unless_matching(
        &self,
        record: &QueueRecord,
        scope: &AdmissionScope,
    ) -> QueueStoreResult<InsertOutcome> {
        let mut state = self.write_state()?;
        if scope_occupied(&state, scope) {
            return Ok(InsertOutcome::ScopeOccupied);
        }
        insert_new(&mut state, record)?;
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: TaskId) -> QueueStoreResult<Option<QueueRecord>> {
        let state = self.read_state()?;
        Ok(state.queue.get(&id).cloned())
    }

    async fn find_activity(&self, id: TaskId) -> QueueStoreResult<Option<ActivityRecord>> {
        let state = self.read_state()?;
        Ok(state.activity.get(&id).cloned())
    }

    async fn list_pending(&self) -> QueueStoreResult<Vec<QueueRecord>> {
        let state = self.read_state()?;
        let mut pending: Vec<QueueRecord> = state
            .queue
            .values()
            .filter(|record| record.status() == TaskStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|record| (record.created_at(), record.id()));
        Ok(pending)
    }

    async fn count_in_progress(&self) -> QueueStoreResult<u64> {
        let state = self.read_state()?;
        let count = state
            .queue
            .values()
            .filter(|record| record.status() == TaskStatus::InProgress)
            .count();
        u64::try_from(count).map_err(QueueStoreError::persistence)
    }

    async fn try_claim(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> QueueStoreResult<Option<QueueRecord>> {
        let mut state = self.write_state()?;
        let claimed = state
            .queue
            .get(&id)
            .and_then(|record| record.claimed(worker_id, &*self.clock));
        match claimed {
            Some(record) => {
                state.queue.insert(id, record.clone());
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn archive(&self, id: TaskId, activity: &ActivityRecord) -> QueueStoreResult<()> {
        let mut state = self.write_state()?;
        if state.activity.contains_key(&id) {
            return Err(QueueStoreError::DuplicateActivity(id));
        }
        if !state.queue.contains_key(&id) {
            return Err(QueueStoreError::NotFound(id));
        }
        state.queue.remove(&id);
        state.activity.insert(id, activity.clone());
        Ok(())
    }

    async fn set_pause_requested(&self, requested: bool) -> QueueStoreResult<()> {
        let mut state = self.write_state()?;
        state.pause_requested = requested;
        Ok(())
    }

    async fn pause_requested(&self) -> QueueStoreResult<bool> {
        let state = self.read_state()?;
        Ok(state.pause_requested)
    }
}
