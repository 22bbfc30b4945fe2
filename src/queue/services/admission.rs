//! Admission control and task state transitions.

use crate::queue::{
    domain::{
        ActivityRecord, ComponentId, ComponentSnapshot, EntityId, QueueDomainError, QueueRecord,
        SubmitterId, SubmitterSnapshot, Task, TaskFailure, TaskId, TaskSubmission,
        UniquenessPolicy, WorkerId,
    },
    ports::{
        AdmissionScope, ContextResolver, ContextResolverError, InsertOutcome, NodeInformation,
        QueueStore, QueueStoreError, TaskIdSource,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for admission and transition operations.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Domain validation or state transition failed.
    #[error(transparent)]
    Domain(#[from] QueueDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] QueueStoreError),
    /// Display metadata lookup failed.
    #[error(transparent)]
    Resolver(#[from] ContextResolverError),
    /// A claimed task references a component that no longer exists.
    #[error("component {0} has been deleted by end-user during analysis")]
    ComponentVanished(ComponentId),
}

/// Result type for admission service operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// Queue admission controller.
///
/// Validates and enqueues submissions, enforces uniqueness policies, and
/// drives the pending → in-progress → terminal state transitions. All
/// concurrency-sensitive steps delegate to atomic store operations, so the
/// service holds no mutable state of its own.
#[derive(Clone)]
pub struct TaskAdmissionService<S, R, I, N, C>
where
    S: QueueStore,
    R: ContextResolver,
    I: TaskIdSource,
    N: NodeInformation,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    resolver: Arc<R>,
    ids: Arc<I>,
    node: Arc<N>,
    clock: Arc<C>,
}

impl<S, R, I, N, C> TaskAdmissionService<S, R, I, N, C>
where
    S: QueueStore,
    R: ContextResolver,
    I: TaskIdSource,
    N: NodeInformation,
    C: Clock + Send + Sync,
{
    /// Creates a new admission service.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        resolver: Arc<R>,
        ids: Arc<I>,
        node: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            resolver,
            ids,
            node,
            clock,
        }
    }

    /// Admits a submission unconditionally and returns its task handle.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Store`] when the insert fails and
    /// [`AdmissionError::Resolver`] when metadata lookup fails.
    pub async fn submit(&self, submission: TaskSubmission) -> AdmissionResult<Task> {
        let record = self.enqueue_record(submission);
        self.store.insert(&record).await?;
        debug!(task_id = %record.id(), task_type = record.task_type(), "task admitted");
        self.resolve_task(&record).await
    }

    /// Admits a submission subject to a uniqueness policy.
    ///
    /// Returns `Ok(None)` when the policy's scope is already occupied by a
    /// queued task; nothing is inserted in that case. The occupancy check
    /// and the insert execute as one atomic store operation.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Store`] when the insert fails and
    /// [`AdmissionError::Resolver`] when metadata lookup fails.
    pub async fn submit_with_policy(
        &self,
        submission: TaskSubmission,
        policy: UniquenessPolicy,
    ) -> AdmissionResult<Option<Task>> {
        let record = self.enqueue_record(submission);
        let outcome = match admission_scope(policy, &record) {
            None => {
                self.store.insert(&record).await?;
                InsertOutcome::Inserted
            }
            Some(scope) => self.store.insert_unless_matching(&record, &scope).await?,
        };

        match outcome {
            InsertOutcome::Inserted => {
                debug!(task_id = %record.id(), task_type = record.task_type(), "task admitted");
                Ok(Some(self.resolve_task(&record).await?))
            }
            InsertOutcome::ScopeOccupied => {
                debug!(
                    task_id = %record.id(),
                    task_type = record.task_type(),
                    "submission rejected, uniqueness scope occupied"
                );
                Ok(None)
            }
        }
    }

    /// Admits an ordered batch of submissions under one uniqueness policy.
    ///
    /// Submissions are processed in input order and each admission decision
    /// observes the rows inserted earlier in the same batch. Returns the
    /// admitted task handles in the relative order of their submissions;
    /// rejected submissions are omitted.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while admitting a submission;
    /// earlier admissions of the batch remain in the queue.
    pub async fn mass_submit(
        &self,
        submissions: Vec<TaskSubmission>,
        policy: UniquenessPolicy,
    ) -> AdmissionResult<Vec<Task>> {
        let mut admitted = Vec::with_capacity(submissions.len());
        for submission in submissions {
            if let Some(task) = self.submit_with_policy(submission, policy).await? {
                admitted.push(task);
            }
        }
        Ok(admitted)
    }

    /// Cancels a pending task, recording a canceled activity row.
    ///
    /// # Errors
    ///
    /// Returns [`QueueDomainError::CancelInProgress`] when the record has
    /// already been claimed; no mutation occurs in that case.
    pub async fn cancel(&self, record: &QueueRecord) -> AdmissionResult<()> {
        let activity = ActivityRecord::canceled(record, &*self.clock, self.node.node_name())?;
        self.store.archive(record.id(), &activity).await?;
        info!(task_id = %record.id(), "task canceled");
        Ok(())
    }

    /// Cancels every task pending at call time.
    ///
    /// In-progress tasks are left untouched. Returns the number of tasks
    /// canceled.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Store`] when listing or archiving fails;
    /// tasks canceled before the failure stay canceled.
    pub async fn cancel_all(&self) -> AdmissionResult<usize> {
        let pending = self.store.list_pending().await?;
        let mut canceled = 0_usize;
        for record in &pending {
            let activity = ActivityRecord::canceled(record, &*self.clock, self.node.node_name())?;
            self.store.archive(record.id(), &activity).await?;
            canceled += 1;
        }
        info!(count = canceled, "canceled all pending tasks");
        Ok(canceled)
    }

    /// Records failure of an in-progress task reported by its worker.
    ///
    /// # Errors
    ///
    /// Returns [`QueueDomainError::FailNotInProgress`] when the record was
    /// never claimed; no mutation occurs in that case.
    pub async fn fail(&self, record: &QueueRecord, failure: TaskFailure) -> AdmissionResult<()> {
        let activity =
            ActivityRecord::failed(record, failure, &*self.clock, self.node.node_name())?;
        self.store.archive(record.id(), &activity).await?;
        info!(task_id = %record.id(), "task failed");
        Ok(())
    }

    /// Records successful completion of an in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`QueueDomainError::CompleteNotInProgress`] when the record
    /// was never claimed; no mutation occurs in that case.
    pub async fn complete(&self, record: &QueueRecord) -> AdmissionResult<()> {
        let activity = ActivityRecord::succeeded(record, &*self.clock, self.node.node_name())?;
        self.store.archive(record.id(), &activity).await?;
        info!(task_id = %record.id(), "task completed");
        Ok(())
    }

    /// Atomically claims a pending task for a worker.
    ///
    /// Returns the in-progress record, or `None` when no pending row with
    /// the id exists (already claimed, canceled, or unknown). Safe under
    /// concurrent invocation: at most one caller receives `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Store`] when the store operation fails.
    pub async fn claim(
        &self,
        id: TaskId,
        worker_id: WorkerId,
    ) -> AdmissionResult<Option<QueueRecord>> {
        let claimed = self.store.try_claim(id, worker_id).await?;
        if let Some(record) = &claimed {
            debug!(task_id = %record.id(), worker_id = %worker_id, "task claimed");
        }
        Ok(claimed)
    }

    /// Builds the execution-facing task handle for a claimed record.
    ///
    /// Unlike submit-time resolution, a component reference that no longer
    /// resolves is a hard failure here: the component was deleted while the
    /// task was in flight.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::ComponentVanished`] when the record's
    /// component cannot be resolved anymore.
    pub async fn claimed_task(&self, record: &QueueRecord) -> AdmissionResult<Task> {
        if let Some(component) = record.component() {
            let component_id = component.component_id();
            if self.resolver.component(component_id).await?.is_none() {
                return Err(AdmissionError::ComponentVanished(component_id));
            }
        }
        self.resolve_task(record).await
    }

    /// Finds a queue record by task id.
    ///
    /// Returns `Ok(None)` when the task is unknown or already terminal.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Store`] when the lookup fails.
    pub async fn find_queued(&self, id: TaskId) -> AdmissionResult<Option<QueueRecord>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Finds the terminal activity record for a task id.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Store`] when the lookup fails.
    pub async fn find_activity(&self, id: TaskId) -> AdmissionResult<Option<ActivityRecord>> {
        Ok(self.store.find_activity(id).await?)
    }

    fn enqueue_record(&self, submission: TaskSubmission) -> QueueRecord {
        let id = submission.id().unwrap_or_else(|| self.ids.generate());
        QueueRecord::admitted(id, submission, &*self.clock)
    }

    async fn resolve_task(&self, record: &QueueRecord) -> AdmissionResult<Task> {
        let component = match record.component() {
            Some(reference) => Some(self.component_snapshot(reference.component_id()).await?),
            None => None,
        };
        let entity = match record.component() {
            Some(reference) => Some(self.entity_snapshot(reference.entity_id()).await?),
            None => None,
        };
        let submitter = match record.submitter_id() {
            Some(id) => Some(self.submitter_snapshot(id).await?),
            None => None,
        };

        Ok(Task::new(
            record.id(),
            record.task_type(),
            component,
            entity,
            submitter,
            record.characteristics().clone(),
        ))
    }

    async fn component_snapshot(&self, id: ComponentId) -> AdmissionResult<ComponentSnapshot> {
        let details = self.resolver.component(id).await?;
        Ok(details.map_or_else(
            || ComponentSnapshot::from(id),
            |found| ComponentSnapshot::resolved(id.into_inner(), found.key, found.name),
        ))
    }

    async fn entity_snapshot(&self, id: EntityId) -> AdmissionResult<ComponentSnapshot> {
        let details = self.resolver.entity(id).await?;
        Ok(details.map_or_else(
            || ComponentSnapshot::from(id),
            |found| ComponentSnapshot::resolved(id.into_inner(), found.key, found.name),
        ))
    }

    async fn submitter_snapshot(&self, id: SubmitterId) -> AdmissionResult<SubmitterSnapshot> {
        let details = self.resolver.submitter(id).await?;
        Ok(details.map_or_else(
            || SubmitterSnapshot::unresolved(id),
            |found| SubmitterSnapshot::resolved(id, found.login),
        ))
    }
}

/// Maps a uniqueness policy onto the store scope it guards.
///
/// Submissions without a component are exempt from the entity scope and
/// admit unconditionally.
fn admission_scope(policy: UniquenessPolicy, record: &QueueRecord) -> Option<AdmissionScope> {
    match policy {
        UniquenessPolicy::None => None,
        UniquenessPolicy::PerEntity => record
            .component()
            .map(|component| AdmissionScope::Entity(component.entity_id())),
        UniquenessPolicy::PerTaskType => {
            Some(AdmissionScope::TaskType(record.task_type().to_owned()))
        }
    }
}
