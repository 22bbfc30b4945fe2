//! Cluster-wide worker pause coordination.

use crate::queue::{
    domain::WorkersPauseStatus,
    ports::{QueueStore, QueueStoreError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for pause coordination.
#[derive(Debug, Error)]
pub enum PauseError {
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] QueueStoreError),
}

/// Result type for pause service operations.
pub type PauseResult<T> = Result<T, PauseError>;

/// Coordinates draining in-progress tasks before pausing claims.
///
/// The pause request is a persisted cluster-wide flag; the resulting
/// status is recomputed against the queue table on every read rather than
/// cached, so the pausing → paused promotion needs no background job.
#[derive(Clone)]
pub struct WorkerPauseService<S>
where
    S: QueueStore,
{
    store: Arc<S>,
}

impl<S> WorkerPauseService<S>
where
    S: QueueStore,
{
    /// Creates a new pause service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Requests a cluster-wide pause of worker claims.
    ///
    /// Already-running tasks are allowed to finish. Returns the resulting
    /// status: `Paused` when nothing is in progress, `Pausing` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`PauseError::Store`] when persisting the request fails.
    pub async fn pause_workers(&self) -> PauseResult<WorkersPauseStatus> {
        self.store.set_pause_requested(true).await?;
        let status = self.status().await?;
        info!(status = status.as_str(), "worker pause requested");
        Ok(status)
    }

    /// Resumes worker claims from any pause state.
    ///
    /// No-op when workers are already resumed.
    ///
    /// # Errors
    ///
    /// Returns [`PauseError::Store`] when clearing the request fails.
    pub async fn resume_workers(&self) -> PauseResult<()> {
        self.store.set_pause_requested(false).await?;
        info!("workers resumed");
        Ok(())
    }

    /// Returns the current pause status.
    ///
    /// Recomputed on every call: a pause request with no in-progress task
    /// left reads as `Paused`.
    ///
    /// # Errors
    ///
    /// Returns [`PauseError::Store`] when reading queue state fails.
    pub async fn status(&self) -> PauseResult<WorkersPauseStatus> {
        if !self.store.pause_requested().await? {
            return Ok(WorkersPauseStatus::Resumed);
        }
        let in_progress = self.store.count_in_progress().await?;
        if in_progress > 0 {
            Ok(WorkersPauseStatus::Pausing)
        } else {
            Ok(WorkersPauseStatus::Paused)
        }
    }
}
