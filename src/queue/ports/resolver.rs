//! Read-only lookup port for task display metadata.

use crate::queue::domain::{ComponentId, EntityId, SubmitterId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for context resolver operations.
pub type ContextResolverResult<T> = Result<T, ContextResolverError>;

/// Resolved display metadata for a component or entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDetails {
    /// Stable resource key.
    pub key: String,
    /// Human-readable resource name.
    pub name: String,
}

/// Resolved display metadata for a submitting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterDetails {
    /// User login.
    pub login: String,
}

/// Lookup contract used to enrich returned task handles.
///
/// Lookups never gate admission: a missing resource degrades the returned
/// snapshot instead of rejecting the submission.
#[async_trait]
pub trait ContextResolver: Send + Sync {
    /// Looks up a component's display metadata.
    async fn component(&self, id: ComponentId) -> ContextResolverResult<Option<ResourceDetails>>;

    /// Looks up an entity's display metadata.
    async fn entity(&self, id: EntityId) -> ContextResolverResult<Option<ResourceDetails>>;

    /// Looks up a submitting user's display metadata.
    async fn submitter(
        &self,
        id: SubmitterId,
    ) -> ContextResolverResult<Option<SubmitterDetails>>;
}

/// Errors returned by context resolver implementations.
#[derive(Debug, Clone, Error)]
pub enum ContextResolverError {
    /// Lookup-layer failure.
    #[error("context lookup error: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl ContextResolverError {
    /// Wraps a lookup error.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
