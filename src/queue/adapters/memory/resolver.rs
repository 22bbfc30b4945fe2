//! In-memory context resolver seeded by tests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::queue::{
    domain::{ComponentId, EntityId, SubmitterId},
    ports::{ContextResolver, ContextResolverResult, ResourceDetails, SubmitterDetails},
};

/// Seedable in-memory lookup source.
///
/// Built once with the fixtures a test needs; lookups never fail, they
/// only miss.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContextResolver {
    components: HashMap<ComponentId, ResourceDetails>,
    entities: HashMap<EntityId, ResourceDetails>,
    submitters: HashMap<SubmitterId, SubmitterDetails>,
}

impl InMemoryContextResolver {
    /// Creates an empty resolver where every lookup misses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a component's display metadata.
    #[must_use]
    pub fn with_component(
        mut self,
        id: ComponentId,
        key: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.components.insert(
            id,
            ResourceDetails {
                key: key.into(),
                name: name.into(),
            },
        );
        self
    }

    /// Seeds an entity's display metadata.
    #[must_use]
    pub fn with_entity(
        mut self,
        id: EntityId,
        key: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.entities.insert(
            id,
            ResourceDetails {
                key: key.into(),
                name: name.into(),
            },
        );
        self
    }

    /// Seeds a submitting user's login.
    #[must_use]
    pub fn with_submitter(mut self, id: SubmitterId, login: impl Into<String>) -> Self {
        self.submitters.insert(
            id,
            SubmitterDetails {
                login: login.into(),
            },
        );
        self
    }
}

#[async_trait]
impl ContextResolver for InMemoryContextResolver {
    async fn component(&self, id: ComponentId) -> ContextResolverResult<Option<ResourceDetails>> {
        Ok(self.components.get(&id).cloned())
    }

    async fn entity(&self, id: EntityId) -> ContextResolverResult<Option<ResourceDetails>> {
        Ok(self.entities.get(&id).cloned())
    }

    async fn submitter(
        &self,
        id: SubmitterId,
    ) -> ContextResolverResult<Option<SubmitterDetails>> {
        Ok(self.submitters.get(&id).cloned())
    }
}
