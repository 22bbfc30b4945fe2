//! Shared test helpers for in-memory queue integration tests.

use brunel::queue::{
    adapters::memory::{
        InMemoryContextResolver, InMemoryQueueStore, SequentialTaskIdSource,
        StaticNodeInformation,
    },
    domain::{TaskComponent, TaskSubmission},
    services::{TaskAdmissionService, WorkerPauseService},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Store type shared by the integration suites.
pub type TestStore = InMemoryQueueStore<DefaultClock>;

/// Admission service type shared by the integration suites.
pub type TestAdmission = TaskAdmissionService<
    TestStore,
    InMemoryContextResolver,
    SequentialTaskIdSource,
    StaticNodeInformation,
    DefaultClock,
>;

/// Provides a fresh shared store for each test.
#[fixture]
pub fn store() -> TestStore {
    InMemoryQueueStore::new()
}

/// Builds an admission service over the given store with an empty resolver.
pub fn admission_over(store: &TestStore) -> TestAdmission {
    admission_with_resolver(store, InMemoryContextResolver::new())
}

/// Builds an admission service over the given store and resolver.
pub fn admission_with_resolver(
    store: &TestStore,
    resolver: InMemoryContextResolver,
) -> TestAdmission {
    TaskAdmissionService::new(
        Arc::new(store.clone()),
        Arc::new(resolver),
        Arc::new(SequentialTaskIdSource::new()),
        Arc::new(StaticNodeInformation::named("node-1")),
        Arc::new(DefaultClock),
    )
}

/// Builds a pause service over the given store.
pub fn pause_over(store: &TestStore) -> WorkerPauseService<TestStore> {
    WorkerPauseService::new(Arc::new(store.clone()))
}

/// Builds a plain report submission.
pub fn report_submission() -> TaskSubmission {
    TaskSubmission::new("REPORT").expect("valid task type")
}

/// Builds a report submission targeting the given component.
pub fn component_submission(component: TaskComponent) -> TaskSubmission {
    report_submission().with_component(component)
}
