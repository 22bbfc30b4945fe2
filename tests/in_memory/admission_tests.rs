//! Integration tests for admission through the public API.

use crate::in_memory::helpers::{
    TestStore, admission_over, admission_with_resolver, component_submission, report_submission,
    store,
};
use brunel::queue::{
    adapters::memory::InMemoryContextResolver,
    domain::{ComponentId, EntityId, TaskComponent, UniquenessPolicy},
    ports::QueueStore,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitted_report_is_enriched_then_same_entity_resubmission_is_rejected(
    store: TestStore,
) {
    let component = TaskComponent::new(ComponentId::new(), EntityId::new());
    let service = admission_over(&store);

    let task = service
        .submit(component_submission(component))
        .await
        .expect("submit should succeed");

    assert_eq!(task.task_type(), "REPORT");
    assert_eq!(
        task.component().map(|snapshot| snapshot.id()),
        Some(component.component_id().into_inner())
    );
    assert_eq!(
        task.entity().map(|snapshot| snapshot.id()),
        Some(component.entity_id().into_inner())
    );

    let duplicate = service
        .submit_with_policy(
            component_submission(TaskComponent::new(ComponentId::new(), component.entity_id())),
            UniquenessPolicy::PerEntity,
        )
        .await
        .expect("submit should succeed");

    assert!(duplicate.is_none());
    let pending = store.list_pending().await.expect("list");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending.first().map(|record| record.id()), Some(task.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolver_details_flow_into_returned_task(store: TestStore) {
    let component = TaskComponent::new(ComponentId::new(), EntityId::new());
    let resolver = InMemoryContextResolver::new()
        .with_component(component.component_id(), "acme:app:main", "main")
        .with_entity(component.entity_id(), "acme:app", "Acme App");
    let service = admission_with_resolver(&store, resolver);

    let task = service
        .submit(component_submission(component))
        .await
        .expect("submit should succeed");

    assert_eq!(
        task.component().and_then(|snapshot| snapshot.key()),
        Some("acme:app:main")
    );
    assert_eq!(
        task.entity().and_then(|snapshot| snapshot.name()),
        Some("Acme App")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_admission_is_order_sensitive_within_one_call(store: TestStore) {
    let service = admission_over(&store);
    let entity = EntityId::new();
    let first = component_submission(TaskComponent::new(ComponentId::new(), entity));
    let second = component_submission(TaskComponent::new(ComponentId::new(), entity));
    let third = report_submission();

    let admitted = service
        .mass_submit(vec![first, second, third], UniquenessPolicy::PerEntity)
        .await
        .expect("mass submit should succeed");

    // The second submission loses to the first within the same batch; the
    // component-less third is exempt from the entity scope.
    assert_eq!(admitted.len(), 2);
    assert_eq!(store.list_pending().await.expect("list").len(), 2);
}
