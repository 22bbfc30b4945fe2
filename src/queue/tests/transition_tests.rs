//! Service tests for claim, cancel, fail, and complete transitions.

use std::sync::Arc;

use crate::queue::{
    adapters::memory::{
        InMemoryContextResolver, InMemoryQueueStore, SequentialTaskIdSource,
        StaticNodeInformation,
    },
    domain::{
        ActivityStatus, ComponentId, EntityId, QueueDomainError, QueueRecord, TaskComponent,
        TaskFailure, TaskId, TaskStatus, TaskSubmission, WorkerId,
    },
    ports::{NodeInformation, QueueStore},
    services::{AdmissionError, TaskAdmissionService},
};
use mockable::DefaultClock;
use mockall::mock;
use rstest::{fixture, rstest};

mock! {
    pub Node {}

    impl NodeInformation for Node {
        fn node_name(&self) -> Option<String>;
    }
}

type TestStore = InMemoryQueueStore<DefaultClock>;

#[fixture]
fn store() -> TestStore {
    InMemoryQueueStore::new()
}

fn service_over<N>(
    store: &TestStore,
    resolver: InMemoryContextResolver,
    node: N,
) -> TaskAdmissionService<
    TestStore,
    InMemoryContextResolver,
    SequentialTaskIdSource,
    N,
    DefaultClock,
>
where
    N: NodeInformation,
{
    TaskAdmissionService::new(
        Arc::new(store.clone()),
        Arc::new(resolver),
        Arc::new(SequentialTaskIdSource::new()),
        Arc::new(node),
        Arc::new(DefaultClock),
    )
}

async fn seed_pending(store: &TestStore, component: Option<TaskComponent>) -> QueueRecord {
    let mut submission = TaskSubmission::new("REPORT").expect("valid task type");
    if let Some(reference) = component {
        submission = submission.with_component(reference);
    }
    let record = QueueRecord::admitted(TaskId::new(), submission, &DefaultClock);
    store.insert(&record).await.expect("seed insert");
    record
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claim_transitions_pending_row_and_records_worker(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let record = seed_pending(&store, None).await;
    let worker = WorkerId::new();

    let claimed = service
        .claim(record.id(), worker)
        .await
        .expect("claim should succeed")
        .expect("pending row should be claimable");

    assert_eq!(claimed.status(), TaskStatus::InProgress);
    assert_eq!(claimed.worker_id(), Some(worker));
    let stored = store
        .find_by_id(record.id())
        .await
        .expect("lookup")
        .expect("row should remain queued");
    assert_eq!(stored.status(), TaskStatus::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claim_returns_none_for_unknown_id(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());

    let claimed = service
        .claim(TaskId::new(), WorkerId::new())
        .await
        .expect("claim should succeed");

    assert!(claimed.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claim_returns_none_when_row_already_claimed(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let record = seed_pending(&store, None).await;

    let first = service
        .claim(record.id(), WorkerId::new())
        .await
        .expect("claim should succeed");
    let second = service
        .claim(record.id(), WorkerId::new())
        .await
        .expect("claim should succeed");

    assert!(first.is_some());
    assert!(second.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_pending_creates_canceled_activity(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let record = seed_pending(&store, None).await;

    service.cancel(&record).await.expect("cancel should succeed");

    assert!(store.find_by_id(record.id()).await.expect("lookup").is_none());
    let activity = store
        .find_activity(record.id())
        .await
        .expect("lookup")
        .expect("activity row should exist");
    assert_eq!(activity.status(), ActivityStatus::Canceled);
    assert_eq!(activity.node_name(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_records_node_name_when_provided(store: TestStore) {
    let mut node = MockNode::new();
    node.expect_node_name()
        .return_const(Some("node-1".to_owned()));
    let service = service_over(&store, InMemoryContextResolver::new(), node);
    let record = seed_pending(&store, None).await;

    service.cancel(&record).await.expect("cancel should succeed");

    let activity = store
        .find_activity(record.id())
        .await
        .expect("lookup")
        .expect("activity row should exist");
    assert_eq!(activity.node_name(), Some("node-1"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_in_progress_errors_and_leaves_row_untouched(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let record = seed_pending(&store, None).await;
    let claimed = service
        .claim(record.id(), WorkerId::new())
        .await
        .expect("claim should succeed")
        .expect("pending row should be claimable");

    let result = service.cancel(&claimed).await;

    assert!(matches!(
        result,
        Err(AdmissionError::Domain(QueueDomainError::CancelInProgress(_)))
    ));
    let stored = store
        .find_by_id(record.id())
        .await
        .expect("lookup")
        .expect("row should remain queued");
    assert_eq!(stored.status(), TaskStatus::InProgress);
    assert!(store.find_activity(record.id()).await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_all_cancels_pendings_but_not_in_progress(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let in_progress = seed_pending(&store, None).await;
    let pending_one = seed_pending(&store, None).await;
    let pending_two = seed_pending(&store, None).await;
    service
        .claim(in_progress.id(), WorkerId::new())
        .await
        .expect("claim should succeed");

    let canceled = service.cancel_all().await.expect("cancel all should succeed");

    assert_eq!(canceled, 2);
    for id in [pending_one.id(), pending_two.id()] {
        let activity = store
            .find_activity(id)
            .await
            .expect("lookup")
            .expect("activity row should exist");
        assert_eq!(activity.status(), ActivityStatus::Canceled);
    }
    assert!(store.find_activity(in_progress.id()).await.expect("lookup").is_none());
    assert!(store.find_by_id(in_progress.id()).await.expect("lookup").is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fail_in_progress_records_failure_details(store: TestStore) {
    let mut node = MockNode::new();
    node.expect_node_name()
        .return_const(Some("node-1".to_owned()));
    let service = service_over(&store, InMemoryContextResolver::new(), node);
    let record = seed_pending(&store, None).await;
    let worker = WorkerId::new();
    let claimed = service
        .claim(record.id(), worker)
        .await
        .expect("claim should succeed")
        .expect("pending row should be claimable");

    service
        .fail(&claimed, TaskFailure::new("TIMEOUT", "Failed on timeout"))
        .await
        .expect("fail should succeed");

    assert!(store.find_by_id(record.id()).await.expect("lookup").is_none());
    let activity = store
        .find_activity(record.id())
        .await
        .expect("lookup")
        .expect("activity row should exist");
    assert_eq!(activity.status(), ActivityStatus::Failed);
    let failure = activity.failure().expect("failure details");
    assert_eq!(failure.error_type(), "TIMEOUT");
    assert_eq!(failure.error_message(), "Failed on timeout");
    assert_eq!(activity.worker_id(), Some(worker));
    assert_eq!(activity.node_name(), Some("node-1"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fail_pending_errors_with_task_id_in_message(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let record = seed_pending(&store, None).await;

    let result = service
        .fail(&record, TaskFailure::new("TIMEOUT", "Failed on timeout"))
        .await;

    let err = result.expect_err("fail on a pending row must be rejected");
    assert_eq!(
        err.to_string(),
        format!(
            "Task is not in-progress and can't be marked as failed [uuid={}]",
            record.id()
        )
    );
    assert!(store.find_by_id(record.id()).await.expect("lookup").is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn complete_in_progress_records_success(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let record = seed_pending(&store, None).await;
    let claimed = service
        .claim(record.id(), WorkerId::new())
        .await
        .expect("claim should succeed")
        .expect("pending row should be claimable");

    service.complete(&claimed).await.expect("complete should succeed");

    let activity = store
        .find_activity(record.id())
        .await
        .expect("lookup")
        .expect("activity row should exist");
    assert_eq!(activity.status(), ActivityStatus::Success);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claimed_task_errors_when_component_was_deleted(store: TestStore) {
    let service = service_over(&store, InMemoryContextResolver::new(), StaticNodeInformation::anonymous());
    let component = TaskComponent::new(ComponentId::new(), EntityId::new());
    let record = seed_pending(&store, Some(component)).await;
    let claimed = service
        .claim(record.id(), WorkerId::new())
        .await
        .expect("claim should succeed")
        .expect("pending row should be claimable");

    let result = service.claimed_task(&claimed).await;

    let err = result.expect_err("resolution must fail for a vanished component");
    assert!(matches!(err, AdmissionError::ComponentVanished(id) if id == component.component_id()));
    assert_eq!(
        err.to_string(),
        format!(
            "component {} has been deleted by end-user during analysis",
            component.component_id()
        )
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claimed_task_resolves_when_component_exists(store: TestStore) {
    let component = TaskComponent::new(ComponentId::new(), EntityId::new());
    let resolver = InMemoryContextResolver::new()
        .with_component(component.component_id(), "project-1:branch-main", "main")
        .with_entity(component.entity_id(), "project-1", "Project One");
    let service = service_over(&store, resolver, StaticNodeInformation::anonymous());
    let record = seed_pending(&store, Some(component)).await;
    let claimed = service
        .claim(record.id(), WorkerId::new())
        .await
        .expect("claim should succeed")
        .expect("pending row should be claimable");

    let task = service
        .claimed_task(&claimed)
        .await
        .expect("resolution should succeed");

    assert_eq!(task.id(), record.id());
    let snapshot = task.component().expect("component snapshot");
    assert_eq!(snapshot.key(), Some("project-1:branch-main"));
}
