//! Integration tests for the full pending to terminal lifecycle.

use crate::in_memory::helpers::{
    TestStore, admission_over, admission_with_resolver, component_submission, report_submission,
    store,
};
use brunel::queue::{
    adapters::memory::InMemoryContextResolver,
    domain::{ActivityStatus, ComponentId, EntityId, TaskComponent, TaskFailure, WorkerId},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitted_task_can_be_claimed_and_failed(store: TestStore) {
    let service = admission_over(&store);
    let worker = WorkerId::new();
    let task = service
        .submit(report_submission())
        .await
        .expect("submit should succeed");

    let claimed = service
        .claim(task.id(), worker)
        .await
        .expect("claim should succeed")
        .expect("pending task should be claimable");

    service
        .fail(&claimed, TaskFailure::new("ANALYSIS_ERROR", "parser crashed"))
        .await
        .expect("fail should succeed");

    assert!(service
        .find_queued(task.id())
        .await
        .expect("lookup should succeed")
        .is_none());
    let activity = service
        .find_activity(task.id())
        .await
        .expect("lookup should succeed")
        .expect("terminal outcome should be recorded");
    assert_eq!(activity.status(), ActivityStatus::Failed);
    assert_eq!(activity.worker_id(), Some(worker));
    assert_eq!(activity.node_name(), Some("node-1"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn canceled_task_is_no_longer_claimable(store: TestStore) {
    let service = admission_over(&store);
    let task = service
        .submit(report_submission())
        .await
        .expect("submit should succeed");
    let record = service
        .find_queued(task.id())
        .await
        .expect("lookup should succeed")
        .expect("queue row should exist");

    service.cancel(&record).await.expect("cancel should succeed");

    let claimed = service
        .claim(task.id(), WorkerId::new())
        .await
        .expect("claim should succeed");
    assert!(claimed.is_none());
    let activity = service
        .find_activity(task.id())
        .await
        .expect("lookup should succeed")
        .expect("terminal outcome should be recorded");
    assert_eq!(activity.status(), ActivityStatus::Canceled);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_leaves_success_history(store: TestStore) {
    let component = TaskComponent::new(ComponentId::new(), EntityId::new());
    let resolver = InMemoryContextResolver::new()
        .with_component(component.component_id(), "acme:app:main", "main")
        .with_entity(component.entity_id(), "acme:app", "Acme App");
    let service = admission_with_resolver(&store, resolver);
    let task = service
        .submit(component_submission(component))
        .await
        .expect("submit should succeed");

    let claimed = service
        .claim(task.id(), WorkerId::new())
        .await
        .expect("claim should succeed")
        .expect("pending task should be claimable");

    let execution_task = service
        .claimed_task(&claimed)
        .await
        .expect("claimed task should resolve");
    assert_eq!(execution_task.id(), task.id());

    service
        .complete(&claimed)
        .await
        .expect("complete should succeed");

    let activity = service
        .find_activity(task.id())
        .await
        .expect("lookup should succeed")
        .expect("terminal outcome should be recorded");
    assert_eq!(activity.status(), ActivityStatus::Success);
    assert_eq!(activity.failure(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_all_reports_count_and_spares_running_work(store: TestStore) {
    let service = admission_over(&store);
    let running = service
        .submit(report_submission())
        .await
        .expect("submit should succeed");
    for _ in 0..3 {
        service
            .submit(report_submission())
            .await
            .expect("submit should succeed");
    }
    service
        .claim(running.id(), WorkerId::new())
        .await
        .expect("claim should succeed")
        .expect("pending task should be claimable");

    let canceled = service
        .cancel_all()
        .await
        .expect("cancel all should succeed");

    assert_eq!(canceled, 3);
    assert!(service
        .find_queued(running.id())
        .await
        .expect("lookup should succeed")
        .is_some());
}
