//! Integration tests for exclusivity under concurrent callers.

use crate::in_memory::helpers::{
    TestStore, admission_over, component_submission, report_submission, store,
};
use brunel::queue::{
    domain::{ComponentId, EntityId, TaskComponent, UniquenessPolicy, WorkerId},
    ports::QueueStore,
};
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exactly_one_of_two_concurrent_claims_wins(store: TestStore) {
    let service = Arc::new(admission_over(&store));
    let task = service
        .submit(report_submission())
        .await
        .expect("submit should succeed");

    let first_worker = WorkerId::new();
    let second_worker = WorkerId::new();
    let task_id = task.id();
    let first = tokio::spawn({
        let claimer = Arc::clone(&service);
        async move { claimer.claim(task_id, first_worker).await }
    });
    let second = tokio::spawn({
        let claimer = Arc::clone(&service);
        async move { claimer.claim(task_id, second_worker).await }
    });

    let first_outcome = first
        .await
        .expect("claim task should not panic")
        .expect("claim should succeed");
    let second_outcome = second
        .await
        .expect("claim task should not panic")
        .expect("claim should succeed");

    assert!(first_outcome.is_some() != second_outcome.is_some());
    let winner = first_outcome.or(second_outcome).expect("one claim wins");
    assert!(winner.worker_id() == Some(first_worker) || winner.worker_id() == Some(second_worker));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exactly_one_of_two_concurrent_guarded_submissions_is_admitted(store: TestStore) {
    let service = Arc::new(admission_over(&store));
    let entity = EntityId::new();

    let first = tokio::spawn({
        let submitter = Arc::clone(&service);
        let submission = component_submission(TaskComponent::new(ComponentId::new(), entity));
        async move {
            submitter
                .submit_with_policy(submission, UniquenessPolicy::PerEntity)
                .await
        }
    });
    let second = tokio::spawn({
        let submitter = Arc::clone(&service);
        let submission = component_submission(TaskComponent::new(ComponentId::new(), entity));
        async move {
            submitter
                .submit_with_policy(submission, UniquenessPolicy::PerEntity)
                .await
        }
    });

    let first_outcome = first
        .await
        .expect("submit task should not panic")
        .expect("submit should succeed");
    let second_outcome = second
        .await
        .expect("submit task should not panic")
        .expect("submit should succeed");

    assert!(first_outcome.is_some() != second_outcome.is_some());
    assert_eq!(store.list_pending().await.expect("list").len(), 1);
}
