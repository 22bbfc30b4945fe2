//! Integration tests for pause/resume driven through the services.

use crate::in_memory::helpers::{TestStore, admission_over, pause_over, report_submission, store};
use brunel::queue::domain::{TaskFailure, WorkerId, WorkersPauseStatus};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pause_drains_running_work_before_reading_paused(store: TestStore) {
    let admission = admission_over(&store);
    let pause = pause_over(&store);
    let task = admission
        .submit(report_submission())
        .await
        .expect("submit should succeed");
    let claimed = admission
        .claim(task.id(), WorkerId::new())
        .await
        .expect("claim should succeed")
        .expect("pending task should be claimable");

    assert_eq!(
        pause.pause_workers().await.expect("pause should succeed"),
        WorkersPauseStatus::Pausing
    );

    admission
        .fail(&claimed, TaskFailure::new("TIMEOUT", "Failed on timeout"))
        .await
        .expect("fail should succeed");

    assert_eq!(
        pause.status().await.expect("status read"),
        WorkersPauseStatus::Paused
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pause_status_is_shared_across_service_instances(store: TestStore) {
    let pause = pause_over(&store);
    let observer = pause_over(&store);

    pause.pause_workers().await.expect("pause should succeed");

    assert_eq!(
        observer.status().await.expect("status read"),
        WorkersPauseStatus::Paused
    );

    observer
        .resume_workers()
        .await
        .expect("resume should succeed");
    assert_eq!(
        pause.status().await.expect("status read"),
        WorkersPauseStatus::Resumed
    );
}
