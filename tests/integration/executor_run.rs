// tests/integration/executor_run.rs

use taskpilot::dag::Scheduler;
use taskpilot::engine::{Attempt, Executor, ExecutorOptions, RetryPolicy, StopReason};
use taskpilot::errors::TaskpilotError;
use taskpilot::model::TaskStatus;
use taskpilot::types::OrderPolicy;
use taskpilot_test_utils::builders::task;
use taskpilot_test_utils::fake_effect::ScriptedEffect;
use taskpilot_test_utils::{ExecutionLog, init_tracing, recording_effect, with_timeout};

fn executor(effect: ScriptedEffect, options: ExecutorOptions) -> Executor<ScriptedEffect> {
    Executor::new(Scheduler::default(), effect, options)
}

#[tokio::test]
async fn runs_all_tasks_in_planned_order() {
    init_tracing();
    let (effect, log) = recording_effect();
    let mut ex = executor(effect, ExecutorOptions::default());

    ex.set_goal("ship", 1);
    ex.add_task(task("C", 1, &["A"])).unwrap();
    ex.add_task(task("A", 1, &[])).unwrap();
    ex.add_task(task("B", 5, &[])).unwrap();

    let summary = with_timeout(ex.run()).await.unwrap();

    assert_eq!(summary.stop, StopReason::Drained);
    assert_eq!(summary.iterations, 3);
    assert_eq!(*log.lock().unwrap(), vec!["B", "A", "C"]);

    let state = ex.state();
    assert_eq!(state.pending_tasks, 0);
    assert_eq!(state.completed_tasks, 3);
    for t in ex.core().completed_tasks() {
        assert_eq!(t.status, TaskStatus::Completed);
        assert!(t.completed_at.is_some());
    }
}

#[tokio::test]
async fn run_without_goal_leaves_queue_untouched() {
    init_tracing();
    let (effect, log) = recording_effect();
    let mut ex = executor(effect, ExecutorOptions::default());

    ex.add_task(task("A", 1, &[])).unwrap();
    let summary = ex.run().await.unwrap();

    assert_eq!(summary.stop, StopReason::NoGoal);
    assert_eq!(summary.iterations, 0);
    assert_eq!(ex.state().pending_tasks, 1);
    assert!(ex.state().current_goal.is_none());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn permanently_failing_task_is_requeued_every_iteration() {
    init_tracing();
    let log = ExecutionLog::default();
    let effect = ScriptedEffect::new(log.clone()).always_fail("stuck");
    let options = ExecutorOptions {
        retry: RetryPolicy::unbounded(),
        max_iterations: Some(25),
    };
    let mut ex = executor(effect, options);

    ex.set_goal("never done", 1);
    ex.add_task(task("stuck", 1, &[])).unwrap();

    let summary = with_timeout(ex.run()).await.unwrap();

    assert_eq!(summary.stop, StopReason::IterationCap);
    assert_eq!(summary.iterations, 25);
    assert_eq!(summary.failed_attempts, 25);
    assert_eq!(log.lock().unwrap().len(), 25);
    assert_eq!(ex.state().pending_tasks, 1);
    assert_eq!(ex.state().completed_tasks, 0);
}

#[tokio::test]
async fn failed_task_goes_to_tail_and_is_replanned() {
    init_tracing();
    let log = ExecutionLog::default();
    let effect = ScriptedEffect::new(log.clone()).fail_times("A", 1);
    let mut ex = executor(effect, ExecutorOptions::default());

    ex.set_goal("g", 1);
    ex.add_task(task("A", 1, &[])).unwrap();
    ex.add_task(task("B", 1, &["A"])).unwrap();

    let summary = ex.run().await.unwrap();

    // Replanning puts A back in front of its dependent B.
    assert_eq!(*log.lock().unwrap(), vec!["A", "A", "B"]);
    assert_eq!(summary.failed_attempts, 1);
    assert_eq!(summary.completed, 2);

    let a = ex
        .core()
        .completed_tasks()
        .iter()
        .find(|t| t.name == "A")
        .unwrap();
    assert_eq!(a.attempts, 2);
}

#[tokio::test]
async fn retry_bound_abandons_task() {
    init_tracing();
    let log = ExecutionLog::default();
    let effect = ScriptedEffect::new(log.clone()).always_fail("bad");
    let options = ExecutorOptions {
        retry: RetryPolicy::bounded(2),
        max_iterations: None,
    };
    let mut ex = executor(effect, options);

    ex.set_goal("g", 1);
    ex.add_task(task("bad", 1, &[])).unwrap();
    ex.add_task(task("good", 1, &[])).unwrap();

    let summary = with_timeout(ex.run()).await.unwrap();

    assert_eq!(summary.stop, StopReason::Drained);
    assert_eq!(summary.abandoned, 1);
    assert_eq!(summary.completed, 1);
    // One initial attempt plus two retries.
    assert_eq!(log.lock().unwrap().iter().filter(|n| *n == "bad").count(), 3);
    assert_eq!(ex.state().abandoned_tasks, 1);
}

#[tokio::test]
async fn panicking_effect_is_captured_as_failure() {
    init_tracing();
    let log = ExecutionLog::default();
    let effect = ScriptedEffect::new(log.clone()).panic_on("boom");
    let mut ex = executor(effect, ExecutorOptions::default());

    let attempt = ex.execute_one(task("boom", 1, &[])).await;

    assert!(!attempt.is_success());
    match attempt {
        Attempt::Failed(t) => {
            assert_eq!(t.status, TaskStatus::Failed);
            assert_eq!(t.attempts, 1);
            assert!(t.completed_at.is_none());
        }
        Attempt::Completed => panic!("expected failure"),
    }
    assert_eq!(ex.state().completed_tasks, 0);
}

#[tokio::test]
async fn execute_one_success_moves_to_completed() {
    let log = ExecutionLog::default();
    let mut ex = executor(ScriptedEffect::new(log), ExecutorOptions::default());

    let attempt = ex.execute_one(task("ok", 1, &[])).await;

    assert!(attempt.is_success());
    assert_eq!(ex.state().completed_tasks, 1);
}

#[tokio::test]
async fn cycle_aborts_run() {
    init_tracing();
    let (effect, log) = recording_effect();
    let mut ex = executor(effect, ExecutorOptions::default());

    ex.set_goal("g", 1);
    ex.add_task(task("A", 1, &["B"])).unwrap();
    ex.add_task(task("B", 1, &["A"])).unwrap();

    let err = ex.run().await.unwrap_err();
    assert!(matches!(err, TaskpilotError::DagCycle(_)));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(ex.state().pending_tasks, 2);
}

#[tokio::test]
async fn set_goal_keeps_queue_and_state_is_serializable() {
    let log = ExecutionLog::default();
    let mut ex = executor(ScriptedEffect::new(log), ExecutorOptions::default());

    ex.add_task(task("A", 1, &[])).unwrap();
    ex.set_goal("first", 1);
    ex.set_goal("second", 3);
    ex.set_state("owner", serde_json::json!("ops"));

    let state = ex.state();
    assert_eq!(state.pending_tasks, 1);
    assert_eq!(state.current_goal.as_ref().unwrap().description, "second");

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["pending_tasks"], 1);
    assert_eq!(json["completed_tasks"], 0);
    assert_eq!(json["state"]["owner"], "ops");
    assert_eq!(json["current_goal"]["priority"], 3);
}

#[tokio::test]
async fn abandoned_task_takes_its_dependents_with_it() {
    init_tracing();
    let log = ExecutionLog::default();
    let effect = ScriptedEffect::new(log.clone()).always_fail("setup");
    let options = ExecutorOptions {
        retry: RetryPolicy::bounded(0),
        max_iterations: None,
    };
    let mut ex = Executor::new(Scheduler::new(OrderPolicy::Strict), effect, options);

    ex.set_goal("g", 1);
    ex.add_task(task("setup", 1, &[])).unwrap();
    ex.add_task(task("deploy", 1, &["setup"])).unwrap();
    ex.add_task(task("docs", 1, &[])).unwrap();

    let summary = with_timeout(ex.run()).await.unwrap();

    assert_eq!(summary.stop, StopReason::Drained);
    assert_eq!(*log.lock().unwrap(), vec!["setup", "docs"]);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.abandoned, 2);

    let abandoned: Vec<&str> = ex
        .core()
        .abandoned_tasks()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(abandoned, vec!["setup", "deploy"]);
    assert!(ex.core().completed_tasks().iter().all(|t| t.name == "docs"));
}

#[tokio::test]
async fn name_of_task_completed_by_execute_one_cannot_be_reused() {
    let log = ExecutionLog::default();
    let mut ex = executor(ScriptedEffect::new(log), ExecutorOptions::default());

    assert!(ex.execute_one(task("ok", 1, &[])).await.is_success());

    let err = ex.add_task(task("ok", 1, &[])).unwrap_err();
    assert!(matches!(err, TaskpilotError::DuplicateTask(name) if name == "ok"));
    assert_eq!(ex.state().pending_tasks, 0);
}
