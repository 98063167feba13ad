// tests/integration/config_run.rs

use std::io::Write;

use tempfile::NamedTempFile;
use taskpilot::config::load_and_validate;
use taskpilot::dag::Scheduler;
use taskpilot::engine::{Executor, StopReason};
use taskpilot::exec::SimulatedEffect;
use taskpilot::model::Goal;
use taskpilot::planner::{GoalBreakdown, SubGoalBreakdown};
use taskpilot::types::OrderPolicy;
use taskpilot_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use taskpilot_test_utils::init_tracing;

#[test]
fn loads_full_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[config]
max_retries = 3
max_iterations = 50
ordering = "strict"

[goal]
description = "Complete project documentation"
priority = 1

[[goal.sub_goals]]
description = "Write README"
priority = 2

[task.outline]
description = "Outline the docs"
priority = 2

[task.write_readme]
after = ["outline"]
fail_attempts = 1
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.config.max_retries, Some(3));
    assert_eq!(cfg.config.max_iterations, Some(50));
    assert_eq!(cfg.config.ordering, OrderPolicy::Strict);

    let goal = cfg.goal.as_ref().unwrap();
    assert_eq!(goal.sub_goals.len(), 1);
    assert_eq!(goal.sub_goals[0].priority, 2);

    let tasks = cfg.tasks();
    assert_eq!(tasks.len(), 2);
    let readme = tasks.iter().find(|t| t.name == "write_readme").unwrap();
    assert_eq!(readme.priority, 1);
    assert!(readme.dependencies.contains("outline"));
    assert_eq!(cfg.fail_attempts().get("write_readme"), Some(&1));

    let opts = cfg.config.executor_options();
    assert_eq!(opts.retry.max_retries, Some(3));
    assert_eq!(opts.max_iterations, Some(50));
}

#[tokio::test]
async fn configured_tasks_run_to_completion_with_simulated_failures() {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_goal(Goal::new("release", 1))
        .with_task("build", TaskConfigBuilder::new().priority(2).build())
        .with_task(
            "test",
            TaskConfigBuilder::new().after("build").fail_attempts(2).build(),
        )
        .with_task("notes", TaskConfigBuilder::new().build())
        .max_retries(5)
        .build();

    let effect = SimulatedEffect::with_failures(cfg.fail_attempts());
    let mut ex = Executor::new(
        Scheduler::new(cfg.config.ordering),
        effect,
        cfg.config.executor_options(),
    );
    ex.set_goal_record(cfg.goal.clone().unwrap());
    for t in cfg.tasks() {
        ex.add_task(t).unwrap();
    }

    let summary = ex.run().await.unwrap();

    assert_eq!(summary.stop, StopReason::Drained);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed_attempts, 2);
    assert_eq!(ex.effect().failures_of("test"), 2);
    assert_eq!(ex.state().completed_tasks, 3);
}

#[tokio::test]
async fn goal_breakdown_feeds_executor() {
    init_tracing();
    let goal = Goal::new("Complete project documentation", 1)
        .with_sub_goal(Goal::new("Write README", 2))
        .with_sub_goal(Goal::new("Create API documentation", 2))
        .with_sub_goal(Goal::new("Add usage examples", 1));

    let mut ex = Executor::new(
        Scheduler::new(OrderPolicy::Strict),
        SimulatedEffect::new(),
        Default::default(),
    );
    ex.set_goal(goal.description.clone(), goal.priority);
    for t in SubGoalBreakdown.breakdown(&goal) {
        ex.add_task(t).unwrap();
    }

    let summary = ex.run().await.unwrap();
    assert_eq!(summary.stop, StopReason::Drained);

    let done: Vec<&str> = ex
        .core()
        .completed_tasks()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(
        done,
        vec![
            "main_complete_project_documentation",
            "sub_0_write_readme",
            "sub_1_create_api_documentation",
            "sub_2_add_usage_examples",
        ]
    );
}
