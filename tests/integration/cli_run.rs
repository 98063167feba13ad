// tests/integration/cli_run.rs

use std::io::Write;

use clap::Parser;
use tempfile::{NamedTempFile, tempdir};
use taskpilot::cli::CliArgs;
use taskpilot_test_utils::init_tracing;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn args(config: &std::path::Path, extra: &[&str]) -> CliArgs {
    let config = config.to_string_lossy().into_owned();
    let mut argv = vec!["taskpilot", "--config", config.as_str()];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn runs_configured_tasks_to_completion() {
    init_tracing();
    let file = config_file(
        r#"
[goal]
description = "release"

[task.build]
priority = 2

[task.test]
after = ["build"]
fail_attempts = 2
"#,
    );

    taskpilot::run(args(file.path(), &[])).await.unwrap();
}

#[tokio::test]
async fn dry_run_executes_nothing_and_succeeds() {
    init_tracing();
    let file = config_file(
        r#"
[task.A]
[task.B]
after = ["A"]
"#,
    );

    // No goal is configured, so a real run would fail.
    taskpilot::run(args(file.path(), &["--dry-run"])).await.unwrap();
}

#[tokio::test]
async fn missing_goal_fails_the_run() {
    init_tracing();
    let file = config_file("[task.A]\n");

    let err = taskpilot::run(args(file.path(), &[])).await.unwrap_err();
    assert!(err.to_string().contains("no goal"));
}

#[tokio::test]
async fn goal_flag_supplies_the_missing_goal() {
    init_tracing();
    let file = config_file("[task.A]\n");

    taskpilot::run(args(file.path(), &["--goal", "ship", "--priority", "3"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn goal_flag_works_without_a_config_file() {
    init_tracing();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("Taskpilot.toml");

    taskpilot::run(args(&missing, &["--goal", "Write the docs"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_config_file_without_goal_is_an_error() {
    init_tracing();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("Taskpilot.toml");

    let err = taskpilot::run(args(&missing, &[])).await.unwrap_err();
    assert!(format!("{err:#}").contains("loading config"));
}

#[tokio::test]
async fn iteration_cap_flag_stops_a_task_that_keeps_failing() {
    init_tracing();
    let file = config_file(
        r#"
[goal]
description = "g"

[task.flaky]
fail_attempts = 1000
"#,
    );

    // Unbounded in the file; the flag bounds it.
    taskpilot::run(args(file.path(), &["--max-iterations", "5", "--ordering", "strict"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn cyclic_config_is_rejected_before_running() {
    init_tracing();
    let file = config_file(
        r#"
[goal]
description = "g"

[task.A]
after = ["B"]

[task.B]
after = ["A"]
"#,
    );

    let err = taskpilot::run(args(file.path(), &[])).await.unwrap_err();
    assert!(format!("{err:#}").contains("cycle"));
}
