pub mod builders;
pub mod fake_effect;

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tracing_subscriber::fmt;

use fake_effect::ScriptedEffect;

static INIT: Once = Once::new();

/// Shared, ordered record of the task names an effect was asked to run.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

/// Install a test subscriber once per test binary.
///
/// Uses the same filter selection as the binary (`TASKPILOT_LOG`, then
/// `RUST_LOG`, then `taskpilot=info`), but writes through
/// `with_test_writer()` so output only shows up for failing tests.
pub fn init_tracing() {
    INIT.call_once(|| {
        let Ok(filter) = taskpilot::logging::env_filter(None) else {
            return;
        };

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// A `ScriptedEffect` together with the log it records into.
pub fn recording_effect() -> (ScriptedEffect, ExecutionLog) {
    let log = ExecutionLog::default();
    (ScriptedEffect::new(log.clone()), log)
}

/// Run a future with a 5-second timeout, so a run that never drains fails
/// the test instead of hanging it.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("run did not finish within 5 seconds")
}
