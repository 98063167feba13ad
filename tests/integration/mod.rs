// tests/integration/mod.rs

mod cli_run;
mod config_run;
mod executor_run;
