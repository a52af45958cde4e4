//! `si component`: create components, run management functions and read
//! their job logs.

use clap::Subcommand;
use serde_json::Value;
use si::Settings;
use si_ids::{ComponentId, JobStateId};
use std::time::{Duration, Instant};

use crate::cli::context;
use crate::cli::error::{client_error, HelpfulError};
use crate::cli::output::print_json;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, clap::Args)]
pub struct ComponentArgs {
    /// Change set to work in (created if it does not exist)
    #[arg(long, global = true)]
    pub change_set: Option<String>,

    #[command(subcommand)]
    pub action: ComponentAction,
}

#[derive(Subcommand, Debug)]
pub enum ComponentAction {
    /// Create a component from a JSON payload
    Create {
        /// Component payload, passed through unchanged
        payload: String,
    },
    /// Start a management function on a component
    Exec {
        /// Component ID
        component_id: String,

        /// Management function name
        function: String,
    },
    /// Show a management job's state and logs
    Logs {
        /// Job state ID returned by `exec`
        job_id: String,

        /// Poll until the job finishes or this many seconds pass
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
    },
}

pub fn run(args: ComponentArgs, settings: &Settings) -> anyhow::Result<()> {
    let client = context::connect_in(settings, args.change_set.as_deref())?;
    match args.action {
        ComponentAction::Create { payload } => {
            let payload: Value = serde_json::from_str(&payload)
                .map_err(|e| HelpfulError::invalid_json("component payload", &e.to_string()))?;
            let created = client.create_component(&payload).map_err(client_error)?;
            print_json(&created)?;
        }
        ComponentAction::Exec {
            component_id,
            function,
        } => {
            let component_id = ComponentId::parse(&component_id).map_err(|e| {
                HelpfulError::invalid_id("component id", &component_id, &e.to_string())
            })?;
            let job = client
                .execute_management_function(&component_id, &function)
                .map_err(client_error)?;
            println!("Management function started; job state ID: {}", job);
        }
        ComponentAction::Logs { job_id, wait } => {
            let job = JobStateId::parse(&job_id)
                .map_err(|e| HelpfulError::invalid_id("job state id", &job_id, &e.to_string()))?;
            let logs = match wait {
                Some(secs) => {
                    let deadline = wait_deadline(Instant::now(), secs);
                    let logs = poll_until_finished(deadline, POLL_INTERVAL, || {
                        client.get_logs(&job).map_err(client_error)
                    })?;
                    if !is_finished(&logs) {
                        tracing::warn!(job = %job, "Job still running after {}s", secs);
                    }
                    logs
                }
                None => client.get_logs(&job).map_err(client_error)?,
            };
            print_json(&logs)?;
        }
    }
    Ok(())
}

/// `None` means the wait is too long to represent; poll until the job ends.
fn wait_deadline(now: Instant, secs: u64) -> Option<Instant> {
    now.checked_add(Duration::from_secs(secs))
}

/// Fetch job logs until the job finishes or the deadline passes.
fn poll_until_finished<F>(
    deadline: Option<Instant>,
    interval: Duration,
    mut fetch: F,
) -> anyhow::Result<Value>
where
    F: FnMut() -> anyhow::Result<Value>,
{
    let mut logs = fetch()?;
    while !is_finished(&logs) && deadline.map_or(true, |deadline| Instant::now() < deadline) {
        tracing::debug!(state = ?job_state(&logs), "Waiting for job");
        std::thread::sleep(interval);
        logs = fetch()?;
    }
    Ok(logs)
}

fn job_state(logs: &Value) -> Option<&str> {
    logs.get("state")
        .or_else(|| logs.get("status"))
        .and_then(Value::as_str)
}

/// A job is finished once its state leaves pending/executing.
fn is_finished(logs: &Value) -> bool {
    match job_state(logs).map(str::to_ascii_lowercase).as_deref() {
        Some("success" | "succeeded" | "failure" | "failed" | "error" | "completed") => true,
        Some(_) | None => false,
    }
}
