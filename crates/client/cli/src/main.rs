//! Headless script runner: loads a scenario into the simulated world and
//! drives the quest runtime until the script settles.
mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use config::CliConfig;
use runtime::{Event, RequirementEvent, Runtime, RuntimeConfig, RuntimeError, Scenario, Topic};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use quest_core::{ClockOracle, ScriptStatus, TaskReport};

/// Printed to stdout once the script settles.
#[derive(Serialize)]
struct RunSummary {
    scenario: PathBuf,
    seed: u64,
    status: ScriptStatus,
    elapsed_ms: u64,
    reports: Vec<TaskReport>,
    requirements: BTreeMap<usize, String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env().with_args(std::env::args().skip(1));

    // Keep the guard alive so buffered log lines reach the file on exit
    let _guard = setup_logging(&config)?;

    let scenario = Scenario::load_from_file(&config.scenario)
        .with_context(|| format!("loading scenario {}", config.scenario.display()))?;

    let runtime_config = RuntimeConfig {
        selection: config.selection,
        seed: config.seed,
        ..RuntimeConfig::default()
    };
    let tasks = scenario.build_tasks(&runtime_config.task_config, runtime_config.seed);
    let world = Arc::new(scenario.build_world());

    let runtime = Runtime::builder()
        .config(runtime_config)
        .tasks(tasks)
        .narrators(scenario.build_narrators())
        .build(Arc::clone(&world))
        .await?;
    let handle = runtime.handle();
    let mut requirement_rx = handle.subscribe(Topic::Requirement);

    let outcome = handle
        .run_until_settled(config.max_ticks, || world.advance_ticks(1))
        .await;

    let requirements = latest_requirement_texts(&mut requirement_rx);

    let summary = RunSummary {
        scenario: config.scenario.clone(),
        seed: config.seed,
        status: handle.status().await?,
        elapsed_ms: world.now_ms(),
        reports: handle.reports().await?,
        requirements,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    drop(handle);
    runtime.shutdown().await?;

    match outcome {
        Ok(status) => {
            tracing::info!(%status, "Script settled");
            Ok(())
        }
        Err(error @ RuntimeError::ScriptFailed { .. }) => {
            tracing::warn!(%error, "Script failed");
            Err(error.into())
        }
        Err(error) => Err(error).context("driving script"),
    }
}

/// Latest text per narrator among the buffered requirement events.
///
/// Lagging only drops superseded updates, so it skips ahead instead of stopping.
fn latest_requirement_texts(rx: &mut broadcast::Receiver<Event>) -> BTreeMap<usize, String> {
    let mut texts = BTreeMap::new();
    loop {
        match rx.try_recv() {
            Ok(Event::Requirement(RequirementEvent::RequirementUpdated {
                narrator, text, ..
            })) => {
                texts.insert(narrator, text);
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Requirement summary lagged behind");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    texts
}

/// Setup logging to both stderr and a per-session file
fn setup_logging(config: &CliConfig) -> Result<WorkerGuard> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let session_id = config.session_id.clone().unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        format!("session_{timestamp}")
    });

    let session_log_dir = config.log_root().join(&session_id);
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("creating log directory {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "quester.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/quester.log", session_log_dir.display());

    Ok(guard)
}
