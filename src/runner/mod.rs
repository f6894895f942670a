//! Benchmark runtime: scenario loading, the heartbeat orchestrator, tool
//! routing, and transcript output.

pub mod action_log;
pub mod handlers;
pub mod loader;
pub mod orchestrator;
pub mod prompt;
pub mod router;

use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::RunError;
use crate::llm::{ModelProvider, OpenAiCompatibleProvider};
use crate::models::runtime::{RunConfig, RunTranscript};
use crate::runner::orchestrator::Orchestrator;

/// Extra knobs for [`run_benchmark_with_provider`]; everything defaults off.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Inspection bound: stop after this many heartbeats regardless of the
    /// scenario's length. Not part of the benchmark contract.
    pub max_heartbeats: Option<usize>,
}

/// Load a scenario package and run the benchmark against the configured
/// agent model. This is the importable entry point; the CLI is a thin
/// wrapper around it.
pub async fn run_benchmark(
    scenario_dir: &Path,
    config: RunConfig,
) -> Result<RunTranscript, RunError> {
    let provider: Arc<dyn ModelProvider> =
        Arc::new(OpenAiCompatibleProvider::from_model_id(&config.agent_model)?);
    run_benchmark_with_provider(scenario_dir, config, provider, RunOptions::default()).await
}

/// Same as [`run_benchmark`] but with a caller-supplied provider (mock
/// providers in tests, instrumented providers in evaluation harnesses).
pub async fn run_benchmark_with_provider(
    scenario_dir: &Path,
    config: RunConfig,
    provider: Arc<dyn ModelProvider>,
    options: RunOptions,
) -> Result<RunTranscript, RunError> {
    // Everything is verified before the first model call.
    let scenario = Arc::new(loader::load_scenario(scenario_dir)?);
    tracing::info!(
        scenario_id = %scenario.scenario_id,
        tier = %scenario.noise_tier,
        heartbeats = scenario.heartbeats.len(),
        crisis_heartbeat_id = scenario.crisis_heartbeat_id,
        "scenario loaded"
    );

    // Per-run working memory: seeded from the package, discarded with the
    // temp dir when the run completes.
    let memory_dir = tempfile::tempdir()?;

    let mut orchestrator = Orchestrator::new(
        Arc::clone(&scenario),
        config.clone(),
        provider,
        memory_dir.path(),
    )?;
    let heartbeats = orchestrator.run(options.max_heartbeats).await?;

    Ok(RunTranscript {
        scenario_id: scenario.scenario_id.clone(),
        run_id: Uuid::new_v4().to_string(),
        run_config: config,
        heartbeats,
    })
}

/// Serialize a finished transcript to pretty JSON at `path`.
pub fn write_transcript(transcript: &RunTranscript, path: &Path) -> Result<(), RunError> {
    let json = serde_json::to_string_pretty(transcript)?;
    std::fs::write(path, json + "\n")?;
    Ok(())
}
