use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crisisbench::models::runtime::RunConfig;
use crisisbench::models::scenario::NoiseTier;
use crisisbench::{generate_scenario, write_scenario, GenerateParams};

#[derive(Parser)]
#[command(name = "crisisbench", about = "Crisis-detection benchmark harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a scenario package.
    Generate {
        /// Crisis type (currently: cardiac_arrest).
        #[arg(long, default_value = "cardiac_arrest")]
        crisis_type: String,

        /// Noise tier (T1..T4).
        #[arg(long)]
        tier: NoiseTier,

        /// Generation seed.
        #[arg(long)]
        seed: u64,

        /// Scenario date (YYYY-MM-DD, year must be >= 2027).
        #[arg(long)]
        date: Option<chrono::NaiveDate>,

        /// Parent directory for the package.
        #[arg(long, default_value = "./scenarios")]
        out: PathBuf,
    },

    /// Run the benchmark against a scenario package.
    Run {
        /// Scenario package directory.
        #[arg(long)]
        scenario: PathBuf,

        /// Run config JSON file.
        #[arg(long)]
        config: PathBuf,

        /// Stop after N heartbeats (quick inspection runs).
        #[arg(long)]
        max_heartbeats: Option<usize>,

        /// Transcript output path.
        #[arg(long, default_value = "./transcript.json")]
        out: PathBuf,
    },

    /// Load a scenario package and verify its content hash.
    Validate {
        /// Scenario package directory.
        #[arg(long)]
        scenario: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crisisbench=info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Generate {
            crisis_type,
            tier,
            seed,
            date,
            out,
        } => {
            let mut params = GenerateParams::new(crisis_type, tier, seed);
            params.scenario_date = date;
            let package = generate_scenario(params)?;
            let dir = write_scenario(&package, &out)?;
            println!(
                "Wrote {} ({} heartbeats, crisis at {}, hash {})",
                dir.display(),
                package.heartbeats.len(),
                package.crisis_heartbeat_id,
                package.manifest.content_hash(),
            );
        }
        Commands::Run {
            scenario,
            config,
            max_heartbeats,
            out,
        } => {
            let config_text = std::fs::read_to_string(&config)?;
            let run_config: RunConfig = serde_json::from_str(&config_text)?;
            let provider: std::sync::Arc<dyn crisisbench::llm::ModelProvider> =
                std::sync::Arc::new(crisisbench::llm::OpenAiCompatibleProvider::from_model_id(
                    &run_config.agent_model,
                )?);
            let transcript = crisisbench::run_benchmark_with_provider(
                &scenario,
                run_config,
                provider,
                crisisbench::RunOptions { max_heartbeats },
            )
            .await?;
            crisisbench::runner::write_transcript(&transcript, &out)?;
            println!(
                "Run {} complete: {} heartbeats, transcript at {}",
                transcript.run_id,
                transcript.heartbeats.len(),
                out.display(),
            );
        }
        Commands::Validate { scenario } => {
            let package = crisisbench::runner::loader::load_scenario(&scenario)?;
            println!(
                "OK: {} ({} heartbeats, hash {})",
                package.scenario_id,
                package.heartbeats.len(),
                package.manifest.content_hash(),
            );
        }
    }

    Ok(())
}
