//! autoroom-replay: drive the provisioning engine from a recorded event log.
//!
//! Loads tenant policies from the AutoRoom TOML config, seeds an in-memory
//! platform with each tenant's creator resource, replays the transitions,
//! runs a final reconciliation sweep, and prints a JSON summary.
//! `--print-config` prints the effective config as JSON instead.

mod replay;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use autoroom_config::{
    config_to_json, load_config, load_from_path, validation, AutoRoomConfig, CONFIG_SCHEMA_VERSION,
};
use autoroom_engine::{AutoRoomManager, MemoryPlatform, StaticPolicyProvider};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::replay::{parse_transitions, seed_platform, Replay, ReplayError};

#[derive(Parser)]
#[command(
    name = "autoroom-replay",
    about = "Replay voice membership transitions through the AutoRoom engine"
)]
struct Args {
    /// JSON-lines file of transitions.
    #[arg(required_unless_present = "print_config")]
    events: Option<PathBuf>,

    /// Config file. Defaults to the platform config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for the autoroom targets, overriding the config.
    #[arg(long)]
    log_level: Option<String>,

    /// Run transitions through the background dispatcher instead of one by one.
    #[arg(long)]
    concurrent: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn load(args: &Args) -> Result<AutoRoomConfig, ReplayError> {
    match &args.config {
        Some(path) => {
            let config = load_from_path(path)?;
            validation::validate(&config)?;
            Ok(config)
        }
        None => Ok(load_config()?),
    }
}

async fn run(
    events: PathBuf,
    concurrent: bool,
    config: AutoRoomConfig,
) -> Result<(), ReplayError> {
    let policies = config.tenant_policies()?;
    let input = tokio::fs::read_to_string(&events).await?;
    let transitions = parse_transitions(&input)?;
    tracing::info!(
        schema_version = CONFIG_SCHEMA_VERSION,
        tenants = policies.len(),
        transitions = transitions.len(),
        "Starting replay"
    );

    let platform = Arc::new(MemoryPlatform::new());
    seed_platform(&platform, &policies).await;
    let manager = AutoRoomManager::new(
        platform.clone(),
        Arc::new(StaticPolicyProvider::from_policies(policies)),
        settings::engine_config(&config),
    );
    let replay = Replay { platform, manager };

    let summary = if concurrent {
        replay.run_concurrent(transitions).await?
    } else {
        replay.run_sequential(transitions).await?
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "Could not serialize summary"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("autoroom-replay: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        println!("{}", config_to_json(&config));
        return ExitCode::SUCCESS;
    }
    let Some(events) = args.events else {
        eprintln!("autoroom-replay: no event log given");
        return ExitCode::FAILURE;
    };

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings::log_directive(&level).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(events, args.concurrent, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Replay failed");
            ExitCode::FAILURE
        }
    }
}
