use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use buildlog::cli::{Cli, Command};
use buildlog::config::Config;
use buildlog::{BuildEvent, EventBus, TranscriptLogger, Verbosity, read_events, resolve_endpoint};

fn setup_logging(verbose: bool) -> Result<()> {
    // Diagnostics go to stderr; stdout carries only the transcript
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("buildlog starting");

    match cli.command {
        Command::Replay {
            events,
            parameters,
            verbosity,
            webhook,
        } => cmd_replay(&config, events, parameters, verbosity, webhook).await,
        Command::Resolve { parameters } => {
            let url = resolve_endpoint(Some(parameters.as_str()), &config.webhook.base_url)?;
            println!("{} {}", "✓".green(), url);
            Ok(())
        }
        Command::Config => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

/// Drive a transcript logger with a recorded event log
async fn cmd_replay(
    config: &Config,
    events: Option<PathBuf>,
    parameters: Option<String>,
    verbosity: Option<Verbosity>,
    webhook: bool,
) -> Result<()> {
    let mut settings = config.recorder_settings();
    settings.webhook_enabled |= webhook;

    let logger = TranscriptLogger::new(parameters, verbosity.unwrap_or(config.verbosity), settings);
    let mut bus = EventBus::new();
    bus.register(Box::new(logger)).context("Logger initialization failed")?;

    let events = load_events(events.as_deref())?;
    info!(count = events.len(), "Replaying events");
    for event in &events {
        bus.emit(event);
    }

    bus.shutdown().await.context("Failed to deliver transcript")?;
    Ok(())
}

fn load_events(path: Option<&Path>) -> Result<Vec<BuildEvent>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).context(format!("Failed to open event log {}", path.display()))?;
            read_events(BufReader::new(file))
        }
        _ => read_events(std::io::stdin().lock()),
    }
}
