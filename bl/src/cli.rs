//! CLI argument parsing for buildlog

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::events::Verbosity;

#[derive(Parser, Debug)]
#[command(name = "bl")]
#[command(author, version, about = "Record build events as an indented transcript", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSON-lines event log through the transcript logger
    Replay {
        /// Event log to read ("-" or absent for stdin)
        events: Option<PathBuf>,

        /// Logger parameters: "<webhook URL or token>[;...]"
        #[arg(short, long)]
        parameters: Option<String>,

        /// Logger verbosity (quiet, minimal, normal, detailed, diagnostic)
        #[arg(long)]
        verbosity: Option<Verbosity>,

        /// Also post the transcript to the webhook
        #[arg(long)]
        webhook: bool,
    },

    /// Resolve logger parameters to the webhook URL
    Resolve {
        /// Logger parameters: "<webhook URL or token>[;...]"
        #[arg(required = true)]
        parameters: String,
    },

    /// Print the effective configuration
    Config,
}
