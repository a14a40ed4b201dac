//! Shadow CLI - Main entry point

mod cli;
mod output;
mod picker;
mod shell;

use clap::{Parser, Subcommand};
use shadow_agent::Workspace;
use shadow_foundation::ShadowConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shadow - snapshot history for assistant-driven edits
#[derive(Parser, Debug)]
#[command(name = "shadow")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Repository to operate on
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Configuration file (defaults to the global config, if any)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Initialize local history for the repository
    Init,
    /// Snapshot the repository with a message
    Commit { message: String },
    /// Show recent snapshots
    Log,
    /// Run the assistant, then wait for its auto-commit
    Ask { prompt: String },
    /// List non-hidden files
    Files,
    /// Print a file
    Read { path: String },
    /// Write a file
    Write { path: String, content: String },
    /// Show repository, history and configuration
    Status,
    /// Interactive shell (default)
    Shell,
}

impl Command {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Commit { .. } => "commit",
            Command::Log => "log",
            Command::Ask { .. } => "ask",
            Command::Files => "files",
            Command::Read { .. } => "read",
            Command::Write { .. } => "write",
            Command::Status => "status",
            Command::Shell => "shell",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let config = match &args.config {
        Some(path) => ShadowConfig::load_from(path)?,
        None => ShadowConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}", e);
            ShadowConfig::default()
        }),
    };
    let workspace = Workspace::new(config);

    match args.command.unwrap_or(Command::Shell) {
        Command::Shell => shell::run(workspace, args.repo).await,
        command => cli::run_once(&workspace, args.repo, command).await,
    }
}
