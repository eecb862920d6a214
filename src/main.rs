//! CLI entry point for the report desk.

use anyhow::{Context, Result};
use clap::Parser;
use report_desk::{Settings, load_default_file_config};
use tracing::{debug, info};

mod app;
mod cli;

use app::{commands, runtime, terminal};
use cli::{Args, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = terminal::resolve_default_log_level(args.verbose, args.quiet);
    terminal::init_tracing(default_level);

    // Args carry the password; only log that parsing succeeded.
    debug!("CLI arguments parsed");

    let loaded = load_default_file_config()?;
    if let Some(path) = loaded.path.as_deref().filter(|_| loaded.config.is_some()) {
        info!(path = %path.display(), "loaded config file");
    }
    let settings = Settings::resolve(args.report.overrides(), loaded.config.as_ref())
        .context("Invalid settings")?;
    debug!(?settings, "settings resolved");

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => runtime::run_chat(&settings).await,
        Command::Fetch { username, password } => {
            commands::run_fetch(&settings, &username, &password).await
        }
        Command::Quick { token } => commands::run_quick(&settings, token.as_deref()).await,
    }
}
