//! shellgate - multi-tenant remote command shell
//!
//! Thin binary entry point: loads configuration, sets up tracing, and hands
//! the parsed command line to the CLI handlers.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use shellgate_config::ConfigManager;

mod cli;
mod main_helpers;

use cli::args::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env (non-fatal if missing)
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    let manager = ConfigManager::load(args.config.as_deref())?;
    main_helpers::initialize_tracing(manager.config());

    if let Some(path) = manager.config_path() {
        tracing::debug!(path = %path.display(), "using configuration file");
    }

    cli::run(args, manager.into_config()).await
}
