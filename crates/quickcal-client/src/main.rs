//! quickcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use quickcal_client::cli::{Cli, Command, ConfigAction};
use quickcal_client::commands;
use quickcal_client::config::ClientConfig;
use quickcal_client::error::ClientResult;
use quickcal_core::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let source = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    cli.apply_overrides(&mut config);

    init_tracing(config.tracing_config())?;

    match cli.command {
        Some(Command::Auth { force }) => commands::auth::run(force, &config).await,
        Some(Command::Token) => commands::token::run(&config).await,
        Some(Command::Status) | None => commands::status::run(&config),
        Some(Command::Get { url }) => commands::get::run(&url, &config).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &source),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&source),
        },
    }
}
