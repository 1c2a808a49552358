//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ClientConfig;

/// quickcal - authorize once, then call the calendar API from scripts
#[derive(Debug, Parser)]
#[command(name = "quickcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "QUICKCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Path to the OAuth client_secret.json
    #[arg(long, env = "QUICKCAL_CLIENT_SECRET_FILE")]
    pub client_secret_file: Option<PathBuf>,

    /// Scope to request (can be repeated; replaces configured scopes)
    #[arg(long = "scope", action = clap::ArgAction::Append)]
    pub scopes: Vec<String>,

    /// Directory used instead of the home directory for the credential cache
    #[arg(long, env = "QUICKCAL_HOME")]
    pub home: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(ref path) = self.client_secret_file {
            config.oauth.client_secret_file = Some(path.clone());
            config.oauth.client_id = None;
            config.oauth.client_secret = None;
        }
        if !self.scopes.is_empty() {
            config.oauth.scopes = self.scopes.clone();
        }
        if let Some(ref home) = self.home {
            config.cache.home = Some(home.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if self.debug {
            config.debug = true;
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Obtain a credential, prompting for consent if none is cached
    Auth {
        /// Ignore the cached credential and authorize again
        #[arg(long, short)]
        force: bool,
    },

    /// Print a current access token, refreshing it if expired
    Token,

    /// Show the credential cache state
    Status,

    /// Send an authenticated GET request and print the response body
    Get {
        /// Absolute URL of the API resource
        url: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration (secret masked)
    Dump,

    /// Validate the OAuth client configuration
    Validate,

    /// Show configuration file path
    Path,
}
