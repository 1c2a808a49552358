//! CLI, configuration and subcommands
//!
//! This crate provides the `quickcal` command-line interface, a thin caller
//! of [`quickcal_auth`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
