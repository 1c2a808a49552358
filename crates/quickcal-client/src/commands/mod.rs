//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod get;
pub mod status;
pub mod token;

use quickcal_auth::{ClientConfiguration, StdConsole, TokenBroker};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// User agent sent with token and API requests.
const USER_AGENT: &str = concat!("quickcal/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP transport shared by the token endpoint and API calls.
pub(crate) fn http_client(config: &ClientConfig) -> ClientResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(USER_AGENT)
        .build()?)
}

/// Builds the OAuth client configuration and a terminal-driven broker.
pub(crate) fn broker(
    config: &ClientConfig,
    http: &reqwest::Client,
) -> ClientResult<(ClientConfiguration, TokenBroker<StdConsole>)> {
    let oauth = config.oauth.to_client_configuration()?;
    let locator = config.cache.locator()?;
    Ok((oauth, TokenBroker::interactive(locator, http)))
}
