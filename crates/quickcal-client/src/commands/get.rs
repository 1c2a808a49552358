//! Authenticated GET command.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Sends one authenticated GET to `url` and prints the response body.
pub async fn run(url: &str, config: &ClientConfig) -> ClientResult<()> {
    let http = super::http_client(config)?;
    let (oauth, mut broker) = super::broker(config, &http)?;

    let client = broker.acquire_client(&http, &oauth).await?;
    let response = client.get(url).await?.send().await?;
    let status = response.status();
    debug!("GET {} -> {}", url, status);

    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Request { status, body });
    }

    println!("{}", body);
    Ok(())
}
