//! Access token command.

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Prints a current access token, for use in scripts.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let http = super::http_client(config)?;
    let (oauth, mut broker) = super::broker(config, &http)?;

    let client = broker.acquire_client(&http, &oauth).await?;
    println!("{}", client.access_token().await?);
    Ok(())
}
