//! Authentication command.

use tracing::info;

use quickcal_auth::CredentialSource;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Makes sure a credential is cached, running the consent flow if needed.
///
/// With `force` the cached credential is ignored and replaced.
pub async fn run(force: bool, config: &ClientConfig) -> ClientResult<()> {
    let http = super::http_client(config)?;
    let (oauth, mut broker) = super::broker(config, &http)?;

    let acquired = if force {
        broker.reauthorize(&oauth).await?
    } else {
        broker.acquire(&oauth).await?
    };

    match acquired.source {
        CredentialSource::Interactive => {
            info!("authorization completed");
            println!("Saving credential file to: {}", acquired.path.display());
        }
        CredentialSource::Cache => {
            println!("Using cached credential at {}", acquired.path.display());
            println!("Use --force to authorize again.");
        }
    }

    Ok(())
}
