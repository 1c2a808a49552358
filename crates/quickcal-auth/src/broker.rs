//! Credential acquisition: cache first, interactive consent on a miss.
//!
//! ```text
//! resolve path ──► load cache ──ok──────────────────────────► bind client
//!                      │                                         ▲
//!                      └─ missing/corrupt ─► consent ─► save ────┘
//! ```
//!
//! Any other failure is returned to the caller unchanged; nothing here
//! retries or exits the process.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::authorizer::{Console, InteractiveAuthorizer, StdConsole};
use crate::client::AuthorizedClient;
use crate::config::ClientConfiguration;
use crate::credential::Credential;
use crate::endpoint::{HttpTokenEndpoint, TokenEndpoint};
use crate::error::{AuthResult, ErrorKind};
use crate::locator::CredentialLocator;
use crate::store::CredentialStore;

/// Where an acquired credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read from the cache file.
    Cache,
    /// Issued by the interactive flow and written to the cache file.
    Interactive,
}

/// A credential together with its cache location and origin.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub credential: Credential,
    pub path: PathBuf,
    pub source: CredentialSource,
}

/// Produces [`AuthorizedClient`]s backed by the on-disk credential cache.
pub struct TokenBroker<C> {
    locator: CredentialLocator,
    store: CredentialStore,
    authorizer: InteractiveAuthorizer<C>,
}

impl TokenBroker<StdConsole> {
    /// A broker that prompts on the terminal and redeems codes over
    /// `http_client`.
    pub fn interactive(locator: CredentialLocator, http_client: &reqwest::Client) -> Self {
        let endpoint: Arc<dyn TokenEndpoint> =
            Arc::new(HttpTokenEndpoint::new(http_client.clone()));
        Self::new(locator, InteractiveAuthorizer::new(StdConsole, endpoint))
    }
}

impl<C: Console> TokenBroker<C> {
    /// Creates a broker from its parts.
    pub fn new(locator: CredentialLocator, authorizer: InteractiveAuthorizer<C>) -> Self {
        Self {
            locator,
            store: CredentialStore::new(),
            authorizer,
        }
    }

    /// Resolves the cache path.
    pub fn cache_path(&self) -> AuthResult<PathBuf> {
        self.locator.resolve()
    }

    /// Loads the cached credential without any interaction.
    pub fn cached(&self) -> AuthResult<Credential> {
        let path = self.cache_path()?;
        self.store.load(&path)
    }

    /// Returns the cached credential, or runs the consent flow and caches
    /// its result when the cache is missing or corrupt.
    pub async fn acquire(&mut self, config: &ClientConfiguration) -> AuthResult<Acquired> {
        let path = self.cache_path()?;

        match self.store.load(&path) {
            Ok(credential) => {
                info!("using cached credential from {:?}", path);
                return Ok(Acquired {
                    credential,
                    path,
                    source: CredentialSource::Cache,
                });
            }
            Err(e) if e.is_cache_miss() => {
                if e.kind() == ErrorKind::Decode {
                    warn!("{}; starting a new authorization", e);
                } else {
                    info!("no cached credential, starting authorization");
                }
            }
            Err(e) => return Err(e),
        }

        self.authorize_into(path, config).await
    }

    /// Runs the consent flow regardless of the cache, then overwrites it.
    pub async fn reauthorize(&mut self, config: &ClientConfiguration) -> AuthResult<Acquired> {
        let path = self.cache_path()?;
        self.authorize_into(path, config).await
    }

    /// Acquires a credential and binds it to `transport`.
    pub async fn acquire_client(
        &mut self,
        transport: &reqwest::Client,
        config: &ClientConfiguration,
    ) -> AuthResult<AuthorizedClient> {
        let acquired = self.acquire(config).await?;
        Ok(self.bind(transport, config, acquired.credential))
    }

    /// Binds a credential to `transport` using this broker's token endpoint
    /// for refreshes.
    pub fn bind(
        &self,
        transport: &reqwest::Client,
        config: &ClientConfiguration,
        credential: Credential,
    ) -> AuthorizedClient {
        AuthorizedClient::new(
            transport.clone(),
            config.clone(),
            Arc::clone(self.authorizer.endpoint()),
            credential,
        )
    }

    async fn authorize_into(
        &mut self,
        path: PathBuf,
        config: &ClientConfiguration,
    ) -> AuthResult<Acquired> {
        let credential = self.authorizer.obtain(config).await?;
        self.store.save(&path, &credential)?;
        Ok(Acquired {
            credential,
            path,
            source: CredentialSource::Interactive,
        })
    }
}
