//! HTTP client bound to a credential.

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ClientConfiguration;
use crate::credential::Credential;
use crate::endpoint::TokenEndpoint;
use crate::error::{AuthError, AuthResult};

/// An authenticated handle for API calls.
///
/// Requests built through [`AuthorizedClient::request`] carry a bearer
/// token that is refreshed transparently once it expires. Refreshed tokens
/// live in memory only; the cache file keeps the record written at
/// authorization time, whose refresh token stays valid.
pub struct AuthorizedClient {
    http_client: reqwest::Client,
    config: ClientConfiguration,
    endpoint: Arc<dyn TokenEndpoint>,
    credential: Mutex<Credential>,
}

impl AuthorizedClient {
    /// Binds `credential` and `config` to a transport.
    pub fn new(
        http_client: reqwest::Client,
        config: ClientConfiguration,
        endpoint: Arc<dyn TokenEndpoint>,
        credential: Credential,
    ) -> Self {
        Self {
            http_client,
            config,
            endpoint,
            credential: Mutex::new(credential),
        }
    }

    /// The client configuration this handle was built with.
    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    /// The underlying transport, without authentication applied.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// A snapshot of the current credential.
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }

    /// Returns a usable access token, refreshing it first if it expired.
    pub async fn access_token(&self) -> AuthResult<String> {
        let mut credential = self.credential.lock().await;
        if !credential.is_expired() {
            return Ok(credential.access_token.clone());
        }

        let refresh_token = credential
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AuthError::Authorization(
                    "access token expired and no refresh token is available".to_string(),
                )
            })?;

        debug!("access token expired, refreshing");
        let mut fresh = self.endpoint.refresh(&self.config, &refresh_token).await?;
        if !fresh.has_refresh_token() {
            fresh.refresh_token = Some(refresh_token);
        }

        let token = fresh.access_token.clone();
        *credential = fresh;
        Ok(token)
    }

    /// Starts a request with the bearer token applied.
    pub async fn request(&self, method: Method, url: &str) -> AuthResult<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self.http_client.request(method, url).bearer_auth(token))
    }

    /// Starts an authenticated GET.
    pub async fn get(&self, url: &str) -> AuthResult<RequestBuilder> {
        self.request(Method::GET, url).await
    }
}

impl fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("client_id", &self.config.client_id)
            .field("scopes", &self.config.scopes)
            .finish_non_exhaustive()
    }
}
