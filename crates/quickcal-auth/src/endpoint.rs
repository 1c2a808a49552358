//! The provider's token endpoint.
//!
//! [`TokenEndpoint`] is the seam between the broker and the network: the
//! interactive flow uses it to redeem an authorization code, and
//! [`AuthorizedClient`](crate::AuthorizedClient) uses it to refresh.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::ClientConfiguration;
use crate::credential::{Credential, DEFAULT_TOKEN_TYPE};
use crate::error::{AuthError, AuthResult};

/// A boxed future, so [`TokenEndpoint`] stays object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exchanges grants for credentials.
pub trait TokenEndpoint: Send + Sync {
    /// Redeems an authorization code.
    fn exchange<'a>(
        &'a self,
        config: &'a ClientConfiguration,
        code: &'a str,
    ) -> BoxFuture<'a, AuthResult<Credential>>;

    /// Mints a new access token from a refresh token.
    ///
    /// The returned credential may lack a refresh token; callers keep the
    /// one they already hold in that case.
    fn refresh<'a>(
        &'a self,
        config: &'a ClientConfiguration,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, AuthResult<Credential>>;
}

/// [`TokenEndpoint`] that POSTs form-encoded grants with `reqwest`.
///
/// Timeouts come from the injected client.
#[derive(Debug, Clone)]
pub struct HttpTokenEndpoint {
    http_client: reqwest::Client,
}

impl HttpTokenEndpoint {
    /// Creates an endpoint that sends requests through `http_client`.
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn post_grant(
        &self,
        config: &ClientConfiguration,
        params: &[(&str, &str)],
    ) -> AuthResult<Credential> {
        let grant_type = params
            .iter()
            .find(|(key, _)| *key == "grant_type")
            .map(|(_, value)| *value)
            .unwrap_or_default();
        debug!("posting {} grant to {}", grant_type, config.token_url);

        let response = self
            .http_client
            .post(&config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(params)
            .send()
            .await
            .map_err(|e| AuthError::network(format!("{} request failed: {}", grant_type, e), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::network(format!("failed to read response: {}", e), e))?;

        if !status.is_success() {
            return Err(AuthError::Authorization(describe_rejection(status, &body)));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::Authorization(format!("invalid token response: {}", e)))?;

        token.into_credential()
    }
}

impl TokenEndpoint for HttpTokenEndpoint {
    fn exchange<'a>(
        &'a self,
        config: &'a ClientConfiguration,
        code: &'a str,
    ) -> BoxFuture<'a, AuthResult<Credential>> {
        Box::pin(async move {
            let params = [
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
            ];
            let credential = self.post_grant(config, &params).await?;
            info!("exchanged authorization code for a credential");
            Ok(credential)
        })
    }

    fn refresh<'a>(
        &'a self,
        config: &'a ClientConfiguration,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, AuthResult<Credential>> {
        Box::pin(async move {
            let params = [
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
            ];
            let credential = self.post_grant(config, &params).await?;
            info!("refreshed access token");
            Ok(credential)
        })
    }
}

/// Success body of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_credential(self) -> AuthResult<Credential> {
        if self.access_token.is_empty() {
            return Err(AuthError::Authorization(
                "server response missing access_token".to_string(),
            ));
        }

        let token_type = self
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());

        let mut credential = Credential::new(self.access_token, token_type);
        if let Some(refresh_token) = self.refresh_token.filter(|t| !t.is_empty()) {
            credential = credential.with_refresh_token(refresh_token);
        }
        if let Some(secs) = self.expires_in.filter(|secs| *secs > 0) {
            let expiry = Credential::expiry_after(secs).ok_or_else(|| {
                AuthError::Authorization(format!("invalid expires_in in token response: {}", secs))
            })?;
            credential = credential.with_expiry(expiry);
        }
        Ok(credential)
    }
}

/// Error body of the token endpoint (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn describe_rejection(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(TokenErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("{} ({}): {}", error, status, description),
        Ok(TokenErrorResponse { error, .. }) => format!("{} ({})", error, status),
        Err(_) => format!("token endpoint returned {}: {}", status, body.trim()),
    }
}
