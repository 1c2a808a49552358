//! OAuth client configuration.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{AuthError, AuthResult};

/// Google's OAuth 2.0 consent page.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Redirect target for installed apps where the user pastes the code back.
pub const OUT_OF_BAND_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Well-known Google Calendar scopes.
pub mod scopes {
    /// Read/write access to calendars.
    pub const CALENDAR: &str = "https://www.googleapis.com/auth/calendar";
    /// Read-only access to calendars.
    pub const CALENDAR_READONLY: &str = "https://www.googleapis.com/auth/calendar.readonly";
}

/// Identifies the OAuth client and the provider it talks to.
///
/// Built once at startup and passed by reference into the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfiguration {
    /// The OAuth client ID.
    pub client_id: String,
    /// The OAuth client secret.
    pub client_secret: String,
    /// Where the provider sends the user after consent.
    pub redirect_uri: String,
    /// Scopes requested during consent.
    pub scopes: Vec<String>,
    /// Provider consent page.
    pub auth_url: String,
    /// Provider token endpoint.
    pub token_url: String,
}

/// Layout of the `client_secret.json` descriptor downloaded from the
/// Google Cloud Console.
///
/// Accepts the nested `installed`/`web` layout as well as a flat document
/// with `client_id` and `client_secret` at the root.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretSection>,
    web: Option<ClientSecretSection>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl ClientConfiguration {
    /// Creates a configuration for Google's endpoints with the out-of-band
    /// redirect.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: OUT_OF_BAND_REDIRECT.to_string(),
            scopes,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Loads a configuration from a `client_secret.json` file.
    pub fn from_file(path: impl AsRef<Path>, scopes: Vec<String>) -> AuthResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuthError::io("failed to read client secret file", path, e))?;
        Self::from_json(&content, scopes)
    }

    /// Parses a client descriptor.
    ///
    /// Endpoints and redirect target come from the descriptor when present;
    /// the first entry of `redirect_uris` is used.
    pub fn from_json(json: &str, scopes: Vec<String>) -> AuthResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(json).map_err(|e| {
            AuthError::Configuration(format!("failed to parse client secret JSON: {}", e))
        })?;

        if let Some(section) = file.installed.or(file.web) {
            let mut config = Self::new(section.client_id, section.client_secret, scopes);
            if let Some(auth_uri) = section.auth_uri {
                config.auth_url = auth_uri;
            }
            if let Some(token_uri) = section.token_uri {
                config.token_url = token_uri;
            }
            if let Some(redirect) = section.redirect_uris.into_iter().next() {
                config.redirect_uri = redirect;
            }
            return Ok(config);
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret, scopes));
        }

        Err(AuthError::Configuration(
            "client secret file must contain an 'installed'/'web' section or 'client_id'/'client_secret' at root level"
                .to_string(),
        ))
    }

    /// Sets the redirect target.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Sets the consent page URL.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Sets the token endpoint URL.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Replaces the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Checks that the configuration can drive a consent flow.
    pub fn validate(&self) -> AuthResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration("client_id is required".to_string()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(AuthError::Configuration(
                "client_secret is required".to_string(),
            ));
        }
        if self.scopes.is_empty() {
            return Err(AuthError::Configuration(
                "at least one OAuth scope is required".to_string(),
            ));
        }
        for (name, value) in [("auth_url", &self.auth_url), ("token_url", &self.token_url)] {
            Url::parse(value).map_err(|e| {
                AuthError::Configuration(format!("{} '{}' is not a valid URL: {}", name, value, e))
            })?;
        }
        Ok(())
    }
}
