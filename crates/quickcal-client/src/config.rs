//! Client configuration.
//!
//! All settings live in `~/.config/quickcal/config.toml` by default:
//!
//! ```toml
//! timeout = 30
//!
//! [oauth]
//! client_secret_file = "/home/me/client_secret.json"
//! scopes = ["https://www.googleapis.com/auth/calendar.readonly"]
//!
//! [cache]
//! file_name = "quickcal-calendar.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use quickcal_auth::{scopes, ClientConfiguration, CredentialLocator};
use quickcal_core::TracingConfig;

use crate::error::{ClientError, ClientResult};

/// Placeholder written instead of the client secret by `config dump`.
const REDACTED: &str = "********";

/// Configuration for the quickcal CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// HTTP timeout in seconds, for the token endpoint and API calls.
    pub timeout: u64,

    /// Debug mode, same as `--debug`.
    pub debug: bool,

    /// OAuth client settings.
    pub oauth: OAuthSettings,

    /// Credential cache settings.
    pub cache: CacheSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            debug: false,
            oauth: OAuthSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

/// OAuth client settings.
///
/// Either `client_secret_file` or both `client_id` and `client_secret` must
/// be set. Inline values win over the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    /// Path to the `client_secret.json` downloaded from the Cloud Console.
    pub client_secret_file: Option<PathBuf>,

    /// OAuth client ID.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Redirect target registered for the client.
    pub redirect_uri: Option<String>,

    /// Scopes to request.
    pub scopes: Vec<String>,

    /// Consent page override.
    pub auth_url: Option<String>,

    /// Token endpoint override.
    pub token_url: Option<String>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_secret_file: None,
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            scopes: vec![scopes::CALENDAR.to_string()],
            auth_url: None,
            token_url: None,
        }
    }
}

/// Credential cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Directory standing in for the home directory.
    pub home: Option<PathBuf>,

    /// Cache file name inside `<home>/.credentials/`.
    pub file_name: Option<String>,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quickcal")
            .join("config.toml")
    }

    /// Logging preset for this configuration.
    pub fn tracing_config(&self) -> TracingConfig {
        if self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::cli()
        }
    }

    /// HTTP timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// A copy safe to print: the client secret is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.oauth.client_secret.is_some() {
            copy.oauth.client_secret = Some(REDACTED.to_string());
        }
        copy
    }
}

impl OAuthSettings {
    /// Builds and validates the OAuth client configuration.
    pub fn to_client_configuration(&self) -> ClientResult<ClientConfiguration> {
        let scopes = self.scopes.clone();
        let mut config = match (&self.client_id, &self.client_secret, &self.client_secret_file) {
            (Some(id), Some(secret), _) => ClientConfiguration::new(id, secret, scopes),
            (None, None, Some(path)) => ClientConfiguration::from_file(path, scopes)?,
            (Some(_), None, _) | (None, Some(_), _) => {
                return Err(ClientError::Config(
                    "both client_id and client_secret are required in [oauth]".to_string(),
                ));
            }
            (None, None, None) => {
                return Err(ClientError::Config(format!(
                    "OAuth client credentials are required. Provide one of:\n  \
                     - client_secret_file in the [oauth] section of {}\n  \
                     - client_id and client_secret in the [oauth] section\n  \
                     - the --client-secret-file flag or QUICKCAL_CLIENT_SECRET_FILE",
                    ClientConfig::default_path().display()
                )));
            }
        };

        if let Some(ref redirect_uri) = self.redirect_uri {
            config = config.with_redirect_uri(redirect_uri);
        }
        if let Some(ref auth_url) = self.auth_url {
            config = config.with_auth_url(auth_url);
        }
        if let Some(ref token_url) = self.token_url {
            config = config.with_token_url(token_url);
        }

        config.validate()?;
        Ok(config)
    }
}

impl CacheSettings {
    /// Builds the credential locator, falling back to the OS home directory.
    pub fn locator(&self) -> ClientResult<CredentialLocator> {
        let locator = match self.home {
            Some(ref home) => CredentialLocator::new(home),
            None => CredentialLocator::from_home_dir()?,
        };
        Ok(match self.file_name {
            Some(ref name) => locator.with_file_name(name),
            None => locator,
        })
    }
}
