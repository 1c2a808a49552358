//! OAuth2 Authorization Code token acquisition with a local credential cache.
//!
//! The subsystem answers one question for a command-line program: "give me
//! an HTTP client that is allowed to call the API". It does so by reading a
//! cached credential from `~/.credentials/`, and only when none is usable,
//! by walking the user through the provider's consent page once.
//!
//! ```text
//! TokenBroker ─► CredentialLocator ─► CredentialStore::load
//!       │                                   │ miss
//!       │                                   ▼
//!       │                       InteractiveAuthorizer::obtain ─► TokenEndpoint
//!       │                                   │
//!       │                                   ▼
//!       │                          CredentialStore::save
//!       ▼
//! AuthorizedClient (bearer token, refreshed on expiry)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use quickcal_auth::{ClientConfiguration, CredentialLocator, TokenBroker, scopes};
//!
//! let config = ClientConfiguration::from_file(
//!     "client_secret.json",
//!     vec![scopes::CALENDAR.to_string()],
//! )?;
//! let http = reqwest::Client::new();
//! let mut broker = TokenBroker::interactive(CredentialLocator::from_home_dir()?, &http);
//! let client = broker.acquire_client(&http, &config).await?;
//! let response = client.get("https://www.googleapis.com/calendar/v3/users/me/calendarList")
//!     .await?
//!     .send()
//!     .await?;
//! ```

pub mod authorizer;
pub mod broker;
pub mod client;
pub mod config;
pub mod credential;
pub mod endpoint;
pub mod error;
pub mod locator;
pub mod store;

pub use authorizer::{consent_url, Console, InteractiveAuthorizer, StdConsole, STATE_TOKEN};
pub use broker::{Acquired, CredentialSource, TokenBroker};
pub use client::AuthorizedClient;
pub use config::{scopes, ClientConfiguration};
pub use credential::Credential;
pub use endpoint::{BoxFuture, HttpTokenEndpoint, TokenEndpoint};
pub use error::{AuthError, AuthResult, ErrorKind};
pub use locator::{CredentialLocator, DEFAULT_CACHE_FILE_NAME};
pub use store::CredentialStore;
