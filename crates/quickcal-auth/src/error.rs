//! Error types for credential acquisition.
//!
//! Every failure the subsystem can hit is a distinct [`AuthError`] variant.
//! Components never terminate the process; the binary's `main` decides
//! what is fatal.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// High-level classification of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No cached credential file.
    NotFound,
    /// A cached credential file exists but does not decode.
    Decode,
    /// Filesystem or home-directory failure.
    Io,
    /// Console input failed or the provider refused the code.
    Authorization,
    /// The token endpoint could not be reached.
    Network,
    /// The client descriptor is missing or invalid.
    Configuration,
}

impl ErrorKind {
    /// Returns a stable snake_case name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Decode => "decode",
            Self::Io => "io",
            Self::Authorization => "authorization",
            Self::Network => "network",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while locating, loading, obtaining or saving a credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The current user's home directory could not be determined.
    #[error("unable to determine the home directory for the credential cache")]
    HomeDirUnavailable,

    /// The credential file does not exist.
    #[error("no cached credential at {}", .path.display())]
    NotFound { path: PathBuf },

    /// The credential file exists but is not a valid credential document.
    #[error("cached credential at {} is unreadable: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the cache failed.
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Prompting for or reading the authorization code failed.
    #[error("unable to read authorization code: {0}")]
    Console(#[source] std::io::Error),

    /// The provider rejected the exchange or returned an unusable token.
    #[error("unable to retrieve token from provider: {0}")]
    Authorization(String),

    /// The token endpoint request did not complete.
    #[error("token endpoint request failed: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The OAuth client descriptor is invalid.
    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

impl AuthError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn network(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::HomeDirUnavailable | Self::Io { .. } => ErrorKind::Io,
            Self::Console(_) | Self::Authorization(_) => ErrorKind::Authorization,
            Self::Network { .. } => ErrorKind::Network,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// True when the cache simply has no usable credential and the
    /// interactive flow should run instead.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::Decode)
    }
}

/// A specialized Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_miss_classification() {
        let missing = AuthError::NotFound {
            path: PathBuf::from("/tmp/x.json"),
        };
        assert!(missing.is_cache_miss());

        let corrupt = AuthError::Decode {
            path: PathBuf::from("/tmp/x.json"),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert!(corrupt.is_cache_miss());
        assert_eq!(corrupt.kind(), ErrorKind::Decode);

        let io = AuthError::io(
            "failed to write",
            Path::new("/tmp/x.json"),
            std::io::Error::other("disk full"),
        );
        assert!(!io.is_cache_miss());
        assert_eq!(io.kind(), ErrorKind::Io);
        assert!(!AuthError::HomeDirUnavailable.is_cache_miss());
    }

    #[test]
    fn console_failure_is_an_authorization_error() {
        let err = AuthError::Console(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.to_string().starts_with("unable to read authorization code"));
    }

    #[test]
    fn io_error_display_names_the_path() {
        let err = AuthError::io(
            "failed to create",
            Path::new("/home/u/.credentials/app.json"),
            std::io::Error::other("permission denied"),
        );
        let display = err.to_string();
        assert!(display.contains("failed to create"));
        assert!(display.contains("/home/u/.credentials/app.json"));
        assert!(display.contains("permission denied"));
    }

    #[test]
    fn kind_names() {
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::Authorization.to_string(), "authorization");
    }

    #[test]
    fn source_chain_is_preserved() {
        use std::error::Error;
        let err = AuthError::Console(std::io::Error::other("stdin closed"));
        assert!(err.source().is_some());
    }
}
