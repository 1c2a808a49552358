//! Resolves where the cached credential lives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};

/// Directory under the home directory that holds credential files.
pub const CREDENTIALS_DIR: &str = ".credentials";

/// Default cache file name for this application.
pub const DEFAULT_CACHE_FILE_NAME: &str = "quickcal-calendar.json";

/// Computes `<home>/.credentials/<escaped file name>`.
///
/// The home directory is injected so tests and alternative entry points
/// never depend on the ambient user. Only [`CredentialLocator::from_home_dir`]
/// consults the OS.
#[derive(Debug, Clone)]
pub struct CredentialLocator {
    home: PathBuf,
    file_name: String,
}

impl CredentialLocator {
    /// Creates a locator rooted at `home` using the default file name.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            file_name: DEFAULT_CACHE_FILE_NAME.to_string(),
        }
    }

    /// Creates a locator rooted at the current user's home directory.
    pub fn from_home_dir() -> AuthResult<Self> {
        dirs::home_dir()
            .map(Self::new)
            .ok_or(AuthError::HomeDirUnavailable)
    }

    /// Uses a different cache file name. The name is URL-escaped on resolve.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// The directory that holds the cache file.
    pub fn cache_dir(&self) -> PathBuf {
        self.home.join(CREDENTIALS_DIR)
    }

    /// Resolves the cache path, creating the cache directory if needed.
    ///
    /// Directory creation is best-effort: a failure is logged and the path is
    /// still returned, so the error surfaces when the credential is saved.
    pub fn resolve(&self) -> AuthResult<PathBuf> {
        if self.home.as_os_str().is_empty() {
            return Err(AuthError::HomeDirUnavailable);
        }

        let dir = self.cache_dir();
        if let Err(e) = create_private_dir(&dir) {
            warn!("could not create credential directory {:?}: {}", dir, e);
        }

        let path = dir.join(urlencoding::encode(&self.file_name).as_ref());
        debug!("credential cache path: {:?}", path);
        Ok(path)
    }
}

/// Creates `dir` and its parents, owner-only on Unix. An existing
/// directory is left as is.
fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir)
}
