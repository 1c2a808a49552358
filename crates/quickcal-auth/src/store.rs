//! JSON persistence for a single credential record.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::credential::Credential;
use crate::error::{AuthError, AuthResult};

/// Reads and writes one [`Credential`] per file.
///
/// A corrupt file is reported as [`AuthError::Decode`] and left untouched;
/// deciding what to do with it is up to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialStore;

impl CredentialStore {
    /// Creates a store.
    pub fn new() -> Self {
        Self
    }

    /// Loads the credential at `path`.
    pub fn load(&self, path: &Path) -> AuthResult<Credential> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no credential file at {:?}", path);
                return Err(AuthError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(AuthError::io("failed to open", path, e)),
        };

        let credential: Credential =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                if e.is_io() {
                    AuthError::io("failed to read", path, io::Error::from(e))
                } else {
                    AuthError::Decode {
                        path: path.to_path_buf(),
                        source: e,
                    }
                }
            })?;

        debug!("loaded credential from {:?}", path);
        Ok(credential)
    }

    /// Writes `credential` to `path`, replacing any previous record.
    ///
    /// The record goes to a sibling temp file first and is renamed into
    /// place, so a failed write never leaves a half-written credential.
    pub fn save(&self, path: &Path, credential: &Credential) -> AuthResult<()> {
        let temp_path = path.with_extension("json.tmp");

        if let Err(e) = write_private(&temp_path, credential) {
            let _ = fs::remove_file(&temp_path);
            return Err(AuthError::io("failed to write", &temp_path, e));
        }

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            AuthError::io("failed to replace", path, e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
        }

        info!("saved credential to {:?}", path);
        Ok(())
    }
}

/// Creates (or truncates) `path` with owner-only permissions and writes the
/// credential as a single JSON line.
fn write_private(path: &Path, credential: &Credential) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    serde_json::to_writer(&mut file, credential)?;
    file.write_all(b"\n")?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn sample() -> Credential {
        let expiry = DateTime::parse_from_rfc3339("2030-05-06T07:08:09Z")
            .unwrap()
            .with_timezone(&Utc);
        Credential::new("ya29.access", "Bearer")
            .with_refresh_token("1//refresh")
            .with_expiry(expiry)
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.json");
        let store = CredentialStore::new();

        store.save(&path, &sample()).unwrap();
        assert_eq!(store.load(&path).unwrap(), sample());
        assert!(!dir.path().join("cred.json.tmp").exists());
    }

    #[test]
    fn save_replaces_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.json");
        let store = CredentialStore::new();

        store.save(&path, &sample()).unwrap();
        let replacement = Credential::new("second", "Bearer");
        store.save(&path, &replacement).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert_eq!(store.load(&path).unwrap(), replacement);
    }

    #[test]
    fn load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CredentialStore::new()
            .load(&dir.path().join("absent.json"))
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));
    }

    #[test]
    fn load_truncated_is_decode_and_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.json");
        fs::write(&path, r#"{"access_token":"AT1","tok"#).unwrap();

        let err = CredentialStore::new().load(&path).unwrap_err();
        assert!(matches!(err, AuthError::Decode { .. }));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"access_token":"AT1","tok"#
        );
    }

    #[test]
    fn load_wrong_schema_is_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.json");
        fs::write(&path, r#"{"token": "abc"}"#).unwrap();

        let err = CredentialStore::new().load(&path).unwrap_err();
        assert!(err.is_cache_miss());
    }

    #[test]
    fn save_into_missing_directory_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cred.json");

        let err = CredentialStore::new().save(&path, &sample()).unwrap_err();
        assert!(matches!(err, AuthError::Io { .. }));
        assert!(!err.is_cache_miss());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cred.json");
        CredentialStore::new().save(&path, &sample()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
