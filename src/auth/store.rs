//! Persisted credential and server-config storage
//!
//! The store owns two one-line plain-text files under a per-user directory:
//! the session token and an optional server URL. Both are written with
//! owner-only permissions. Paths and modes are carried by [`StoreConfig`]
//! so tests can point the store at a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::claims::decode_expiry;
use crate::constants::store as store_constants;
use crate::errors::{AuthError, AuthResult};

/// A stored bearer token with its locally decoded expiry
#[derive(Debug, Clone)]
pub struct Credential {
    /// Opaque session token presented as the Authorization bearer value
    pub token: String,
    /// Expiry as a unix timestamp in seconds, decoded from the token
    pub expiry: i64,
}

impl Credential {
    /// Whether the credential is still fresh at the given instant
    pub fn is_valid(&self, now: i64) -> bool {
        now < self.expiry
    }
}

/// Filesystem locations and permission bits for the credential store
///
/// Defaults are resolved once at startup; nothing else in the crate touches
/// global path state.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the token and config files
    pub dir: PathBuf,
    /// Path of the one-line token file
    pub token_path: PathBuf,
    /// Path of the one-line server-config file
    pub config_path: PathBuf,
}

impl StoreConfig {
    /// Resolves the per-user default locations under the home directory
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoHomeDirectory` if no home directory exists.
    pub fn resolve() -> AuthResult<Self> {
        let home = dirs::home_dir().ok_or(AuthError::NoHomeDirectory)?;
        Ok(Self::in_dir(home.join(store_constants::STORE_DIR_NAME)))
    }

    /// Builds a config rooted at an explicit directory (used by tests)
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let token_path = dir.join(store_constants::TOKEN_FILE_NAME);
        let config_path = dir.join(store_constants::CONFIG_FILE_NAME);
        Self {
            dir,
            token_path,
            config_path,
        }
    }
}

/// Credential store over the token/config file pair
///
/// The store is read by every authenticated operation and written only by
/// login. A new login overwrites the previous credential; there is no
/// explicit deletion and no local revocation tracking.
#[derive(Debug)]
pub struct CredentialStore {
    config: StoreConfig,
}

impl CredentialStore {
    /// Creates a store over the given locations
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Reads the stored credential, decoding its expiry claim
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CredentialAbsent` if the store directory or the
    /// token file does not exist, and `AuthError::MalformedToken` if the
    /// stored token cannot be decoded.
    pub fn load(&self) -> AuthResult<Credential> {
        if !self.config.dir.is_dir() || !self.config.token_path.is_file() {
            return Err(AuthError::CredentialAbsent);
        }

        let token = read_single_line(&self.config.token_path)?;
        let expiry = decode_expiry(&token)?;
        Ok(Credential { token, expiry })
    }

    /// Returns the stored token if present and not expired
    ///
    /// This is the gate every authenticated operation passes through before
    /// any network call is issued.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CredentialAbsent` or `AuthError::CredentialExpired`;
    /// both are fatal at the top level with a one-line login prompt.
    pub fn active_token(&self, now: i64) -> AuthResult<String> {
        let credential = self.load()?;
        if !credential.is_valid(now) {
            return Err(AuthError::CredentialExpired);
        }
        Ok(credential.token)
    }

    /// Persists a new token, and the server URL when one was supplied
    ///
    /// Creates the store directory if absent. Returns `true` when a server
    /// URL was written, so the caller can emit the update notice.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on any filesystem failure.
    pub fn save(&self, token: &str, server_url: Option<&str>) -> AuthResult<bool> {
        if !self.config.dir.is_dir() {
            fs::create_dir_all(&self.config.dir).map_err(|source| AuthError::Storage {
                path: self.config.dir.clone(),
                source,
            })?;
        }

        write_single_line(&self.config.token_path, token)?;

        let url_written = if let Some(url) = server_url {
            write_single_line(&self.config.config_path, url)?;
            true
        } else {
            false
        };

        #[cfg(unix)]
        self.apply_permissions(url_written)?;

        tracing::info!("Stored session token at {}", self.config.token_path.display());
        Ok(url_written)
    }

    /// Reads the persisted server URL, if any
    ///
    /// Absence is not an error; the caller falls back to the default URL.
    pub fn server_url(&self) -> Option<String> {
        if !self.config.config_path.is_file() {
            return None;
        }
        read_single_line(&self.config.config_path).ok()
    }

    /// Restricts the file pair to the owner and the directory to owner rwx
    #[cfg(unix)]
    fn apply_permissions(&self, config_written: bool) -> AuthResult<()> {
        use std::os::unix::fs::PermissionsExt;

        let set = |path: &Path, mode: u32| -> AuthResult<()> {
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
                AuthError::Storage {
                    path: path.to_path_buf(),
                    source,
                }
            })
        };

        set(&self.config.token_path, store_constants::FILE_PERMISSIONS)?;
        if config_written {
            set(&self.config.config_path, store_constants::FILE_PERMISSIONS)?;
        }
        set(&self.config.dir, store_constants::DIR_PERMISSIONS)
    }
}

/// Reads the first line of a one-line store file
fn read_single_line(path: &Path) -> AuthResult<String> {
    let contents = fs::read_to_string(path).map_err(|source| AuthError::Storage {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.lines().next().unwrap_or_default().to_string())
}

/// Writes a one-line store file without a trailing newline
fn write_single_line(path: &Path, value: &str) -> AuthResult<()> {
    fs::write(path, value).map_err(|source| AuthError::Storage {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::make_token;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(StoreConfig::in_dir(dir.path().join(".atlas")))
    }

    #[test]
    fn test_load_absent_when_directory_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let result = store.load();
        assert!(matches!(result.unwrap_err(), AuthError::CredentialAbsent));
    }

    #[test]
    fn test_load_absent_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(dir.path().join(".atlas")).unwrap();

        let result = store.load();
        assert!(matches!(result.unwrap_err(), AuthError::CredentialAbsent));
    }

    #[test]
    fn test_active_token_rejects_expired() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&make_token(1_000), None).unwrap();

        let result = store.active_token(2_000);
        assert!(matches!(result.unwrap_err(), AuthError::CredentialExpired));
    }

    #[test]
    fn test_active_token_returns_fresh_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let token = make_token(2_000);
        store.save(&token, None).unwrap();

        assert_eq!(store.active_token(1_000).unwrap(), token);
    }

    #[test]
    fn test_save_overwrites_previous_credential() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&make_token(1_000), None).unwrap();
        store.save(&make_token(3_000), None).unwrap();

        assert_eq!(store.load().unwrap().expiry, 3_000);
    }

    #[test]
    fn test_server_url_persisted_only_when_supplied() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let wrote = store.save(&make_token(2_000), None).unwrap();
        assert!(!wrote);
        assert_eq!(store.server_url(), None);

        let wrote = store
            .save(&make_token(2_000), Some("https://maps.example.com"))
            .unwrap();
        assert!(wrote);
        assert_eq!(
            store.server_url().as_deref(),
            Some("https://maps.example.com")
        );

        // A later login without a URL leaves the persisted one in place
        store.save(&make_token(2_000), None).unwrap();
        assert_eq!(
            store.server_url().as_deref(),
            Some("https://maps.example.com")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_store_permissions_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&make_token(2_000), Some("https://maps.example.com"))
            .unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&store.config.token_path), 0o600);
        assert_eq!(mode(&store.config.config_path), 0o600);
        assert_eq!(mode(&store.config.dir), 0o700);
    }
}
