//! Persisted API key
//!
//! The key lives in a small TOML file under a fixed key name
//! (`openRouterApiKey`), by default `~/.config/philo/credential.toml`.
//! It is read on startup to prefill the key prompt and written whenever the
//! user submits a key. The key itself never reaches the logs; use
//! `fingerprint()` when a log line needs to tell keys apart.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Env var that overrides the stored key for one run (never written back)
pub const API_KEY_ENV: &str = "PHILO_API_KEY";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(rename = "openRouterApiKey", skip_serializing_if = "Option::is_none")]
    open_router_api_key: Option<String>,
}

/// File-backed store for a single API key
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// ~/.config/philo/credential.toml (Unix-style ~/.config on all platforms)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("philo").join("credential.toml"))
    }

    pub fn default_location() -> Option<Self> {
        Self::default_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored key. A missing file or blank value is `None`.
    pub fn load(&self) -> Result<Option<String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        let file: CredentialFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        Ok(file
            .open_router_api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty()))
    }

    /// Persist `key`, replacing any previous value
    pub fn save(&self, key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = CredentialFile {
            open_router_api_key: Some(key.trim().to_string()),
        };
        let contents = toml::to_string(&file).context("Failed to encode credential")?;
        write_private(&self.path, contents.as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        tracing::info!(
            path = %self.path.display(),
            key = %fingerprint(key),
            "API key saved"
        );
        Ok(())
    }

    /// Delete the stored key. Returns false if there was nothing to delete.
    pub fn forget(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// Write a file only the owner can read. A new file is created 0600; an
/// existing one is narrowed before any bytes land in it.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

/// Short, non-reversible tag for a key: "sha256:1a2b3c4d"
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.trim().as_bytes());
    let hex: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();
    format!("sha256:{}", hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("nested").join("credential.toml"))
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("  sk-or-v1-abc  ").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("sk-or-v1-abc"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("openRouterApiKey"));
    }

    #[test]
    fn test_save_replaces_previous_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("second"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("secret").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_narrows_existing_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "openRouterApiKey = \"old\"\n").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save("fresh").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_forget_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save("secret").unwrap();

        assert!(store.forget().unwrap());
        assert!(!store.forget().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_blank_stored_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.toml");
        std::fs::write(&path, "openRouterApiKey = \"   \"\n").unwrap();
        assert_eq!(CredentialStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.toml");
        std::fs::write(&path, "openRouterApiKey = ").unwrap();
        assert!(CredentialStore::new(path).load().is_err());
    }

    #[test]
    fn test_fingerprint_is_stable_and_hides_key() {
        let a = fingerprint("sk-or-v1-secret");
        assert_eq!(a, fingerprint(" sk-or-v1-secret "));
        assert_ne!(a, fingerprint("sk-or-v1-other"));
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 8);
        assert!(!a.contains("secret"));
    }
}
