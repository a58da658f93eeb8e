//! File persistence for the encrypted vault.
//!
//! `VaultStore` owns two files inside the vault directory:
//!
//! - `vault.json` — the serialized `EncryptedVault`
//! - `master.verifier` — the `"<salt_hex>:<hash_hex>"` password verifier
//!
//! No decryption happens here; this layer only moves bytes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::format::{EncryptedVault, CURRENT_VERSION};
use crate::crypto::kdf::SALT_LEN;
use crate::errors::{Result, VaultError};

/// File name of the encrypted vault.
pub const VAULT_FILE: &str = "vault.json";

/// File name of the master-password verifier.
pub const VERIFIER_FILE: &str = "master.verifier";

/// Handle to the vault files inside one directory.
#[derive(Debug, Clone)]
pub struct VaultStore {
    dir: PathBuf,
}

impl VaultStore {
    /// Create a store rooted at `dir`.  Nothing is touched on disk until
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the vault files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path to `vault.json`.
    pub fn vault_path(&self) -> PathBuf {
        self.dir.join(VAULT_FILE)
    }

    /// Full path to `master.verifier`.
    pub fn verifier_path(&self) -> PathBuf {
        self.dir.join(VERIFIER_FILE)
    }

    /// Returns `true` if the vault file is present.
    pub fn exists(&self) -> bool {
        self.vault_path().is_file()
    }

    /// Write the vault to disk, replacing any previous version.
    pub fn save(&self, vault: &EncryptedVault) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(vault)
            .map_err(|e| VaultError::SerializationError(format!("vault: {e}")))?;
        write_atomic(&self.vault_path(), &bytes)
    }

    /// Read the vault from disk.
    ///
    /// A missing file is `NotInitialized`.  Unparseable content, an unknown
    /// format version or a salt of the wrong length is `InvalidVaultFormat`.
    pub fn load(&self) -> Result<EncryptedVault> {
        let path = self.vault_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(VaultError::NotInitialized),
            Err(e) => return Err(VaultError::storage(&path, e)),
        };

        let vault: EncryptedVault = serde_json::from_slice(&data)
            .map_err(|e| VaultError::InvalidVaultFormat(format!("vault JSON: {e}")))?;

        if vault.version != CURRENT_VERSION {
            return Err(VaultError::InvalidVaultFormat(format!(
                "unsupported version {}, expected {CURRENT_VERSION}",
                vault.version
            )));
        }

        if vault.salt.len() != SALT_LEN {
            return Err(VaultError::InvalidVaultFormat(format!(
                "salt is {} bytes, expected {SALT_LEN}",
                vault.salt.len()
            )));
        }

        Ok(vault)
    }

    /// Write the master-password verifier file.
    pub fn save_verifier(&self, verifier: &str) -> Result<()> {
        write_atomic(&self.verifier_path(), verifier.as_bytes())
    }

    /// Read the verifier file, or `None` if it does not exist.
    pub fn load_verifier(&self) -> Result<Option<String>> {
        let path = self.verifier_path();
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::storage(&path, e)),
        }
    }

    /// Delete the vault and verifier files.  Missing files are ignored.
    pub fn delete_all(&self) -> Result<()> {
        remove_if_exists(&self.vault_path())?;
        remove_if_exists(&self.verifier_path())?;
        Ok(())
    }
}

/// Write `bytes` to `path` **atomically**.
///
/// 1. Create the parent directory if needed.
/// 2. Write to a temp file in the same directory.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.  On Unix the
/// file is restricted to owner read/write.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| VaultError::storage(parent, e))?;
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, bytes).map_err(|e| VaultError::storage(&tmp_path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(&tmp_path, perms).map_err(|e| VaultError::storage(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| VaultError::storage(path, e))?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Remove a file, treating "not found" as success.
pub(crate) fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VaultError::storage(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> EncryptedVault {
        EncryptedVault {
            version: CURRENT_VERSION,
            salt: vec![1; 32],
            nonce: vec![2; 12],
            auth_tag: vec![3; 16],
            ciphertext: vec![4; 40],
            master_password_verifier: "ab:cd".into(),
        }
    }

    #[test]
    fn save_creates_directory_and_loads_back() {
        let tmp = TempDir::new().unwrap();
        let store = VaultStore::new(tmp.path().join("nested").join("vault"));
        assert!(!store.exists());

        store.save(&sample()).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let tmp = TempDir::new().unwrap();
        let store = VaultStore::new(tmp.path());
        assert!(matches!(store.load(), Err(VaultError::NotInitialized)));
    }

    #[test]
    fn load_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let store = VaultStore::new(tmp.path());
        fs::write(store.vault_path(), "not json").unwrap();
        assert!(matches!(
            store.load(),
            Err(VaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn load_rejects_unknown_version() {
        let tmp = TempDir::new().unwrap();
        let store = VaultStore::new(tmp.path());
        let mut vault = sample();
        vault.version = 9;
        store.save(&vault).unwrap();
        assert!(matches!(
            store.load(),
            Err(VaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn load_rejects_wrong_salt_length() {
        let tmp = TempDir::new().unwrap();
        let store = VaultStore::new(tmp.path());
        let mut vault = sample();
        vault.salt = vec![0xAB, 0xCD];
        store.save(&vault).unwrap();
        assert!(matches!(
            store.load(),
            Err(VaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn verifier_roundtrip_and_delete_all() {
        let tmp = TempDir::new().unwrap();
        let store = VaultStore::new(tmp.path());
        assert_eq!(store.load_verifier().unwrap(), None);

        store.save(&sample()).unwrap();
        store.save_verifier("aa:bb").unwrap();
        assert_eq!(store.load_verifier().unwrap().as_deref(), Some("aa:bb"));

        store.delete_all().unwrap();
        assert!(!store.exists());
        assert_eq!(store.load_verifier().unwrap(), None);

        // Second delete is a no-op.
        store.delete_all().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let store = VaultStore::new(tmp.path());
        store.save(&sample()).unwrap();
        let mode = fs::metadata(store.vault_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
