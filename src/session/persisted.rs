//! Optional cross-restart session persistence.
//!
//! When enabled, the session key is re-encrypted under a machine-bound key
//! (see `crypto::machine`) and written to `session.json` together with its
//! own expiry.  A later process can pick the session back up with
//! `restore` as long as that expiry has not passed.
//!
//! Files inside the vault directory:
//!
//! - `persistence.json` — `{"enabled": bool}`, missing means disabled
//! - `session.json` — `{encryptedKey, nonce, authTag, salt, expiresAt}`
//!
//! Restoration is best-effort.  Expired, corrupt, or foreign-machine files
//! are deleted and reported as "nothing restored", never as an error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::manager::SessionManager;
use crate::crypto::{
    self, derive_machine_key, generate_salt, DerivedKey, MachineIdentity, SealedBox,
};
use crate::errors::{Result, VaultError};
use crate::vault::format::hex_bytes;
use crate::vault::store::{remove_if_exists, write_atomic};

/// File name of the persistence preference.
pub const PREFERENCE_FILE: &str = "persistence.json";

/// File name of the persisted session.
pub const SESSION_FILE: &str = "session.json";

/// Default lifetime of a persisted session in seconds (1 hour).
pub const DEFAULT_PERSISTED_TTL_SECS: u32 = 3_600;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistencePreference {
    enabled: bool,
}

/// On-disk form of a persisted session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(with = "hex_bytes")]
    encrypted_key: Vec<u8>,
    #[serde(with = "hex_bytes")]
    nonce: Vec<u8>,
    #[serde(with = "hex_bytes")]
    auth_tag: Vec<u8>,
    #[serde(with = "hex_bytes")]
    salt: Vec<u8>,
    /// Expiry as milliseconds since the Unix epoch.
    expires_at: i64,
}

/// Reads and writes the persisted session for one vault directory.
#[derive(Debug, Clone)]
pub struct PersistedSessionStore {
    dir: PathBuf,
    ttl: TimeDelta,
    identity: MachineIdentity,
}

impl PersistedSessionStore {
    /// Store bound to the current machine.
    pub fn new(dir: impl Into<PathBuf>, ttl: TimeDelta) -> Self {
        Self::with_identity(dir, ttl, MachineIdentity::current())
    }

    /// Store bound to an explicit machine identity.
    pub fn with_identity(
        dir: impl Into<PathBuf>,
        ttl: TimeDelta,
        identity: MachineIdentity,
    ) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            identity,
        }
    }

    pub fn preference_path(&self) -> PathBuf {
        self.dir.join(PREFERENCE_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Whether persistence is switched on.  A missing or unreadable
    /// preference file counts as disabled.
    pub fn is_enabled(&self) -> bool {
        let path = self.preference_path();
        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<PersistencePreference>(&bytes)
                .map(|p| p.enabled)
                .unwrap_or_else(|e| {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "ignoring unreadable persistence preference"
                    );
                    false
                }),
            Err(_) => false,
        }
    }

    /// Switch persistence on or off.  Turning it off deletes any
    /// persisted session immediately.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let bytes = serde_json::to_vec(&PersistencePreference { enabled })
            .map_err(|e| VaultError::SerializationError(format!("persistence preference: {e}")))?;
        write_atomic(&self.preference_path(), &bytes)?;
        if !enabled {
            self.clear()?;
        }
        info!(enabled, "session persistence updated");
        Ok(())
    }

    /// Write `key` to disk under the machine-bound key, expiring `ttl` after
    /// `now`.  Does nothing when persistence is disabled.
    pub fn persist(&self, key: &DerivedKey, now: DateTime<Utc>) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let salt = generate_salt();
        let machine_key = derive_machine_key(&self.identity, &salt)?;
        let sealed = crypto::encrypt(machine_key.as_bytes(), key.as_bytes())?;

        let record = PersistedSession {
            encrypted_key: sealed.ciphertext,
            nonce: sealed.nonce,
            auth_tag: sealed.auth_tag,
            salt: salt.to_vec(),
            expires_at: (now + self.ttl).timestamp_millis(),
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| VaultError::SerializationError(format!("persisted session: {e}")))?;
        write_atomic(&self.session_path(), &bytes)?;
        debug!(path = %self.session_path().display(), "session persisted");
        Ok(())
    }

    /// Try to resume a persisted session into `sessions`.
    ///
    /// Returns `true` only when a session was started.
    pub fn restore(&self, sessions: &SessionManager) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let path = self.session_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read persisted session");
                return false;
            }
        };

        let record: PersistedSession = match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(_) => {
                warn!(path = %path.display(), "discarding malformed persisted session");
                self.discard(&path);
                return false;
            }
        };

        if sessions.now().timestamp_millis() > record.expires_at {
            debug!(path = %path.display(), "persisted session expired");
            self.discard(&path);
            return false;
        }

        match self.unwrap_key(&record) {
            Ok(key) => {
                sessions.start(key);
                info!("session restored from disk");
                true
            }
            Err(_) => {
                warn!(
                    path = %path.display(),
                    "persisted session could not be decrypted on this machine"
                );
                self.discard(&path);
                false
            }
        }
    }

    /// Delete the persisted session.  Safe to call when none exists.
    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.session_path())
    }

    fn unwrap_key(&self, record: &PersistedSession) -> Result<DerivedKey> {
        let machine_key = derive_machine_key(&self.identity, &record.salt)?;
        let sealed = SealedBox {
            nonce: record.nonce.clone(),
            ciphertext: record.encrypted_key.clone(),
            auth_tag: record.auth_tag.clone(),
        };
        let plaintext = zeroize::Zeroizing::new(crypto::decrypt(machine_key.as_bytes(), &sealed)?);
        DerivedKey::from_slice(&plaintext)
    }

    fn discard(&self, path: &Path) {
        if let Err(e) = remove_if_exists(path) {
            warn!(error = %e, "failed to delete persisted session");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::clock::ManualClock;
    use tempfile::TempDir;

    fn identity(host: &str) -> MachineIdentity {
        MachineIdentity {
            hostname: host.to_string(),
            platform: "linux".into(),
            arch: "aarch64".into(),
        }
    }

    fn setup() -> (TempDir, PersistedSessionStore, SessionManager, Arc<ManualClock>) {
        let tmp = TempDir::new().unwrap();
        let store = PersistedSessionStore::with_identity(
            tmp.path(),
            TimeDelta::minutes(30),
            identity("host-a"),
        );
        let clock = Arc::new(ManualClock::default());
        let sessions = SessionManager::new(TimeDelta::hours(1), clock.clone());
        (tmp, store, sessions, clock)
    }

    #[test]
    fn disabled_by_default() {
        let (_tmp, store, sessions, _) = setup();
        assert!(!store.is_enabled());
        store.persist(&DerivedKey::new([1; 32]), sessions.now()).unwrap();
        assert!(!store.session_path().exists());
        assert!(!store.restore(&sessions));
    }

    #[test]
    fn persist_and_restore() {
        let (_tmp, store, sessions, _) = setup();
        store.set_enabled(true).unwrap();
        store.persist(&DerivedKey::new([7; 32]), sessions.now()).unwrap();
        assert!(store.session_path().exists());

        assert!(store.restore(&sessions));
        assert_eq!(sessions.with_active_key(|k| *k.as_bytes()), Some([7; 32]));
    }

    #[test]
    fn session_file_has_expected_fields() {
        let (_tmp, store, sessions, _) = setup();
        store.set_enabled(true).unwrap();
        store.persist(&DerivedKey::new([7; 32]), sessions.now()).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(store.session_path()).unwrap()).unwrap();
        for field in ["encryptedKey", "nonce", "authTag", "salt", "expiresAt"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert!(json["expiresAt"].is_i64());
    }

    #[test]
    fn expired_file_is_deleted() {
        let (_tmp, store, sessions, clock) = setup();
        store.set_enabled(true).unwrap();
        store.persist(&DerivedKey::new([7; 32]), sessions.now()).unwrap();

        clock.advance(TimeDelta::minutes(31));
        assert!(!store.restore(&sessions));
        assert!(!store.session_path().exists());
        assert!(!sessions.is_valid());
    }

    #[test]
    fn other_machine_cannot_restore() {
        let (tmp, store, sessions, _) = setup();
        store.set_enabled(true).unwrap();
        store.persist(&DerivedKey::new([7; 32]), sessions.now()).unwrap();

        let foreign = PersistedSessionStore::with_identity(
            tmp.path(),
            TimeDelta::minutes(30),
            identity("host-b"),
        );
        assert!(!foreign.restore(&sessions));
        assert!(!sessions.is_valid());
        assert!(!store.session_path().exists());
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let (_tmp, store, sessions, _) = setup();
        store.set_enabled(true).unwrap();
        fs::write(store.session_path(), "{ broken").unwrap();
        assert!(!store.restore(&sessions));
        assert!(!store.session_path().exists());
    }

    #[test]
    fn disabling_clears_file() {
        let (_tmp, store, sessions, _) = setup();
        store.set_enabled(true).unwrap();
        store.persist(&DerivedKey::new([7; 32]), sessions.now()).unwrap();

        store.set_enabled(false).unwrap();
        assert!(!store.is_enabled());
        assert!(!store.session_path().exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let (_tmp, store, _, _) = setup();
        store.clear().unwrap();
        store.clear().unwrap();
    }
}
