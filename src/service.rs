//! The vault facade and its state machine.
//!
//! ```text
//! NotInitialized --initialize--> Unlocked <--unlock/lock--> Locked
//!        ^                           |                        |
//!        +----------- reset ---------+------------------------+
//! ```
//!
//! `VaultService` owns the session state; there is no process-wide
//! singleton.  Callers hold one service per vault directory and pass it by
//! reference.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Settings;
use crate::crypto::{
    derive_key, generate_salt, hash_master_password, verify_master_password, Argon2Params,
    DerivedKey,
};
use crate::errors::{Result, VaultError};
use crate::session::{Clock, PersistedSessionStore, SessionManager, SystemClock};
use crate::vault::{
    open_payload, seal_payload, validate_strength, EncryptedVault, SecretsPayload, VaultStore,
};

/// Coarse lifecycle state of the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    NotInitialized,
    Locked,
    Unlocked,
}

/// Snapshot returned by `VaultService::status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultStatus {
    pub initialized: bool,
    pub unlocked: bool,
    pub session_time_remaining: Duration,
}

impl VaultStatus {
    pub fn state(&self) -> VaultState {
        match (self.initialized, self.unlocked) {
            (false, _) => VaultState::NotInitialized,
            (true, false) => VaultState::Locked,
            (true, true) => VaultState::Unlocked,
        }
    }
}

/// Single-tenant secrets vault.
pub struct VaultService {
    store: VaultStore,
    sessions: SessionManager,
    persisted: PersistedSessionStore,
    kdf: Argon2Params,
}

impl VaultService {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Service for the vault in `dir`, using the system clock and the
    /// current machine's identity.
    pub fn new(dir: &Path, settings: &Settings) -> Self {
        Self::with_clock(dir, settings, Arc::new(SystemClock))
    }

    /// Same as `new` with an explicit clock.
    pub fn with_clock(dir: &Path, settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(
            VaultStore::new(dir),
            SessionManager::new(settings.session_timeout(), clock),
            PersistedSessionStore::new(dir, settings.persisted_session_ttl()),
            settings.argon2_params(),
        )
    }

    /// Assemble a service from its components.
    pub fn from_parts(
        store: VaultStore,
        sessions: SessionManager,
        persisted: PersistedSessionStore,
        kdf: Argon2Params,
    ) -> Self {
        Self {
            store,
            sessions,
            persisted,
            kdf,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create the vault with an empty payload and leave it unlocked.
    pub fn initialize(&self, password: &str, confirm_password: &str) -> Result<()> {
        if password != confirm_password {
            return Err(VaultError::PasswordMismatch);
        }
        let strength = validate_strength(password);
        if !strength.valid {
            return Err(VaultError::WeakPassword(strength.failed_rules()));
        }
        if self.store.exists() {
            return Err(VaultError::AlreadyInitialized);
        }

        let salt = generate_salt();
        let key = derive_key(password.as_bytes(), &salt, &self.kdf)?;
        let verifier = hash_master_password(password.as_bytes(), &self.kdf)?;
        let sealed = seal_payload(&SecretsPayload::default(), &key)?;
        let vault = EncryptedVault::from_sealed(salt.to_vec(), sealed, verifier.clone());

        self.store.save(&vault)?;
        self.store.save_verifier(&verifier)?;
        self.begin_session(key);

        info!(dir = %self.store.dir().display(), "vault initialized");
        Ok(())
    }

    /// Unlock with the master password.
    ///
    /// A wrong password and a damaged vault file both report
    /// `InvalidPassword`.
    pub fn unlock(&self, password: &str) -> Result<()> {
        let vault = match self.store.load() {
            Ok(vault) => vault,
            Err(VaultError::InvalidVaultFormat(_)) => {
                warn!("unlock rejected");
                return Err(VaultError::InvalidPassword);
            }
            Err(e) => return Err(e),
        };

        let key = derive_key(password.as_bytes(), &vault.salt, &self.kdf)?;
        if open_payload(&vault.sealed(), &key).is_err() {
            warn!("unlock rejected");
            return Err(VaultError::InvalidPassword);
        }

        self.begin_session(key);
        info!("vault unlocked");
        Ok(())
    }

    /// End the session and forget any persisted copy.  Calling it on a
    /// locked vault is a no-op.
    pub fn lock(&self) -> Result<()> {
        self.sessions.end();
        self.persisted.clear()?;
        info!("vault locked");
        Ok(())
    }

    /// Destroy the vault unconditionally.  Irreversible.
    pub fn reset(&self) -> Result<()> {
        self.sessions.end();
        self.persisted.clear()?;
        self.store.delete_all()?;
        warn!(dir = %self.store.dir().display(), "vault reset");
        Ok(())
    }

    /// Current state.  If the in-memory session is gone, a persisted session
    /// is restored first when one is available.
    pub fn status(&self) -> VaultStatus {
        let initialized = self.store.exists();
        if initialized {
            self.restore_if_needed();
        }
        let unlocked = initialized && self.sessions.is_valid();
        VaultStatus {
            initialized,
            unlocked,
            session_time_remaining: if unlocked {
                self.sessions.time_remaining()
            } else {
                Duration::ZERO
            },
        }
    }

    /// Shorthand for `status().state()`.
    pub fn state(&self) -> VaultState {
        self.status().state()
    }

    /// Change the master password.
    ///
    /// The current password is checked against the stored verifier before
    /// anything is decrypted.  The payload is then re-encrypted under a new
    /// salt and key, and the session continues under the new key.
    pub fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        if new_password != confirm_password {
            return Err(VaultError::PasswordMismatch);
        }
        let strength = validate_strength(new_password);
        if !strength.valid {
            return Err(VaultError::WeakPassword(strength.failed_rules()));
        }

        let vault = self.store.load().map_err(|e| match e {
            VaultError::InvalidVaultFormat(_) => VaultError::InvalidPassword,
            other => other,
        })?;
        let verifier = self
            .store
            .load_verifier()?
            .unwrap_or_else(|| vault.master_password_verifier.clone());
        if !verify_master_password(current_password.as_bytes(), &verifier, &self.kdf)? {
            warn!("password change rejected");
            return Err(VaultError::InvalidPassword);
        }

        let old_key = derive_key(current_password.as_bytes(), &vault.salt, &self.kdf)?;
        let payload =
            open_payload(&vault.sealed(), &old_key).map_err(|_| VaultError::InvalidPassword)?;

        let salt = generate_salt();
        let new_key = derive_key(new_password.as_bytes(), &salt, &self.kdf)?;
        let new_verifier = hash_master_password(new_password.as_bytes(), &self.kdf)?;
        let sealed = seal_payload(&payload, &new_key)?;
        let rotated = EncryptedVault::from_sealed(salt.to_vec(), sealed, new_verifier.clone());

        self.store.save(&rotated)?;
        self.store.save_verifier(&new_verifier)?;
        self.begin_session(new_key);

        info!("master password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence toggle
    // ------------------------------------------------------------------

    /// Turn session persistence on or off.  Disabling deletes the persisted
    /// session right away; enabling while unlocked persists the live session.
    pub fn set_persistence(&self, enabled: bool) -> Result<()> {
        self.persisted.set_enabled(enabled)?;
        if enabled {
            self.persist_best_effort();
        }
        Ok(())
    }

    /// Whether session persistence is switched on.
    pub fn persistence_enabled(&self) -> bool {
        self.persisted.is_enabled()
    }

    // ------------------------------------------------------------------
    // Session-backed crypto
    // ------------------------------------------------------------------

    /// Decrypt `vault` with the session key; refreshes the session on success.
    pub fn decrypt_with_session(&self, vault: &EncryptedVault) -> Result<SecretsPayload> {
        let payload = self.sessions.decrypt_with_session(vault)?;
        self.sessions.refresh();
        Ok(payload)
    }

    /// Re-encrypt `payload` for `existing`; refreshes the session on success.
    pub fn encrypt_with_session(
        &self,
        payload: &SecretsPayload,
        existing: &EncryptedVault,
    ) -> Result<EncryptedVault> {
        let vault = self.sessions.encrypt_with_session(payload, existing)?;
        self.sessions.refresh();
        Ok(vault)
    }

    /// Load and decrypt the stored secrets.
    pub fn load_secrets(&self) -> Result<SecretsPayload> {
        let vault = self.store.load()?;
        self.restore_if_needed();
        self.decrypt_with_session(&vault)
    }

    /// Encrypt and store `payload`, replacing the current secrets.
    pub fn save_secrets(&self, payload: &SecretsPayload) -> Result<()> {
        let existing = self.store.load()?;
        self.restore_if_needed();
        let updated = self.encrypt_with_session(payload, &existing)?;
        self.store.save(&updated)?;
        info!("secrets updated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Directory holding the vault files.
    pub fn vault_dir(&self) -> PathBuf {
        self.store.dir().to_path_buf()
    }

    /// The underlying file store.
    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn begin_session(&self, key: DerivedKey) {
        self.sessions.start(key);
        self.persist_best_effort();
    }

    fn persist_best_effort(&self) {
        let now = self.sessions.now();
        let result = self
            .sessions
            .with_active_key(|key| self.persisted.persist(key, now));
        if let Some(Err(e)) = result {
            warn!(error = %e, "could not persist session");
        }
    }

    fn restore_if_needed(&self) {
        if !self.sessions.is_valid() {
            self.persisted.restore(&self.sessions);
        }
    }
}
