//! In-memory unlock session.
//!
//! At most one session exists per `SessionManager`.  It holds the derived
//! data key and the time it was last started or refreshed.  Expiry is lazy:
//! nothing runs in the background, every access compares the clock against
//! `unlocked_at + timeout` and ends a stale session on the spot.
//!
//! The slot lives behind a `Mutex`, and session-backed encryption and
//! decryption run while holding it, so `end()` on one thread cannot pull
//! the key out from under a decrypt on another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::clock::Clock;
use crate::crypto::DerivedKey;
use crate::errors::{Result, VaultError};
use crate::vault::{open_payload, seal_payload, EncryptedVault, SecretsPayload};

/// Default session lifetime in seconds (1 hour).
pub const DEFAULT_SESSION_TIMEOUT_SECS: u32 = 3_600;

/// The live unlock state.
struct Session {
    key: DerivedKey,
    unlocked_at: DateTime<Utc>,
}

/// Owner of the single in-memory session.
pub struct SessionManager {
    slot: Mutex<Option<Session>>,
    timeout: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(timeout: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            timeout,
            clock,
        }
    }

    /// Current time according to this manager's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Start a session with `key`, replacing (and wiping) any previous one.
    pub fn start(&self, key: DerivedKey) {
        let mut slot = self.lock_slot();
        if let Some(mut old) = slot.take() {
            old.key.wipe();
        }
        *slot = Some(Session {
            key,
            unlocked_at: self.clock.now(),
        });
        debug!("session started");
    }

    /// `true` while a session exists and has not timed out.
    pub fn is_valid(&self) -> bool {
        let mut slot = self.lock_slot();
        self.live(&mut slot).is_some()
    }

    /// Time left before the session expires; zero when locked.
    pub fn time_remaining(&self) -> Duration {
        let mut slot = self.lock_slot();
        match self.live(&mut slot) {
            Some(session) => (session.unlocked_at + self.timeout - self.clock.now())
                .to_std()
                .unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }

    /// Extend a live session without re-deriving the key.
    ///
    /// Returns `false` if there was no live session to extend.
    pub fn refresh(&self) -> bool {
        let now = self.clock.now();
        let mut slot = self.lock_slot();
        match self.live(&mut slot) {
            Some(session) => {
                session.unlocked_at = now;
                true
            }
            None => false,
        }
    }

    /// End the session, zeroing the key bytes before releasing them.
    pub fn end(&self) {
        let mut slot = self.lock_slot();
        Self::wipe_slot(&mut slot);
    }

    /// Run `f` with the live session key, or return `None` when locked.
    pub fn with_active_key<R>(&self, f: impl FnOnce(&DerivedKey) -> R) -> Option<R> {
        let mut slot = self.lock_slot();
        self.live(&mut slot).map(|session| f(&session.key))
    }

    /// Decrypt `vault` with the session key.
    ///
    /// Fails closed with `VaultLocked` when there is no live session.
    pub fn decrypt_with_session(&self, vault: &EncryptedVault) -> Result<SecretsPayload> {
        let mut slot = self.lock_slot();
        let session = self.live(&mut slot).ok_or(VaultError::VaultLocked)?;
        open_payload(&vault.sealed(), &session.key)
    }

    /// Re-encrypt `payload` with the session key.
    ///
    /// The returned vault keeps the salt and verifier of `existing` but has a
    /// fresh nonce and tag.
    pub fn encrypt_with_session(
        &self,
        payload: &SecretsPayload,
        existing: &EncryptedVault,
    ) -> Result<EncryptedVault> {
        let mut slot = self.lock_slot();
        let session = self.live(&mut slot).ok_or(VaultError::VaultLocked)?;
        let sealed = seal_payload(payload, &session.key)?;
        Ok(existing.with_sealed(sealed))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock_slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The session if it is still within its timeout.  A stale session is
    /// wiped as a side effect.
    fn live<'a>(&self, slot: &'a mut Option<Session>) -> Option<&'a mut Session> {
        let expired = match slot.as_ref() {
            Some(session) => self.clock.now() - session.unlocked_at >= self.timeout,
            None => return None,
        };
        if expired {
            Self::wipe_slot(slot);
            debug!("session expired");
            return None;
        }
        slot.as_mut()
    }

    fn wipe_slot(slot: &mut Option<Session>) {
        if let Some(mut session) = slot.take() {
            session.key.wipe();
            debug!("session ended");
        }
    }
}
