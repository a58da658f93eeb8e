//! Machine-bound key derivation for persisted sessions.
//!
//! The key is HKDF-SHA256 over the host's identity (hostname, platform,
//! architecture) with a random per-file salt.  Copying a persisted-session
//! file to another machine yields a different key, so the AEAD tag fails
//! and the session cannot be resumed there.
//!
//! This is a soft control.  Every input except the salt is predictable by
//! anyone who can run code on the same host, so it does not protect against
//! a co-resident attacker.  Its purpose is to let an unlocked vault survive a
//! process restart without making the session file portable.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// HKDF `info` string binding the output to this use.
const MACHINE_KEY_INFO: &[u8] = b"secrets-vault-persisted-session";

/// Stable identifiers of the host the vault runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIdentity {
    pub hostname: String,
    pub platform: String,
    pub arch: String,
}

impl MachineIdentity {
    /// Identity of the current host.
    ///
    /// Falls back to `"unknown-host"` when the hostname cannot be read; the
    /// platform and architecture are compile-time constants.
    pub fn current() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());

        Self {
            hostname,
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    fn material(&self) -> String {
        format!("{}|{}|{}", self.hostname, self.platform, self.arch)
    }
}

/// Derive the key that wraps a persisted session on this machine.
pub fn derive_machine_key(identity: &MachineIdentity, salt: &[u8]) -> Result<DerivedKey> {
    let mut ikm = identity.material().into_bytes();
    let hk = Hkdf::<Sha256>::new(Some(salt), &ikm);

    let mut okm = [0u8; KEY_LEN];
    let expanded = hk.expand(MACHINE_KEY_INFO, &mut okm);
    ikm.zeroize();
    expanded.map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    let key = DerivedKey::new(okm);
    okm.zeroize();
    Ok(key)
}
