//! Key material held in memory.
//!
//! `DerivedKey` wraps the 32-byte data-encryption key produced by the KDF
//! (or recovered from a persisted session).  Its bytes are zeroed when the
//! value is dropped, and `wipe` lets the session manager scrub them
//! explicitly before letting go of the slot.

use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of every symmetric key in the vault (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte symmetric key that zeroes its memory on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Create a new `DerivedKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Build a key from a slice, rejecting anything that is not exactly
    /// `KEY_LEN` bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| VaultError::DecryptionFailed)?;
        Ok(Self::new(array))
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Overwrite the key bytes with zeros in place.
    pub fn wipe(&mut self) {
        self.bytes.zeroize();
    }
}

// Never print key bytes, even in debug output.
impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}
