//! On-disk representation of the encrypted vault.
//!
//! `vault.json` holds a single JSON object:
//!
//! ```text
//! {
//!   "version": 1,
//!   "salt": "<hex>",
//!   "nonce": "<hex>",
//!   "authTag": "<hex>",
//!   "ciphertext": "<hex>",
//!   "masterPasswordVerifier": "<salt_hex>:<hash_hex>"
//! }
//! ```
//!
//! - **Version**: format tag, bumped if the encryption scheme changes.
//! - **Salt**: KDF salt, generated once at initialization.
//! - **Nonce / authTag / ciphertext**: the AEAD output, regenerated on every
//!   save.
//! - **masterPasswordVerifier**: password check independent of the data key.

use serde::{Deserialize, Serialize};

use crate::crypto::SealedBox;

/// Current vault format version.
pub const CURRENT_VERSION: u8 = 1;

/// The single encrypted blob stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedVault {
    /// Format version.
    pub version: u8,

    /// Salt used for key derivation (hex in JSON).
    #[serde(with = "hex_bytes")]
    pub salt: Vec<u8>,

    /// Nonce of the most recent encryption (hex in JSON).
    #[serde(with = "hex_bytes")]
    pub nonce: Vec<u8>,

    /// AEAD authentication tag (hex in JSON).
    #[serde(with = "hex_bytes")]
    pub auth_tag: Vec<u8>,

    /// Encrypted serialized `SecretsPayload` (hex in JSON).
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,

    /// `"<salt_hex>:<hash_hex>"` verifier of the master password.
    pub master_password_verifier: String,
}

impl EncryptedVault {
    /// Assemble a vault from a fresh encryption result.
    pub fn from_sealed(salt: Vec<u8>, sealed: SealedBox, master_password_verifier: String) -> Self {
        Self {
            version: CURRENT_VERSION,
            salt,
            nonce: sealed.nonce,
            auth_tag: sealed.auth_tag,
            ciphertext: sealed.ciphertext,
            master_password_verifier,
        }
    }

    /// Same vault, new ciphertext.  Salt, version and verifier are kept.
    pub fn with_sealed(&self, sealed: SealedBox) -> Self {
        Self {
            version: self.version,
            salt: self.salt.clone(),
            nonce: sealed.nonce,
            auth_tag: sealed.auth_tag,
            ciphertext: sealed.ciphertext,
            master_password_verifier: self.master_password_verifier.clone(),
        }
    }

    /// The AEAD parts, ready for `crypto::decrypt`.
    pub fn sealed(&self) -> SealedBox {
        SealedBox {
            nonce: self.nonce.clone(),
            ciphertext: self.ciphertext.clone(),
            auth_tag: self.auth_tag.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for hex-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
