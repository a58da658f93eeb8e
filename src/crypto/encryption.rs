//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce.  The
//! authentication tag is kept detached from the ciphertext so the vault
//! file can store the three parts as separate fields:
//!
//! ```text
//! SealedBox { nonce: 12 bytes, ciphertext: len(plaintext), auth_tag: 16 bytes }
//! ```
//!
//! Every failure on the decrypt side (wrong key, tampered ciphertext or
//! tag, malformed lengths) is reported as the same `DecryptionFailed`.

use aes_gcm::aead::{AeadInPlace, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce, Tag};

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// The three outputs of one AEAD encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBox {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub auth_tag: Vec<u8>,
}

/// Encrypt `plaintext` with a 32-byte `key`.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<SealedBox> {
    // Build the cipher from the raw key bytes.
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Generate a random 12-byte nonce.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // Encrypt in place and keep the tag separate.
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok(SealedBox {
        nonce: nonce.to_vec(),
        ciphertext: buffer,
        auth_tag: tag.to_vec(),
    })
}

/// Decrypt a `SealedBox` produced by `encrypt`, verifying its tag first.
pub fn decrypt(key: &[u8], sealed: &SealedBox) -> Result<Vec<u8>> {
    if sealed.nonce.len() != NONCE_LEN || sealed.auth_tag.len() != TAG_LEN {
        return Err(VaultError::DecryptionFailed);
    }

    let nonce = Nonce::from_slice(&sealed.nonce);
    let tag = Tag::from_slice(&sealed.auth_tag);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::DecryptionFailed)?;

    let mut buffer = sealed.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(nonce, b"", &mut buffer, tag)
        .map_err(|_| VaultError::DecryptionFailed)?;

    Ok(buffer)
}
