//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Parameters are configurable via `Argon2Params`
//! (loaded from `.secrets-vault.toml` or sensible defaults).
//!
//! The same primitive also produces the master-password verifier, a
//! `"<salt_hex>:<hash_hex>"` string that lets the vault check a password
//! without touching the encrypted payload.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Prefix mixed into the password when computing the verifier so the
/// verifier hash can never equal the data-encryption key.
const VERIFIER_DOMAIN: &[u8] = b"secrets-vault-verifier:";

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Derive a 32-byte key from a password and salt.
///
/// The same password + salt + params will always produce the same key.
/// Enforces minimum Argon2 parameters to prevent dangerously weak KDF settings.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<DerivedKey> {
    let mut bytes = derive_raw(password, salt, argon2_params)?;
    let key = DerivedKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

fn derive_raw(password: &[u8], salt: &[u8], argon2_params: &Argon2Params) -> Result<[u8; KEY_LEN]> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(VaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Hash the master password into a verifier string `"<salt_hex>:<hash_hex>"`.
///
/// A fresh salt is generated on every call, independent of the vault salt.
pub fn hash_master_password(password: &[u8], argon2_params: &Argon2Params) -> Result<String> {
    let salt = generate_salt();
    let mut hash = verifier_hash(password, &salt, argon2_params)?;
    let encoded = format!("{}:{}", hex::encode(salt), hex::encode(hash));
    hash.zeroize();
    Ok(encoded)
}

/// Check `password` against a verifier produced by `hash_master_password`.
///
/// Malformed verifier strings simply fail verification.
pub fn verify_master_password(
    password: &[u8],
    verifier: &str,
    argon2_params: &Argon2Params,
) -> Result<bool> {
    let Some((salt_hex, hash_hex)) = verifier.trim().split_once(':') else {
        return Ok(false);
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return Ok(false);
    };
    if salt.len() != SALT_LEN || expected.len() != KEY_LEN {
        return Ok(false);
    }

    let mut actual = verifier_hash(password, &salt, argon2_params)?;
    let matches: bool = actual.as_slice().ct_eq(expected.as_slice()).into();
    actual.zeroize();
    Ok(matches)
}

fn verifier_hash(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<[u8; KEY_LEN]> {
    let mut input = Vec::with_capacity(VERIFIER_DOMAIN.len() + password.len());
    input.extend_from_slice(VERIFIER_DOMAIN);
    input.extend_from_slice(password);
    let hash = derive_raw(&input, salt, argon2_params);
    input.zeroize();
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let k1 = derive_key(b"password", &salt, &fast()).unwrap();
        let k2 = derive_key(b"password", &salt, &fast()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn empty_password_is_accepted() {
        let salt = generate_salt();
        assert!(derive_key(b"", &salt, &fast()).is_ok());
    }

    #[test]
    fn rejects_weak_params() {
        let params = Argon2Params {
            memory_kib: 1024,
            ..fast()
        };
        let result = derive_key(b"pw", &generate_salt(), &params);
        assert!(matches!(result, Err(VaultError::KeyDerivationFailed(_))));
    }

    #[test]
    fn verifier_roundtrip() {
        let verifier = hash_master_password(b"Str0ng!Passw0rd", &fast()).unwrap();
        let (salt, hash) = verifier.split_once(':').unwrap();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(hash.len(), KEY_LEN * 2);

        assert!(verify_master_password(b"Str0ng!Passw0rd", &verifier, &fast()).unwrap());
        assert!(!verify_master_password(b"wrong", &verifier, &fast()).unwrap());
    }

    #[test]
    fn verifier_differs_from_data_key() {
        let verifier = hash_master_password(b"pw", &fast()).unwrap();
        let (salt_hex, hash_hex) = verifier.split_once(':').unwrap();
        let salt = hex::decode(salt_hex).unwrap();
        let key = derive_key(b"pw", &salt, &fast()).unwrap();
        assert_ne!(hex::encode(key.as_bytes()), hash_hex);
    }

    #[test]
    fn malformed_verifier_fails_closed() {
        assert!(!verify_master_password(b"pw", "no-colon", &fast()).unwrap());
        assert!(!verify_master_password(b"pw", "zz:zz", &fast()).unwrap());
        assert!(!verify_master_password(b"pw", "ab:cd", &fast()).unwrap());
    }

    #[test]
    fn truncated_verifier_hash_fails_closed() {
        let verifier = hash_master_password(b"pw", &fast()).unwrap();
        let truncated = &verifier[..verifier.len() - 2];
        assert!(!verify_master_password(b"pw", truncated, &fast()).unwrap());
    }
}
