//! Cryptographic primitives for the secrets vault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption with a detached tag (`encryption`)
//! - Argon2id key derivation and master-password verifiers (`kdf`)
//! - Zeroizing key material (`keys`)
//! - Machine-bound keys for persisted sessions (`machine`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod machine;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, SealedBox};
pub use kdf::{
    derive_key, generate_salt, hash_master_password, verify_master_password, Argon2Params,
};
pub use keys::DerivedKey;
pub use machine::{derive_machine_key, MachineIdentity};
