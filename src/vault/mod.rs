//! Vault module — the encrypted secrets blob and its rules.
//!
//! This module provides:
//! - The on-disk `EncryptedVault` format (`format`)
//! - The in-memory `SecretsPayload` and its seal/open helpers (`payload`)
//! - File persistence for the vault and verifier (`store`)
//! - Master-password strength rules (`strength`)

pub mod format;
pub mod payload;
pub mod store;
pub mod strength;

// Re-export the most commonly used items.
pub use format::{EncryptedVault, CURRENT_VERSION};
pub use payload::{open_payload, seal_payload, OAuthCredentials, SecretsPayload, StorageCredentials};
pub use store::VaultStore;
pub use strength::{validate_strength, PasswordStrength, RuleCheck, StrengthRule};
