pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod service;
pub mod session;
pub mod vault;

pub use errors::{Result, VaultError};
pub use service::{VaultService, VaultState, VaultStatus};
pub use vault::{validate_strength, PasswordStrength, SecretsPayload};
