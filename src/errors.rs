use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in the secrets vault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- State machine errors ---
    #[error("Vault is not initialized — run `secrets-vault init` first")]
    NotInitialized,

    #[error("Vault is already initialized")]
    AlreadyInitialized,

    #[error("Vault is locked — unlock it with the master password")]
    VaultLocked,

    // --- Password errors ---
    #[error("Password is too weak — unmet rules: {}", .0.join(", "))]
    WeakPassword(Vec<String>),

    #[error("Password mismatch — passwords do not match")]
    PasswordMismatch,

    /// Covers both a wrong password and a corrupted vault.
    #[error("Invalid password")]
    InvalidPassword,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — authentication tag did not verify")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Storage errors ---
    #[error("Storage error at {}: {source}", path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Payload errors ---
    #[error("Unknown secret field '{0}'")]
    UnknownField(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl VaultError {
    /// Wrap an I/O error with the path of the file being accessed.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageIo {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for vault results.
pub type Result<T> = std::result::Result<T, VaultError>;
