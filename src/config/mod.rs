//! Configuration loaded from `.secrets-vault.toml`.

pub mod settings;

pub use settings::Settings;
