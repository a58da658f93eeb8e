use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{Result, VaultError};
use crate::session::{DEFAULT_PERSISTED_TTL_SECS, DEFAULT_SESSION_TIMEOUT_SECS};

/// Vault configuration, loaded from `.secrets-vault.toml`.
///
/// Every field has a sensible default so the vault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the working directory) holding the vault files.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Idle lifetime of an unlocked session, in seconds (default: 1 hour).
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u32,

    /// Lifetime of a persisted session, in seconds (default: 1 hour).
    #[serde(default = "default_persisted_session_ttl_secs")]
    pub persisted_session_ttl_secs: u32,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".secrets-vault".to_string()
}

fn default_session_timeout_secs() -> u32 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

fn default_persisted_session_ttl_secs() -> u32 {
    DEFAULT_PERSISTED_TTL_SECS
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            session_timeout_secs: default_session_timeout_secs(),
            persisted_session_ttl_secs: default_persisted_session_ttl_secs(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".secrets-vault.toml";

    /// Load settings from `<project_dir>/.secrets-vault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| VaultError::storage(&config_path, e))?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.session_timeout_secs == 0 {
            return Err(VaultError::ConfigError(format!(
                "{}: session_timeout_secs must be greater than zero",
                config_path.display()
            )));
        }

        Ok(settings)
    }

    /// Full path of the vault directory.
    ///
    /// Example: `project_dir/.secrets-vault`
    pub fn vault_dir_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Session lifetime as a `TimeDelta`.
    pub fn session_timeout(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.session_timeout_secs))
    }

    /// Persisted-session lifetime as a `TimeDelta`, capped at the session
    /// timeout so a persisted copy never outlives the in-memory session.
    pub fn persisted_session_ttl(&self) -> TimeDelta {
        let secs = self.persisted_session_ttl_secs.min(self.session_timeout_secs);
        TimeDelta::seconds(i64::from(secs))
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_dir, ".secrets-vault");
        assert_eq!(s.session_timeout_secs, 3_600);
        assert_eq!(s.persisted_session_ttl_secs, 3_600);
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_dir = "secrets"
session_timeout_secs = 900
persisted_session_ttl_secs = 300
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join(Settings::FILE_NAME), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, "secrets");
        assert_eq!(settings.session_timeout(), TimeDelta::minutes(15));
        assert_eq!(settings.persisted_session_ttl(), TimeDelta::minutes(5));
        assert_eq!(settings.argon2_params().memory_kib, 131_072);
        assert_eq!(settings.argon2_params().iterations, 5);
        assert_eq!(settings.argon2_params().parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(Settings::FILE_NAME),
            "session_timeout_secs = 60\n",
        )
        .unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.session_timeout_secs, 60);
        // Rest should be defaults
        assert_eq!(settings.vault_dir, ".secrets-vault");
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn persisted_ttl_is_capped_at_session_timeout() {
        let s = Settings {
            session_timeout_secs: 600,
            persisted_session_ttl_secs: 1_800,
            ..Settings::default()
        };
        assert_eq!(s.persisted_session_ttl(), TimeDelta::minutes(10));

        let shorter = Settings {
            persisted_session_ttl_secs: 120,
            ..s
        };
        assert_eq!(shorter.persisted_session_ttl(), TimeDelta::minutes(2));
    }

    #[test]
    fn load_rejects_zero_session_timeout() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(Settings::FILE_NAME),
            "session_timeout_secs = 0\n",
        )
        .unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn vault_dir_path_respects_custom_dir() {
        let s = Settings {
            vault_dir: "secrets".to_string(),
            ..Settings::default()
        };
        let project = Path::new("/srv/app");
        assert_eq!(s.vault_dir_path(project), PathBuf::from("/srv/app/secrets"));
    }
}
