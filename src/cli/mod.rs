//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::service::VaultService;

/// Environment variable holding the master password for scripted use.
pub const PASSWORD_ENV: &str = "SECRETS_VAULT_PASSWORD";

/// Environment variable holding the new password for `change-password`.
pub const NEW_PASSWORD_ENV: &str = "SECRETS_VAULT_NEW_PASSWORD";

/// secrets-vault CLI: password-protected credential store.
#[derive(Parser)]
#[command(
    name = "secrets-vault",
    about = "Password-protected store for storage keys, OAuth secrets and deploy tokens",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: from .secrets-vault.toml, else .secrets-vault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault protected by a master password
    Init,

    /// Unlock the vault for the session timeout
    Unlock,

    /// Lock the vault and forget any persisted session
    Lock,

    /// Permanently delete the vault and all its secrets
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show whether the vault is initialized and unlocked
    Status,

    /// Show or change cross-restart session persistence
    Persistence {
        /// New setting: on or off (omit to show the current setting)
        #[arg(value_parser = ["on", "off"])]
        mode: Option<String>,
    },

    /// Check a candidate master password against the strength rules
    CheckPassword,

    /// Show stored secrets (values masked unless --reveal)
    Show {
        /// Print secret values in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Set a secret field, e.g. `oauth.client_secret` or `deploy.netlify`
    Set {
        /// Field name
        field: String,
        /// Value (omit for interactive prompt; empty clears the field)
        value: Option<String>,
    },

    /// Change the master password
    ChangePassword,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault directory from CLI args and settings.
pub fn vault_dir(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.vault_dir {
        Some(dir) => cwd.join(dir),
        None => settings.vault_dir_path(&cwd),
    })
}

/// Build the vault service for this invocation.
pub fn open_service(cli: &Cli) -> Result<VaultService> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let dir = vault_dir(cli, &settings)?;
    Ok(VaultService::new(&dir, &settings))
}

/// Get the master password, trying in order:
/// 1. `SECRETS_VAULT_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    prompt_from_env_or_tty(PASSWORD_ENV, prompt)
}

/// Prompt for a new password and its confirmation.
///
/// Both values are returned so the vault can enforce that they match.
/// When `env_var` is set, its value is used for both.
pub fn prompt_new_password(env_var: &str) -> Result<(Zeroizing<String>, Zeroizing<String>)> {
    if let Some(pw) = env_password(env_var) {
        return Ok((pw.clone(), pw));
    }

    let password = prompt_tty("Choose master password")?;
    let confirm = prompt_tty("Confirm master password")?;
    Ok((password, confirm))
}

/// Make sure the vault is unlocked, restoring a persisted session or
/// prompting for the password as needed.
pub fn ensure_unlocked(service: &VaultService) -> Result<()> {
    let status = service.status();
    if !status.initialized {
        return Err(VaultError::NotInitialized);
    }
    if status.unlocked {
        return Ok(());
    }
    let password = prompt_password("Enter master password")?;
    service.unlock(&password)
}

fn prompt_from_env_or_tty(env_var: &str, prompt: &str) -> Result<Zeroizing<String>> {
    match env_password(env_var) {
        Some(pw) => Ok(pw),
        None => prompt_tty(prompt),
    }
}

fn env_password(env_var: &str) -> Option<Zeroizing<String>> {
    std::env::var(env_var)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn prompt_tty(prompt: &str) -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_persistence_mode() {
        let cli = Cli::try_parse_from(["secrets-vault", "persistence", "on"]).unwrap();
        match cli.command {
            Commands::Persistence { mode } => assert_eq!(mode.as_deref(), Some("on")),
            _ => panic!("wrong command"),
        }
        assert!(Cli::try_parse_from(["secrets-vault", "persistence", "maybe"]).is_err());
    }

    #[test]
    fn vault_dir_flag_is_global() {
        let cli =
            Cli::try_parse_from(["secrets-vault", "status", "--vault-dir", "/tmp/v"]).unwrap();
        assert_eq!(cli.vault_dir.as_deref(), Some("/tmp/v"));
    }
}
