//! `secrets-vault status` — report the vault state.

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::errors::Result;
use crate::service::VaultState;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let service = open_service(cli)?;
    let status = service.status();

    match status.state() {
        VaultState::NotInitialized => {
            output::info("Vault is not initialized.");
            output::tip("Run `secrets-vault init` to create one.");
        }
        VaultState::Locked => {
            output::info("Vault is locked.");
            output::tip("Run `secrets-vault unlock` to open it.");
        }
        VaultState::Unlocked => {
            output::success(&format!(
                "Vault is unlocked ({} remaining).",
                output::format_remaining(status.session_time_remaining)
            ));
        }
    }

    let persistence = if service.persistence_enabled() {
        "on"
    } else {
        "off"
    };
    output::info(&format!("Session persistence: {persistence}"));
    output::info(&format!("Vault directory: {}", service.vault_dir().display()));

    Ok(())
}
