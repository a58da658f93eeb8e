//! `secrets-vault unlock` — open the vault with the master password.

use crate::cli::output;
use crate::cli::{open_service, prompt_password, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `unlock` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let service = open_service(cli)?;

    let status = service.status();
    if !status.initialized {
        return Err(VaultError::NotInitialized);
    }
    if status.unlocked {
        output::info(&format!(
            "Vault is already unlocked ({} remaining).",
            output::format_remaining(status.session_time_remaining)
        ));
        return Ok(());
    }

    let password = prompt_password("Enter master password")?;
    service.unlock(&password)?;

    output::success(&format!(
        "Vault unlocked for {}",
        output::format_remaining(service.status().session_time_remaining)
    ));

    // Without persistence the session ends with this process.
    if !service.persistence_enabled() {
        output::tip("Session persistence is off; the session ends when this command exits.");
        output::tip("Run `secrets-vault persistence on` to keep it across invocations.");
    }

    Ok(())
}
