//! `secrets-vault reset` — permanently delete the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `reset` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let service = open_service(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        output::warning("This deletes every stored secret. It cannot be undone.");
        let confirmed = Confirm::new()
            .with_prompt("Reset the vault?")
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            return Err(VaultError::UserCancelled);
        }
    }

    service.reset()?;
    output::success("Vault reset. Run `secrets-vault init` to start over.");
    Ok(())
}
