//! `secrets-vault init` — create a new vault protected by a master password.

use crate::cli::output;
use crate::cli::{open_service, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::{Result, VaultError};
use crate::vault::validate_strength;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let service = open_service(cli)?;

    // 1. Refuse early so the operator is not asked for a password in vain.
    if service.store().exists() {
        output::tip("Use `secrets-vault unlock` to open the existing vault.");
        return Err(VaultError::AlreadyInitialized);
    }

    // 2. Prompt for the new password and its confirmation.
    output::info("Master password: 12+ characters with upper, lower, digit and symbol.");
    let (password, confirm) = prompt_new_password(PASSWORD_ENV)?;

    // 3. Show which rules failed before handing over to the vault.
    let strength = validate_strength(&password);
    if !strength.valid {
        output::print_strength_table(&strength);
    }

    // 4. Create the vault (it starts unlocked).
    service.initialize(&password, &confirm)?;

    output::success(&format!(
        "Vault created at {}",
        service.vault_dir().display()
    ));
    output::tip("Run `secrets-vault set <FIELD>` to store a secret.");
    output::tip("Run `secrets-vault persistence on` to stay unlocked across restarts.");

    Ok(())
}
