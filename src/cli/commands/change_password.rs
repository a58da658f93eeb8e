//! `secrets-vault change-password` — rotate the master password.
//!
//! The current password is checked against the stored verifier, then the
//! secrets are re-encrypted under a new salt and key.

use crate::cli::output;
use crate::cli::{open_service, prompt_new_password, prompt_password, Cli, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `change-password` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let service = open_service(cli)?;

    output::info("Enter your current master password.");
    let current = prompt_password("Current master password")?;

    output::info("Choose your new master password.");
    let (new_password, confirm) = prompt_new_password(NEW_PASSWORD_ENV)?;

    service.change_password(&current, &new_password, &confirm)?;

    output::success("Master password changed; secrets re-encrypted.");
    Ok(())
}
