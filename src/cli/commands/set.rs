//! `secrets-vault set` — add, update or clear one secret field.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{ensure_unlocked, open_service, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `set` command.
pub fn execute(cli: &Cli, field: &str, value: Option<&str>) -> Result<()> {
    // Determine the secret value from one of three sources.
    let secret_value = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        if !v.is_empty() {
            output::warning("Value provided on command line; it may appear in shell history.");
        }
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end().to_string())
    } else {
        // Source 3: Interactive secure prompt (default).
        let v = dialoguer::Password::new()
            .with_prompt(format!("Enter value for {field}"))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(v)
    };

    let service = open_service(cli)?;
    ensure_unlocked(&service)?;

    let mut payload = service.load_secrets()?;
    let existed = payload.get(field)?.is_some();
    payload.set(field, &secret_value)?;
    service.save_secrets(&payload)?;

    let verb = match (existed, secret_value.is_empty()) {
        (_, true) => "cleared",
        (true, false) => "updated",
        (false, false) => "added",
    };
    output::success(&format!("Secret '{field}' {verb}"));

    Ok(())
}
