//! `secrets-vault show` — list stored secret fields.

use crate::cli::output;
use crate::cli::{ensure_unlocked, open_service, Cli};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, reveal: bool) -> Result<()> {
    let service = open_service(cli)?;
    ensure_unlocked(&service)?;

    let payload = service.load_secrets()?;
    if reveal {
        output::warning("Printing secret values in clear text.");
    }
    output::print_secrets_table(&payload, reveal);

    Ok(())
}
