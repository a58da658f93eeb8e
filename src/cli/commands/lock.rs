//! `secrets-vault lock` — end the session and delete any persisted copy.

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::errors::Result;

/// Execute the `lock` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let service = open_service(cli)?;
    service.lock()?;
    output::success("Vault locked.");
    Ok(())
}
