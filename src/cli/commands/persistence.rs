//! `secrets-vault persistence [on|off]` — toggle cross-restart sessions.

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::errors::Result;

/// Execute the `persistence` command.
pub fn execute(cli: &Cli, mode: Option<&str>) -> Result<()> {
    let service = open_service(cli)?;

    match mode {
        None => {
            let current = if service.persistence_enabled() {
                "on"
            } else {
                "off"
            };
            output::info(&format!("Session persistence is {current}."));
        }
        Some(mode) => {
            let enabled = mode == "on";
            service.set_persistence(enabled)?;
            if enabled {
                output::success("Session persistence enabled.");
                output::tip(
                    "The session key is stored on this machine until it expires or you lock.",
                );
            } else {
                output::success("Session persistence disabled; persisted session deleted.");
            }
        }
    }

    Ok(())
}
