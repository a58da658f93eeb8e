//! `secrets-vault check-password` — show the strength rule breakdown.

use crate::cli::output;
use crate::cli::{prompt_password, Cli};
use crate::errors::Result;
use crate::vault::validate_strength;

/// Execute the `check-password` command.
pub fn execute(_cli: &Cli) -> Result<()> {
    let candidate = prompt_password("Password to check")?;
    let strength = validate_strength(&candidate);

    output::print_strength_table(&strength);
    if strength.valid {
        output::success("Password meets every rule.");
    } else {
        output::warning(&format!(
            "Password is missing: {}",
            strength.failed_rules().join(", ")
        ));
    }

    Ok(())
}
