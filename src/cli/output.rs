//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use std::time::Duration;

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{PasswordStrength, SecretsPayload};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Format a remaining duration as `1h 02m 03s`, dropping leading zero units.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

/// Print the per-rule strength breakdown.
pub fn print_strength_table(strength: &PasswordStrength) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Rule", "Status"]);

    for check in &strength.checks {
        let status = if check.satisfied { "ok" } else { "missing" };
        table.add_row(vec![check.rule.label().to_string(), status.to_string()]);
    }

    println!("{table}");
}

/// Print a table of secret fields, masking values unless `reveal` is set.
pub fn print_secrets_table(payload: &SecretsPayload, reveal: bool) {
    let entries = payload.entries();
    if entries.is_empty() {
        info("No secrets in this vault yet.");
        tip("Run `secrets-vault set <FIELD>` to add your first secret.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    for (name, value) in entries {
        let shown = if reveal {
            value.to_string()
        } else {
            mask(value)
        };
        table.add_row(vec![name, shown]);
    }

    println!("{table}");
}

/// Keep the last four characters of long values, hide everything else.
fn mask(value: &str) -> String {
    let count = value.chars().count();
    if count <= 8 {
        return "*".repeat(8);
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(8))
}
