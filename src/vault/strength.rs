//! Master-password strength rules.
//!
//! Every rule must pass for a password to be accepted.  The per-rule
//! breakdown is returned as well so a front-end can show progress as the
//! operator types.

/// Minimum master-password length in characters.
pub const MIN_PASSWORD_LEN: usize = 12;

/// One strength rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl StrengthRule {
    /// All rules, in the order they are reported.
    pub const ALL: [StrengthRule; 5] = [
        StrengthRule::MinLength,
        StrengthRule::Uppercase,
        StrengthRule::Lowercase,
        StrengthRule::Digit,
        StrengthRule::Symbol,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            StrengthRule::MinLength => "at least 12 characters",
            StrengthRule::Uppercase => "an uppercase letter",
            StrengthRule::Lowercase => "a lowercase letter",
            StrengthRule::Digit => "a digit",
            StrengthRule::Symbol => "a symbol",
        }
    }

    fn check(self, password: &str) -> bool {
        match self {
            StrengthRule::MinLength => password.chars().count() >= MIN_PASSWORD_LEN,
            StrengthRule::Uppercase => password.chars().any(char::is_uppercase),
            StrengthRule::Lowercase => password.chars().any(char::is_lowercase),
            StrengthRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
            StrengthRule::Symbol => password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        }
    }
}

/// Outcome of checking one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleCheck {
    pub rule: StrengthRule,
    pub satisfied: bool,
}

/// Result of `validate_strength`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    pub checks: Vec<RuleCheck>,
    pub valid: bool,
}

impl PasswordStrength {
    /// Labels of the rules the password does not meet.
    pub fn failed_rules(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| !c.satisfied)
            .map(|c| c.rule.label().to_string())
            .collect()
    }
}

/// Check a candidate master password against every rule.
pub fn validate_strength(password: &str) -> PasswordStrength {
    let checks: Vec<RuleCheck> = StrengthRule::ALL
        .iter()
        .map(|&rule| RuleCheck {
            rule,
            satisfied: rule.check(password),
        })
        .collect();
    let valid = checks.iter().all(|c| c.satisfied);
    PasswordStrength { checks, valid }
}
