//! Per-field validation rules configured in the builder.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::FieldValue;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Password strength requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordPolicy {
    pub min_length: usize,
    #[serde(default)]
    pub require_number: bool,
    #[serde(default)]
    pub require_uppercase: bool,
    #[serde(default)]
    pub require_lowercase: bool,
    #[serde(default)]
    pub require_special_char: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_number: true,
            require_uppercase: false,
            require_lowercase: false,
            require_special_char: false,
        }
    }
}

/// What a rule checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RuleKind {
    NotEmpty,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Password(PasswordPolicy),
    /// Regex the whole value must match
    Custom(String),
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::NotEmpty => "notEmpty",
            RuleKind::MinLength(_) => "minLength",
            RuleKind::MaxLength(_) => "maxLength",
            RuleKind::Email => "email",
            RuleKind::Password(_) => "password",
            RuleKind::Custom(_) => "custom",
        }
    }

    fn default_message(&self) -> String {
        match self {
            RuleKind::NotEmpty => "must not be empty".to_string(),
            RuleKind::MinLength(n) => format!("must be at least {} characters", n),
            RuleKind::MaxLength(n) => format!("must be at most {} characters", n),
            RuleKind::Email => "must be a valid email".to_string(),
            RuleKind::Password(policy) => password_message(policy),
            RuleKind::Custom(pattern) => format!("must match pattern {}", pattern),
        }
    }
}

fn password_message(policy: &PasswordPolicy) -> String {
    let mut parts = vec![format!("at least {} characters", policy.min_length)];
    if policy.require_number {
        parts.push("a number".to_string());
    }
    if policy.require_uppercase {
        parts.push("an uppercase letter".to_string());
    }
    if policy.require_lowercase {
        parts.push("a lowercase letter".to_string());
    }
    if policy.require_special_char {
        parts.push("a special character".to_string());
    }
    format!("must contain {}", parts.join(", "))
}

/// A rule attached to a field. Disabled rules are kept but never checked.
///
/// Stored flat: `{id, type, value, message, enabled}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    pub id: String,
    #[serde(flatten)]
    pub rule: RuleKind,
    /// Custom message; when blank a message is built from the field label.
    #[serde(default)]
    pub message: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ValidationRule {
    pub fn new(rule: RuleKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rule,
            message: String::new(),
            enabled: true,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Check `value`, returning the user-facing message on failure.
    ///
    /// Callers skip rules for empty values unless the rule is `NotEmpty`.
    pub fn check(&self, label: &str, value: &FieldValue) -> Result<(), String> {
        if self.passes(value) {
            Ok(())
        } else if self.message.trim().is_empty() {
            Err(format!("{} {}", label, self.rule.default_message()))
        } else {
            Err(self.message.clone())
        }
    }

    fn passes(&self, value: &FieldValue) -> bool {
        let text = value.display_text();
        match &self.rule {
            RuleKind::NotEmpty => !text.trim().is_empty(),
            RuleKind::MinLength(n) => text.chars().count() >= *n,
            RuleKind::MaxLength(n) => text.chars().count() <= *n,
            RuleKind::Email => EMAIL_RE.is_match(&text),
            RuleKind::Password(policy) => {
                text.chars().count() >= policy.min_length
                    && (!policy.require_number || text.chars().any(|c| c.is_ascii_digit()))
                    && (!policy.require_uppercase || text.chars().any(|c| c.is_uppercase()))
                    && (!policy.require_lowercase || text.chars().any(|c| c.is_lowercase()))
                    && (!policy.require_special_char
                        || text.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()))
            }
            RuleKind::Custom(pattern) => match Regex::new(&format!("^(?:{})$", pattern)) {
                Ok(re) => re.is_match(&text),
                Err(_) => false,
            },
        }
    }
}
