//! Live and default values of form fields.

use serde::{Deserialize, Serialize};

use super::FieldType;
use crate::formula::format_number;

/// The value a field holds: in the live preview, or as its configured default.
///
/// Serialized as plain JSON: `null`, a boolean, a number or a string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// True for no value and for the empty string. `0`, `false` and
    /// whitespace are values.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Empty => false,
        }
    }

    /// Text shown in an input control.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// The text substituted for this value inside a formula.
    ///
    /// Missing, empty and `false` values count as `0`, `true` as `1`.
    pub fn formula_operand(&self) -> String {
        match self {
            FieldValue::Empty | FieldValue::Bool(false) => "0".to_string(),
            FieldValue::Bool(true) => "1".to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) if s.is_empty() => "0".to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Coerce raw editor or command-line input into a value for `kind`.
    ///
    /// Numbers that do not parse to a finite value are kept as text so
    /// validation and formulas see exactly what was typed.
    pub fn from_input(kind: FieldType, raw: &str) -> Self {
        match kind {
            FieldType::Number => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    FieldValue::Empty
                } else {
                    match trimmed.parse::<f64>() {
                        Ok(n) if n.is_finite() => FieldValue::Number(n),
                        _ => FieldValue::text(raw),
                    }
                }
            }
            FieldType::Checkbox => FieldValue::Bool(matches!(
                raw.trim().to_lowercase().as_str(),
                "true" | "1" | "yes" | "on" | "checked"
            )),
            FieldType::Derived => FieldValue::Empty,
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Select
            | FieldType::Radio
            | FieldType::Date => FieldValue::text(raw),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}
