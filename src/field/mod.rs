//! Field model: the closed set of field types and the per-field configuration.

mod rules;
mod value;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use rules::{PasswordPolicy, RuleKind, ValidationRule};
pub use value::FieldValue;

/// Stable identifier of a field, unique within a form.
pub type FieldId = String;

/// Every kind of field a form can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Derived,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::Derived,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Derived => "derived",
        }
    }

    /// Capitalized name, as used in generated labels.
    pub fn title(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Textarea => "Textarea",
            FieldType::Select => "Select",
            FieldType::Radio => "Radio",
            FieldType::Checkbox => "Checkbox",
            FieldType::Date => "Date",
            FieldType::Derived => "Derived",
        }
    }

    /// Label of the palette button that adds this type.
    pub fn palette_label(&self) -> &'static str {
        match self {
            FieldType::Derived => "Derived Field",
            other => other.title(),
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, FieldType::Derived)
    }

    /// Placeholder text for types that show one.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            FieldType::Text | FieldType::Textarea => Some("Enter text..."),
            FieldType::Number => Some("Enter number..."),
            FieldType::Select
            | FieldType::Radio
            | FieldType::Checkbox
            | FieldType::Date
            | FieldType::Derived => None,
        }
    }

    pub fn supports_rule(&self, rule: &RuleKind) -> bool {
        match self {
            FieldType::Text => true,
            FieldType::Number => matches!(
                rule,
                RuleKind::NotEmpty | RuleKind::MinLength(_) | RuleKind::MaxLength(_)
            ),
            FieldType::Textarea => matches!(
                rule,
                RuleKind::NotEmpty
                    | RuleKind::MinLength(_)
                    | RuleKind::MaxLength(_)
                    | RuleKind::Custom(_)
            ),
            FieldType::Select | FieldType::Radio | FieldType::Checkbox | FieldType::Date => {
                matches!(rule, RuleKind::NotEmpty)
            }
            FieldType::Derived => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        FieldType::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| format!("unknown field type '{}'", s))
    }
}

/// One configured input (or computed output) of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Ignored for derived fields.
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "FieldValue::is_empty")]
    pub default_value: FieldValue,
    /// Select and radio only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Derived only: ids of the fields the formula reads.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_fields: Vec<FieldId>,
    /// Derived only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub computation_formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_rules: Vec<ValidationRule>,
    #[serde(default)]
    pub order: i64,
}

impl Field {
    /// A bare field with no type-specific defaults. See `builder::new_field`
    /// for the palette's version.
    pub fn new(id: impl Into<FieldId>, label: impl Into<String>, kind: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
            default_value: FieldValue::Empty,
            options: Vec::new(),
            parent_fields: Vec::new(),
            computation_formula: String::new(),
            placeholder: None,
            help_text: None,
            validation_rules: Vec::new(),
            order: 0,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.kind.is_derived()
    }

    /// `required` as it applies to validation; always false for derived fields.
    pub fn is_required(&self) -> bool {
        self.required && !self.is_derived()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_formula<I, S>(mut self, formula: impl Into<String>, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldId>,
    {
        self.computation_formula = formula.into();
        self.parent_fields = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Value a live preview starts with.
    pub fn initial_value(&self) -> FieldValue {
        match self.kind {
            FieldType::Derived => FieldValue::Empty,
            _ => self.default_value.clone(),
        }
    }
}
