//! Render model: what each field of a previewed form shows.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::derived::{compute_derived, DerivedValue};
use crate::field::{Field, FieldId, FieldType, FieldValue};

/// The input control for one field, with its current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum Control {
    TextInput {
        value: String,
        placeholder: Option<String>,
    },
    NumberInput {
        value: String,
        placeholder: Option<String>,
    },
    TextArea {
        value: String,
        placeholder: Option<String>,
    },
    Select {
        options: Vec<String>,
        selected: Option<String>,
    },
    RadioGroup {
        options: Vec<String>,
        selected: Option<String>,
    },
    Checkbox {
        checked: bool,
    },
    DateInput {
        value: String,
    },
    /// Read-only computed value.
    Computed {
        #[serde(skip)]
        result: DerivedValue,
        display: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub id: FieldId,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub control: Control,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Render one field from the live values of its form.
pub fn render_field(
    field: &Field,
    fields: &[Field],
    values: &IndexMap<FieldId, FieldValue>,
    error: Option<&String>,
) -> RenderedField {
    let value = values.get(&field.id).cloned().unwrap_or_default();
    let text = value.display_text();
    let selected = (!text.is_empty()).then(|| text.clone());

    let control = match field.kind {
        FieldType::Text => Control::TextInput {
            value: text,
            placeholder: field.placeholder.clone(),
        },
        FieldType::Number => Control::NumberInput {
            value: text,
            placeholder: field.placeholder.clone(),
        },
        FieldType::Textarea => Control::TextArea {
            value: text,
            placeholder: field.placeholder.clone(),
        },
        FieldType::Select => Control::Select {
            options: field.options.clone(),
            selected,
        },
        FieldType::Radio => Control::RadioGroup {
            options: field.options.clone(),
            selected,
        },
        FieldType::Checkbox => Control::Checkbox {
            checked: value.as_bool(),
        },
        FieldType::Date => Control::DateInput { value: text },
        FieldType::Derived => {
            let result = compute_derived(field, fields, values);
            Control::Computed {
                display: result.to_string(),
                result,
            }
        }
    };

    let label = if field.is_derived() {
        format!("{} (Derived)", field.label)
    } else {
        field.label.clone()
    };

    RenderedField {
        id: field.id.clone(),
        label,
        required: field.is_required(),
        help_text: field.help_text.clone(),
        control,
        error: error.cloned(),
    }
}

impl fmt::Display for RenderedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)?;
        if self.required {
            write!(f, " *")?;
        }
        write!(f, ": ")?;
        match &self.control {
            Control::TextInput { value, placeholder }
            | Control::NumberInput { value, placeholder }
            | Control::TextArea { value, placeholder } => match placeholder {
                Some(p) if value.is_empty() => write!(f, "[{}]", p)?,
                _ => write!(f, "{}", value)?,
            },
            Control::Select { options, selected } | Control::RadioGroup { options, selected } => {
                let choices: Vec<String> = options
                    .iter()
                    .map(|o| {
                        if selected.as_deref() == Some(o.as_str()) {
                            format!("({})", o)
                        } else {
                            o.clone()
                        }
                    })
                    .collect();
                write!(f, "{}", choices.join(" | "))?;
            }
            Control::Checkbox { checked } => write!(f, "[{}]", if *checked { "x" } else { " " })?,
            Control::DateInput { value } => write!(f, "{}", value)?,
            Control::Computed { display, .. } => write!(f, "= {}", display)?,
        }
        Ok(())
    }
}
