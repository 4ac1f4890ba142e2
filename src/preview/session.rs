//! Live state of a form being filled in.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use super::render::{render_field, RenderedField};
use super::validator::{rule_advisories, validate_form, ValidationErrors};
use crate::derived::compute_derived;
use crate::field::{FieldId, FieldValue};
use crate::schema::FormSchema;

/// Where a field is in its edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Untouched,
    Edited,
    Invalid,
    Valid,
}

/// A validated set of values, keyed by field id in authoring order.
///
/// Derived fields carry their computed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub form_id: String,
    pub values: IndexMap<FieldId, FieldValue>,
}

#[derive(Debug, Clone)]
pub struct FormSession {
    schema: FormSchema,
    values: IndexMap<FieldId, FieldValue>,
    errors: ValidationErrors,
    touched: HashSet<FieldId>,
    validated: bool,
}

impl FormSession {
    pub fn new(schema: FormSchema) -> Self {
        let values = initial_values(&schema);
        Self {
            schema,
            values,
            errors: ValidationErrors::new(),
            touched: HashSet::new(),
            validated: false,
        }
    }

    /// Show a different form, discarding every value and error.
    pub fn switch_schema(&mut self, schema: FormSchema) {
        *self = Self::new(schema);
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &IndexMap<FieldId, FieldValue> {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id)
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Record an edit. Clears the field's error right away; everything else
    /// waits for the next validation. Returns false if the edit was ignored.
    pub fn set_value(&mut self, id: &str, value: FieldValue) -> bool {
        match self.schema.field(id) {
            Some(field) if !field.is_derived() => {}
            Some(_) => {
                tracing::debug!(field = %id, "derived fields cannot be edited");
                return false;
            }
            None => {
                tracing::debug!(field = %id, "edit for unknown field ignored");
                return false;
            }
        }

        self.values.insert(id.to_string(), value);
        self.touched.insert(id.to_string());
        self.errors.shift_remove(id);
        true
    }

    /// Parse `raw` for the field's type, then record it.
    pub fn set_input(&mut self, id: &str, raw: &str) -> bool {
        match self.schema.field(id) {
            Some(field) => {
                let value = FieldValue::from_input(field.kind, raw);
                self.set_value(id, value)
            }
            None => false,
        }
    }

    pub fn field_status(&self, id: &str) -> FieldStatus {
        if self.errors.contains_key(id) {
            FieldStatus::Invalid
        } else if self.validated && self.touched.contains(id) {
            FieldStatus::Valid
        } else if self.touched.contains(id) {
            FieldStatus::Edited
        } else {
            FieldStatus::Untouched
        }
    }

    /// Every field in display order, derived values recomputed.
    pub fn render(&self) -> Vec<RenderedField> {
        self.schema
            .display_fields()
            .into_iter()
            .map(|field| {
                render_field(
                    field,
                    &self.schema.fields,
                    &self.values,
                    self.errors.get(&field.id),
                )
            })
            .collect()
    }

    /// Run full validation and keep the result for display.
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = validate_form(&self.schema, &self.values);
        self.validated = true;
        &self.errors
    }

    /// Failing validation rules for the current values. Advisory only.
    pub fn advisories(&self) -> ValidationErrors {
        rule_advisories(&self.schema, &self.values)
    }

    pub fn submit(&mut self) -> Result<Submission, ValidationErrors> {
        self.validate();
        if !self.errors.is_empty() {
            tracing::debug!(form = %self.schema.id, errors = self.errors.len(), "submission blocked");
            return Err(self.errors.clone());
        }

        let values = self
            .schema
            .fields
            .iter()
            .map(|field| {
                let value = if field.is_derived() {
                    compute_derived(field, &self.schema.fields, &self.values).to_field_value()
                } else {
                    self.values.get(&field.id).cloned().unwrap_or_default()
                };
                (field.id.clone(), value)
            })
            .collect();

        Ok(Submission {
            form_id: self.schema.id.clone(),
            values,
        })
    }
}

fn initial_values(schema: &FormSchema) -> IndexMap<FieldId, FieldValue> {
    schema
        .fields
        .iter()
        .map(|field| (field.id.clone(), field.initial_value()))
        .collect()
}
