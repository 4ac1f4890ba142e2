//! Form schemas: a named, ordered collection of fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldId};

/// Identifier of a form schema.
pub type FormId = String;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: FormId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Authoring (insertion) order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl FormSchema {
    /// An unnamed schema with a fresh id and no fields.
    pub fn empty() -> Self {
        Self {
            id: new_id(),
            name: String::new(),
            description: None,
            created_at: Utc::now(),
            updated_at: None,
            fields: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::empty()
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Find a field by id, or else by label (case-insensitive).
    pub fn find_field(&self, key: &str) -> Option<&Field> {
        let wanted = key.trim().to_lowercase();
        self.field(key)
            .or_else(|| self.fields.iter().find(|f| f.label.trim().to_lowercase() == wanted))
    }

    /// Fields in display order: stable sort on `order`, ties keep insertion order.
    pub fn display_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.iter().map(|f| &f.id)
    }

    /// Next free `order` value for an appended field.
    pub fn next_order(&self) -> i64 {
        self.fields
            .iter()
            .map(|f| f.order + 1)
            .max()
            .unwrap_or(0)
            .max(self.fields.len() as i64)
    }
}
