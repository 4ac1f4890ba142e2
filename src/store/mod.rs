//! Form store: saved forms plus the form under construction.
//!
//! The store is the only writer of the durable key-value storage. The saved
//! sequence is serialized as one JSON array under [`FORMS_KEY`].

mod kv;

pub use kv::{FileStore, KeyValueStore, MemoryStore};

use chrono::Utc;

use crate::error::StoreError;
use crate::field::Field;
use crate::schema::{new_id, FormId, FormSchema};

/// Storage key of the saved-forms sequence.
pub const FORMS_KEY: &str = "forms";

pub struct FormStore<S: KeyValueStore> {
    storage: S,
    saved: Vec<FormSchema>,
    working: Option<FormSchema>,
    persist_warning: Option<String>,
}

impl<S: KeyValueStore> FormStore<S> {
    /// Load saved forms from `storage`. Missing or unreadable data loads as
    /// an empty sequence.
    pub fn open(storage: S) -> Self {
        let saved = match storage.get(FORMS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FormSchema>>(&raw) {
                Ok(forms) => forms,
                Err(err) => {
                    tracing::warn!(error = %err, "stored forms are malformed, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored forms, starting empty");
                Vec::new()
            }
        };

        Self {
            storage,
            saved,
            working: None,
            persist_warning: None,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Working form

    /// Begin a new, empty working form, replacing any previous one.
    pub fn start_new_form(&mut self) -> &FormSchema {
        self.working.insert(FormSchema::empty())
    }

    pub fn set_working_form(&mut self, form: FormSchema) {
        self.working = Some(form);
    }

    pub fn working_form(&self) -> Option<&FormSchema> {
        self.working.as_ref()
    }

    pub fn clear_working_form(&mut self) {
        self.working = None;
    }

    pub fn add_field_to_working_form(&mut self, field: Field) {
        match self.working.as_mut() {
            Some(form) => form.fields.push(field),
            None => tracing::debug!(field = %field.id, "no working form, field not added"),
        }
    }

    /// Replace the field whose id matches `field.id`.
    pub fn update_field_in_working_form(&mut self, field: Field) {
        let Some(form) = self.working.as_mut() else {
            tracing::debug!(field = %field.id, "no working form, field not updated");
            return;
        };
        match form.fields.iter_mut().find(|f| f.id == field.id) {
            Some(slot) => *slot = field,
            None => tracing::warn!(field = %field.id, "update for unknown field ignored"),
        }
    }

    pub fn remove_field_from_working_form(&mut self, id: &str) {
        match self.working.as_mut() {
            Some(form) => form.fields.retain(|f| f.id != id),
            None => tracing::debug!(field = %id, "no working form, nothing to remove"),
        }
    }

    /// Save the working form under `name` as a new schema and clear the
    /// working copy.
    ///
    /// The name is trimmed and must not be blank. Persistence failures do not
    /// fail the save; see [`FormStore::take_persist_warning`].
    pub fn save_working_form(&mut self, name: &str) -> Result<FormId, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let working = self.working.take().ok_or(StoreError::NoWorkingForm)?;

        let form = FormSchema {
            id: new_id(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: None,
            ..working
        };
        let id = form.id.clone();
        tracing::info!(form = %id, name = %form.name, fields = form.fields.len(), "form saved");

        self.saved.push(form);
        self.persist();
        Ok(id)
    }

    // Saved forms

    /// Append an already-built schema, e.g. one imported from a file.
    pub fn add_form(&mut self, form: FormSchema) -> FormId {
        let id = form.id.clone();
        self.saved.push(form);
        self.persist();
        id
    }

    pub fn saved_forms(&self) -> &[FormSchema] {
        &self.saved
    }

    pub fn saved_form(&self, id: &str) -> Option<&FormSchema> {
        self.saved.iter().find(|f| f.id == id)
    }

    /// Make the saved form `id` the working copy and return it for preview.
    pub fn select_form_for_preview(&mut self, id: &str) -> Option<&FormSchema> {
        let Some(form) = self.saved_form(id).cloned() else {
            tracing::warn!(form = %id, "selected form does not exist");
            return None;
        };
        Some(self.working.insert(form))
    }

    /// The last persistence failure, if any, cleared on read.
    pub fn take_persist_warning(&mut self) -> Option<String> {
        self.persist_warning.take()
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.saved)
            .map_err(StoreError::from)
            .and_then(|json| self.storage.set(FORMS_KEY, &json));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist saved forms");
            self.persist_warning = Some(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use pretty_assertions::assert_eq;

    fn store() -> FormStore<MemoryStore> {
        FormStore::open(MemoryStore::new())
    }

    fn ids(form: &FormSchema) -> Vec<&str> {
        form.fields.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_open_empty_storage() {
        let store = store();
        assert!(store.saved_forms().is_empty());
        assert!(store.working_form().is_none());
    }

    #[test]
    fn test_open_malformed_storage() {
        for raw in ["not json", "{\"a\":1}", "[{\"id\":3}]"] {
            let store = FormStore::open(MemoryStore::with_entry(FORMS_KEY, raw));
            assert!(store.saved_forms().is_empty(), "{}", raw);
        }
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut store = store();
        store.start_new_form();
        store.add_field_to_working_form(Field::new("x", "X", FieldType::Text));

        let err = store.save_working_form("  ").unwrap_err();
        assert!(matches!(err, StoreError::EmptyName));
        assert_eq!(store.saved_forms().len(), 0);
        assert!(store.working_form().is_some());
    }

    #[test]
    fn test_save_appends_and_clears_working_copy() {
        let mut store = store();
        let draft_id = store.start_new_form().id.clone();
        store.add_field_to_working_form(Field::new("x", "X", FieldType::Text));

        let before = Utc::now();
        let id = store.save_working_form("  Survey ").unwrap();

        assert_eq!(store.saved_forms().len(), 1);
        let saved = &store.saved_forms()[0];
        assert_eq!(saved.id, id);
        assert_ne!(saved.id, draft_id);
        assert_eq!(saved.name, "Survey");
        assert!(saved.created_at >= before);
        assert_eq!(ids(saved), vec!["x"]);
        assert!(store.working_form().is_none());
    }

    #[test]
    fn test_save_without_working_form() {
        let mut store = store();
        assert!(matches!(
            store.save_working_form("Survey"),
            Err(StoreError::NoWorkingForm)
        ));
    }

    #[test]
    fn test_save_persists() {
        let mut store = store();
        store.start_new_form();
        store.add_field_to_working_form(Field::new("x", "X", FieldType::Number));
        let id = store.save_working_form("Survey").unwrap();

        let raw = store.storage().raw(FORMS_KEY).unwrap().to_string();
        let reopened = FormStore::open(MemoryStore::with_entry(FORMS_KEY, &raw));
        assert_eq!(reopened.saved_forms(), store.saved_forms());
        assert_eq!(reopened.saved_form(&id).map(|f| f.name.as_str()), Some("Survey"));
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut store = store();
        store.start_new_form();
        for id in ["x", "y", "z"] {
            store.add_field_to_working_form(Field::new(id, id.to_uppercase(), FieldType::Text));
        }
        store.remove_field_from_working_form("y");
        assert_eq!(ids(store.working_form().unwrap()), vec!["x", "z"]);
    }

    #[test]
    fn test_update_replaces_by_id() {
        let mut store = store();
        store.start_new_form();
        store.add_field_to_working_form(Field::new("x", "X", FieldType::Text));
        store.add_field_to_working_form(Field::new("y", "Y", FieldType::Text));

        store.update_field_in_working_form(Field::new("y", "Renamed", FieldType::Number));
        let form = store.working_form().unwrap();
        assert_eq!(form.fields[1].label, "Renamed");
        assert_eq!(form.fields[1].kind, FieldType::Number);

        store.update_field_in_working_form(Field::new("missing", "M", FieldType::Text));
        assert_eq!(ids(store.working_form().unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn test_mutations_without_working_form_are_noops() {
        let mut store = store();
        store.add_field_to_working_form(Field::new("x", "X", FieldType::Text));
        store.update_field_in_working_form(Field::new("x", "X", FieldType::Text));
        store.remove_field_from_working_form("x");
        assert!(store.working_form().is_none());
    }

    #[test]
    fn test_select_for_preview() {
        let mut store = store();
        let id = store.add_form(
            FormSchema::named("Contact").with_field(Field::new("n", "Name", FieldType::Text)),
        );

        let selected = store.select_form_for_preview(&id).unwrap();
        assert_eq!(selected.name, "Contact");
        assert_eq!(store.working_form().map(|f| f.id.as_str()), Some(id.as_str()));
        assert!(store.select_form_for_preview("nope").is_none());
    }

    #[test]
    fn test_set_and_clear_working_form() {
        let mut store = store();
        let draft = FormSchema::named("Draft").with_field(Field::new("x", "X", FieldType::Text));
        store.set_working_form(draft.clone());
        assert_eq!(store.working_form(), Some(&draft));

        store.clear_working_form();
        assert!(store.working_form().is_none());
        assert!(store.saved_forms().is_empty());
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut store = FormStore::open(MemoryStore::new().fail_writes(true));
        store.start_new_form();
        store.save_working_form("Survey").unwrap();

        assert_eq!(store.saved_forms().len(), 1);
        let warning = store.take_persist_warning().unwrap();
        assert!(warning.contains("storage quota exceeded"));
        assert!(store.take_persist_warning().is_none());
    }

    #[test]
    fn test_file_store_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FormStore::open(FileStore::new(dir.path()));
        store.start_new_form();
        store.add_field_to_working_form(Field::new("x", "X", FieldType::Date));
        store.save_working_form("Dates").unwrap();

        let reopened = FormStore::open(FileStore::new(dir.path()));
        assert_eq!(reopened.saved_forms().len(), 1);
        assert_eq!(reopened.saved_forms()[0].fields[0].kind, FieldType::Date);
    }
}
