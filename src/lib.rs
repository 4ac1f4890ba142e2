//! Formsmith: a dynamic form builder with derived fields.
//!
//! Forms are assembled from a closed set of field types, saved to a local
//! key-value store and filled in through a live preview that validates on
//! submit. Derived fields compute their value from other fields with a small
//! arithmetic formula language.
//!
//! # Layers
//!
//! - [`field`], [`schema`], [`builder`]: the form model and its pure edits
//! - [`store`]: saved forms and the form under construction
//! - [`lexer`], [`parser`], [`interpreter`], [`formula`]: the formula engine
//! - [`derived`]: derived field evaluation
//! - [`preview`]: live values, rendering, validation and submission

// Allow some clippy lints that are stylistic and not critical
#![allow(clippy::module_inception)]
#![allow(clippy::result_large_err)]
#![allow(clippy::new_without_default)]
#![allow(clippy::only_used_in_recursion)]

pub mod ast;
pub mod builder;
pub mod config;
pub mod derived;
pub mod error;
pub mod field;
pub mod formula;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod preview;
pub mod schema;
pub mod span;
pub mod store;

pub use config::Config;
pub use derived::{compute_derived, DerivedValue};
pub use error::FormsmithError;
pub use field::{Field, FieldId, FieldType, FieldValue};
pub use preview::FormSession;
pub use schema::FormSchema;
pub use store::{FileStore, FormStore, KeyValueStore, MemoryStore};

/// Open the file-backed store in the configured data directory.
pub fn open_store(config: &Config) -> FormStore<FileStore> {
    tracing::debug!(dir = %config.data_dir.display(), "opening form store");
    FormStore::open(FileStore::new(config.data_dir.clone()))
}
