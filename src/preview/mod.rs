//! Live preview: fill a form, see derived values, validate and submit.

mod render;
mod session;
mod validator;

pub use render::{render_field, Control, RenderedField};
pub use session::{FieldStatus, FormSession, Submission};
pub use validator::{
    check_rules, rule_advisories, validate_field, validate_form, ValidationErrors,
};
