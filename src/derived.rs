//! Derived field evaluation.
//!
//! A derived field's value is recomputed from the live values of its parent
//! fields every time it is displayed. Failures never escape as errors; they
//! become one of the fixed display texts of [`DerivedValue`].

use std::fmt;

use indexmap::IndexMap;

use crate::error::FormulaError;
use crate::field::{Field, FieldId, FieldValue};
use crate::formula::{self, format_number, substitute_token};

pub const INVALID_CALCULATION: &str = "Invalid calculation";
pub const ERROR_IN_FORMULA: &str = "Error in formula";

/// Outcome of evaluating a derived field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DerivedValue {
    /// No formula or no parent fields configured.
    Empty,
    Value(f64),
    /// The formula evaluated to NaN or infinity.
    InvalidCalculation,
    /// The formula could not be scanned, parsed or fully resolved.
    FormulaError,
}

impl DerivedValue {
    /// The value as it appears in a submission.
    pub fn to_field_value(&self) -> FieldValue {
        match self {
            DerivedValue::Empty => FieldValue::Empty,
            DerivedValue::Value(n) => FieldValue::Number(*n),
            other => FieldValue::text(other.to_string()),
        }
    }
}

impl fmt::Display for DerivedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedValue::Empty => Ok(()),
            DerivedValue::Value(n) => write!(f, "{}", format_number(*n)),
            DerivedValue::InvalidCalculation => write!(f, "{}", INVALID_CALCULATION),
            DerivedValue::FormulaError => write!(f, "{}", ERROR_IN_FORMULA),
        }
    }
}

/// Compute the value of `field` from the other `fields` of its form and
/// their live `values`.
///
/// Each parent's label, then its id, is replaced in the formula by the
/// parent's current value. Empty values count as `0`. Parents that are
/// themselves derived also count as `0`; derived values are never chained.
pub fn compute_derived(
    field: &Field,
    fields: &[Field],
    values: &IndexMap<FieldId, FieldValue>,
) -> DerivedValue {
    if field.computation_formula.trim().is_empty() || field.parent_fields.is_empty() {
        return DerivedValue::Empty;
    }

    let result = substitute_parents(field, fields, values).and_then(|s| formula::evaluate(&s));
    match result {
        Ok(n) if n.is_finite() => DerivedValue::Value(n),
        Ok(n) => {
            tracing::debug!(field = %field.id, result = n, "derived value is not finite");
            DerivedValue::InvalidCalculation
        }
        Err(err) => {
            tracing::debug!(field = %field.id, error = %err, "derived formula failed");
            DerivedValue::FormulaError
        }
    }
}

/// The formula with every resolvable parent replaced by its operand text.
pub fn substitute_parents(
    field: &Field,
    fields: &[Field],
    values: &IndexMap<FieldId, FieldValue>,
) -> Result<String, FormulaError> {
    let mut source = field.computation_formula.clone();

    for parent_id in &field.parent_fields {
        let Some(parent) = fields.iter().find(|f| &f.id == parent_id) else {
            tracing::debug!(field = %field.id, parent = %parent_id, "parent field not in form");
            continue;
        };

        let operand = if parent.is_derived() {
            "0".to_string()
        } else {
            values
                .get(parent_id)
                .map(FieldValue::formula_operand)
                .unwrap_or_else(|| "0".to_string())
        };

        source = substitute_token(&source, &parent.label, &operand)?;
        source = substitute_token(&source, &parent.id, &operand)?;
    }

    Ok(source)
}

/// Every derived field of `fields` with its current value, in the order given.
pub fn compute_all<'a>(
    fields: &'a [Field],
    values: &IndexMap<FieldId, FieldValue>,
) -> Vec<(&'a Field, DerivedValue)> {
    fields
        .iter()
        .filter(|f| f.is_derived())
        .map(|f| (f, compute_derived(f, fields, values)))
        .collect()
}
