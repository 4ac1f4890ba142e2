//! Field builder: the palette and the pure edits the form editor applies.
//!
//! Every edit takes the current field by reference and returns the next
//! field record. The store then replaces the old record by id.

use std::collections::HashSet;

use crate::error::BuilderError;
use crate::field::{Field, FieldId, FieldType, FieldValue, ValidationRule};
use crate::schema::new_id;

const PLACEHOLDER_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

/// Field types offered by the builder, with their button labels.
pub fn palette() -> impl Iterator<Item = (FieldType, &'static str)> {
    FieldType::ALL.into_iter().map(|kind| (kind, kind.palette_label()))
}

/// A new field of `kind` with a fresh id and the type's defaults.
pub fn new_field(kind: FieldType, order: i64) -> Field {
    let mut field = Field::new(new_id(), format!("New {} Field", kind.title()), kind);
    field.order = order;
    field.placeholder = kind.placeholder().map(str::to_string);
    field.default_value = match kind {
        FieldType::Checkbox => FieldValue::Bool(false),
        FieldType::Derived | FieldType::Number => FieldValue::Empty,
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Select
        | FieldType::Radio
        | FieldType::Date => FieldValue::text(""),
    };
    if kind.has_options() {
        field.options = PLACEHOLDER_OPTIONS.iter().map(|s| s.to_string()).collect();
    }
    field
}

/// The field as it should look after its type changes to `kind`.
pub fn change_type(field: &Field, kind: FieldType) -> Field {
    if field.kind == kind {
        return field.clone();
    }

    let mut next = field.clone();
    next.kind = kind;

    let had_default_placeholder = match &field.placeholder {
        None => true,
        Some(p) => Some(p.as_str()) == field.kind.placeholder(),
    };
    if had_default_placeholder {
        next.placeholder = kind.placeholder().map(str::to_string);
    }

    next.default_value = coerce_default(kind, &field.default_value);

    if kind.has_options() {
        if next.options.is_empty() {
            next.options = PLACEHOLDER_OPTIONS.iter().map(|s| s.to_string()).collect();
        }
    } else {
        next.options.clear();
    }

    if kind.is_derived() {
        next.required = false;
        next.parent_fields.clear();
        next.computation_formula.clear();
    } else if field.kind.is_derived() {
        next.parent_fields.clear();
        next.computation_formula.clear();
    }

    next.validation_rules.retain(|rule| kind.supports_rule(&rule.rule));
    next
}

/// Keep a default only if it still makes sense for `kind`.
fn coerce_default(kind: FieldType, value: &FieldValue) -> FieldValue {
    match (kind, value) {
        (FieldType::Derived, _) => FieldValue::Empty,
        (FieldType::Checkbox, FieldValue::Bool(b)) => FieldValue::Bool(*b),
        (FieldType::Checkbox, _) => FieldValue::Bool(false),
        (FieldType::Number, FieldValue::Number(n)) => FieldValue::Number(*n),
        (FieldType::Number, FieldValue::Text(s)) => {
            match FieldValue::from_input(FieldType::Number, s) {
                FieldValue::Number(n) => FieldValue::Number(n),
                _ => FieldValue::Empty,
            }
        }
        (FieldType::Number, _) => FieldValue::Empty,
        (_, FieldValue::Text(s)) => FieldValue::text(s.as_str()),
        (_, FieldValue::Number(n)) => FieldValue::text(crate::formula::format_number(*n)),
        (_, FieldValue::Bool(_) | FieldValue::Empty) => FieldValue::text(""),
    }
}

/// Options from comma-separated editor text; blanks are dropped.
pub fn with_options_csv(field: &Field, text: &str) -> Field {
    let mut next = field.clone();
    next.options = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    next
}

/// Default value from raw editor input, coerced to the field's type.
pub fn with_default_input(field: &Field, raw: &str) -> Field {
    let mut next = field.clone();
    next.default_value = match FieldValue::from_input(field.kind, raw) {
        FieldValue::Text(s) if field.kind == FieldType::Number => {
            tracing::debug!(field = %field.id, input = %s, "ignoring non-numeric default");
            FieldValue::Empty
        }
        value => value,
    };
    next
}

/// Fields a derived field may read: every other field that is not itself derived.
pub fn parent_candidates<'a>(field: &Field, all: &'a [Field]) -> Vec<&'a Field> {
    all.iter()
        .filter(|f| f.id != field.id && !f.is_derived())
        .collect()
}

/// Set the parent list, keeping only valid candidates in the given order.
pub fn with_parent_fields<I, S>(field: &Field, ids: I, all: &[Field]) -> Field
where
    I: IntoIterator<Item = S>,
    S: Into<FieldId>,
{
    let candidates = parent_candidates(field, all);
    let mut parents: Vec<FieldId> = Vec::new();
    for id in ids.into_iter().map(Into::into) {
        if parents.contains(&id) {
            continue;
        }
        if candidates.iter().any(|c| c.id == id) {
            parents.push(id);
        } else {
            tracing::debug!(field = %field.id, parent = %id, "dropping invalid parent field");
        }
    }

    let mut next = field.clone();
    next.parent_fields = parents;
    next
}

pub fn with_formula(field: &Field, formula: &str) -> Field {
    let mut next = field.clone();
    next.computation_formula = formula.to_string();
    next
}

/// Append a rule if the field's type supports it.
pub fn with_rule(field: &Field, rule: ValidationRule) -> Result<Field, BuilderError> {
    if !field.kind.supports_rule(&rule.rule) {
        return Err(BuilderError::UnsupportedRule {
            rule: rule.rule.name().to_string(),
            kind: field.kind,
        });
    }
    let mut next = field.clone();
    next.validation_rules.push(rule);
    Ok(next)
}

/// Build a field from a JSON definition, starting from the palette
/// defaults of its `type` and overlaying every key the definition sets.
///
/// `index` numbers the definition in error messages.
pub fn from_definition(
    definition: &serde_json::Value,
    index: usize,
    order: i64,
) -> Result<Field, BuilderError> {
    let invalid = |message: String| BuilderError::InvalidDefinition { index, message };

    let object = definition
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object".to_string()))?;
    let kind: FieldType = object
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(BuilderError::MissingType(index))?
        .parse()
        .map_err(invalid)?;

    let mut merged =
        serde_json::to_value(new_field(kind, order)).map_err(|e| invalid(e.to_string()))?;
    if let Some(base) = merged.as_object_mut() {
        for (key, value) in object {
            base.insert(key.clone(), value.clone());
        }
        base.insert("type".to_string(), serde_json::Value::from(kind.name()));
    }

    let mut field: Field = serde_json::from_value(merged).map_err(|e| invalid(e.to_string()))?;
    field.default_value = coerce_default(kind, &field.default_value);
    if kind.is_derived() {
        field.required = false;
    }
    if !kind.has_options() {
        field.options.clear();
    }
    if let Some(rule) = field
        .validation_rules
        .iter()
        .find(|rule| !kind.supports_rule(&rule.rule))
    {
        return Err(BuilderError::UnsupportedRule {
            rule: rule.rule.name().to_string(),
            kind,
        });
    }
    Ok(field)
}

/// Reject a field list in which two fields share an id.
pub fn check_unique_ids(fields: &[Field]) -> Result<(), BuilderError> {
    let mut seen = HashSet::new();
    match fields.iter().find(|f| !seen.insert(f.id.as_str())) {
        Some(dup) => Err(BuilderError::DuplicateId(dup.id.clone())),
        None => Ok(()),
    }
}

/// Rewrite parent references given as labels into field ids, then keep only
/// valid candidates.
pub fn resolve_parent_refs(field: &Field, all: &[Field]) -> Field {
    let ids: Vec<FieldId> = field
        .parent_fields
        .iter()
        .map(|reference| {
            let wanted = reference.trim().to_lowercase();
            all.iter()
                .find(|f| &f.id == reference)
                .or_else(|| all.iter().find(|f| f.label.trim().to_lowercase() == wanted))
                .map(|f| f.id.clone())
                .unwrap_or_else(|| reference.clone())
        })
        .collect();
    with_parent_fields(field, ids, all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::RuleKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_field_defaults() {
        let text = new_field(FieldType::Text, 0);
        assert_eq!(text.label, "New Text Field");
        assert_eq!(text.default_value, FieldValue::text(""));
        assert_eq!(text.placeholder.as_deref(), Some("Enter text..."));
        assert!(!text.required);

        let checkbox = new_field(FieldType::Checkbox, 1);
        assert_eq!(checkbox.default_value, FieldValue::Bool(false));
        assert_eq!(checkbox.order, 1);

        let select = new_field(FieldType::Select, 2);
        assert_eq!(select.options, vec!["Option 1", "Option 2"]);

        let derived = new_field(FieldType::Derived, 3);
        assert_eq!(derived.label, "New Derived Field");
        assert!(derived.parent_fields.is_empty());
        assert!(derived.computation_formula.is_empty());
        assert_eq!(derived.default_value, FieldValue::Empty);
    }

    #[test]
    fn test_new_fields_get_fresh_ids() {
        assert_ne!(
            new_field(FieldType::Text, 0).id,
            new_field(FieldType::Text, 0).id
        );
    }

    #[test]
    fn test_change_to_checkbox_sets_false() {
        let field = new_field(FieldType::Text, 0);
        let next = change_type(&field, FieldType::Checkbox);
        assert_eq!(next.kind, FieldType::Checkbox);
        assert_eq!(next.default_value, FieldValue::Bool(false));
        assert_eq!(next.id, field.id);
        assert_eq!(next.placeholder, None);
    }

    #[test]
    fn test_change_to_radio_seeds_options() {
        let field = new_field(FieldType::Text, 0);
        let next = change_type(&field, FieldType::Radio);
        assert_eq!(next.options, vec!["Option 1", "Option 2"]);

        let custom = with_options_csv(&next, "Red, Green");
        let back = change_type(&custom, FieldType::Select);
        assert_eq!(back.options, vec!["Red", "Green"]);

        let text = change_type(&back, FieldType::Text);
        assert!(text.options.is_empty());
    }

    #[test]
    fn test_change_to_derived_clears_input_config() {
        let field = with_default_input(&new_field(FieldType::Number, 0), "5").required(true);
        let next = change_type(&field, FieldType::Derived);
        assert_eq!(next.default_value, FieldValue::Empty);
        assert!(!next.required);
        assert!(next.parent_fields.is_empty());
        assert!(next.computation_formula.is_empty());
    }

    #[test]
    fn test_change_from_derived_clears_formula() {
        let a = new_field(FieldType::Number, 0);
        let d = new_field(FieldType::Derived, 1);
        let d = with_formula(
            &with_parent_fields(&d, [a.id.clone()], &[a.clone(), d.clone()]),
            "a * 2",
        );
        let next = change_type(&d, FieldType::Text);
        assert!(next.parent_fields.is_empty());
        assert!(next.computation_formula.is_empty());
        assert_eq!(next.default_value, FieldValue::text(""));
    }

    #[test]
    fn test_change_type_drops_unsupported_rules() {
        let field = with_rule(
            &new_field(FieldType::Text, 0),
            ValidationRule::new(RuleKind::Email),
        )
        .unwrap();
        let field = with_rule(&field, ValidationRule::new(RuleKind::MinLength(2))).unwrap();
        let next = change_type(&field, FieldType::Number);
        assert_eq!(next.validation_rules.len(), 1);
        assert_eq!(next.validation_rules[0].rule, RuleKind::MinLength(2));
    }

    #[test]
    fn test_options_csv() {
        let field = new_field(FieldType::Select, 0);
        let next = with_options_csv(&field, " Small,, Medium ,Large , ");
        assert_eq!(next.options, vec!["Small", "Medium", "Large"]);
    }

    #[test]
    fn test_default_input_by_type() {
        let number = new_field(FieldType::Number, 0);
        assert_eq!(
            with_default_input(&number, "12.5").default_value,
            FieldValue::Number(12.5)
        );
        assert_eq!(
            with_default_input(&number, "").default_value,
            FieldValue::Empty
        );
        assert_eq!(
            with_default_input(&number, "twelve").default_value,
            FieldValue::Empty
        );

        let checkbox = new_field(FieldType::Checkbox, 0);
        assert_eq!(
            with_default_input(&checkbox, "true").default_value,
            FieldValue::Bool(true)
        );

        let date = new_field(FieldType::Date, 0);
        assert_eq!(
            with_default_input(&date, "2024-05-01").default_value,
            FieldValue::text("2024-05-01")
        );
    }

    #[test]
    fn test_parent_candidates_exclude_self_and_derived() {
        let width = new_field(FieldType::Number, 0);
        let height = new_field(FieldType::Number, 1);
        let area = new_field(FieldType::Derived, 2);
        let other = new_field(FieldType::Derived, 3);
        let all = vec![width.clone(), height.clone(), area.clone(), other.clone()];

        let ids: Vec<_> = parent_candidates(&area, &all)
            .iter()
            .map(|f| f.id.clone())
            .collect();
        assert_eq!(ids, vec![width.id.clone(), height.id.clone()]);

        let next = with_parent_fields(
            &area,
            [
                height.id.clone(),
                area.id.clone(),
                other.id.clone(),
                height.id.clone(),
                "missing".to_string(),
                width.id.clone(),
            ],
            &all,
        );
        assert_eq!(next.parent_fields, vec![height.id, width.id]);
    }

    #[test]
    fn test_with_rule_rejects_unsupported() {
        let derived = new_field(FieldType::Derived, 0);
        let err = with_rule(&derived, ValidationRule::new(RuleKind::NotEmpty)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Rule 'notEmpty' is not supported by derived fields"
        );
    }

    #[test]
    fn test_from_definition_overlays_defaults() {
        let definition = serde_json::json!({
            "type": "select",
            "label": "Size",
            "required": true,
            "options": ["S", "M", "L"]
        });
        let field = from_definition(&definition, 0, 3).unwrap();
        assert_eq!(field.kind, FieldType::Select);
        assert_eq!(field.label, "Size");
        assert!(field.required);
        assert_eq!(field.options, vec!["S", "M", "L"]);
        assert_eq!(field.order, 3);
        assert!(!field.id.is_empty());

        let bare = from_definition(&serde_json::json!({ "type": "radio" }), 1, 0).unwrap();
        assert_eq!(bare.label, "New Radio Field");
        assert_eq!(bare.options, vec!["Option 1", "Option 2"]);
    }

    #[test]
    fn test_from_definition_errors() {
        let err = from_definition(&serde_json::json!({ "label": "X" }), 2, 0).unwrap_err();
        assert_eq!(err, BuilderError::MissingType(2));

        let err = from_definition(&serde_json::json!({ "type": "slider" }), 0, 0).unwrap_err();
        assert!(err.to_string().contains("unknown field type 'slider'"));

        let err = from_definition(&serde_json::json!(["text"]), 4, 0).unwrap_err();
        assert_eq!(err.to_string(), "Field definition #4: expected a JSON object");

        let definition = serde_json::json!({
            "type": "number",
            "validationRules": [{ "id": "r", "type": "email" }]
        });
        assert!(matches!(
            from_definition(&definition, 0, 0),
            Err(BuilderError::UnsupportedRule { .. })
        ));
    }

    #[test]
    fn test_from_definition_derived_drops_required() {
        let definition = serde_json::json!({
            "type": "derived",
            "label": "Total",
            "required": true,
            "parentFields": ["Price"],
            "computationFormula": "Price * 2"
        });
        let field = from_definition(&definition, 0, 0).unwrap();
        assert!(!field.required);
        assert_eq!(field.parent_fields, vec!["Price"]);
        assert_eq!(field.computation_formula, "Price * 2");
    }

    #[test]
    fn test_resolve_parent_refs() {
        let price = Field::new("p1", "Price", FieldType::Number);
        let qty = Field::new("q1", "Qty", FieldType::Number);
        let total = Field::new("t1", "Total", FieldType::Derived)
            .with_formula("Price * Qty", ["price", "q1", "Missing"]);
        let all = vec![price, qty, total.clone()];

        let resolved = resolve_parent_refs(&total, &all);
        assert_eq!(resolved.parent_fields, vec!["p1", "q1"]);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let definitions = [
            serde_json::json!({ "type": "number", "id": "w", "label": "Width" }),
            serde_json::json!({ "type": "text", "id": "w", "label": "Wall" }),
        ];
        let fields: Vec<Field> = definitions
            .iter()
            .enumerate()
            .map(|(i, d)| from_definition(d, i, i as i64).unwrap())
            .collect();
        assert_eq!(
            check_unique_ids(&fields),
            Err(BuilderError::DuplicateId("w".to_string()))
        );

        let fresh = vec![new_field(FieldType::Text, 0), new_field(FieldType::Text, 1)];
        assert_eq!(check_unique_ids(&fresh), Ok(()));
    }

    #[test]
    fn test_palette() {
        let palette: Vec<_> = palette().collect();
        assert_eq!(palette.len(), 8);
        assert_eq!(palette[7], (FieldType::Derived, "Derived Field"));
    }
}
