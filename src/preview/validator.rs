//! Submit-time validation of a filled form.
//!
//! Only the required check blocks a submission. Validation rules are
//! advisory and reported separately by [`rule_advisories`].

use indexmap::IndexMap;

use crate::field::{Field, FieldId, FieldType, FieldValue, RuleKind};
use crate::schema::FormSchema;

/// Field id to user-facing message, in display order.
pub type ValidationErrors = IndexMap<FieldId, String>;

/// Validate every field of `schema` against the live `values`.
///
/// A field is invalid exactly when it is required, not derived, and empty.
pub fn validate_form(
    schema: &FormSchema,
    values: &IndexMap<FieldId, FieldValue>,
) -> ValidationErrors {
    collect(schema, values, validate_field)
}

pub fn validate_field(field: &Field, value: &FieldValue) -> Option<String> {
    if field.is_derived() || !field.is_required() || !is_missing(field.kind, value) {
        return None;
    }
    Some(format!("{} is required", field.label))
}

/// The first failing enabled rule of each field. Never blocks a submission.
pub fn rule_advisories(
    schema: &FormSchema,
    values: &IndexMap<FieldId, FieldValue>,
) -> ValidationErrors {
    collect(schema, values, check_rules)
}

/// Run the enabled rules of `field` in order. Rules other than `notEmpty`
/// are skipped for empty values.
pub fn check_rules(field: &Field, value: &FieldValue) -> Option<String> {
    if field.is_derived() {
        return None;
    }
    let missing = is_missing(field.kind, value);
    field
        .validation_rules
        .iter()
        .filter(|rule| rule.enabled)
        .filter(|rule| !missing || matches!(rule.rule, RuleKind::NotEmpty))
        .find_map(|rule| rule.check(&field.label, value).err())
}

fn collect(
    schema: &FormSchema,
    values: &IndexMap<FieldId, FieldValue>,
    check: fn(&Field, &FieldValue) -> Option<String>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in schema.display_fields() {
        let value = values.get(&field.id).unwrap_or(&FieldValue::Empty);
        if let Some(message) = check(field, value) {
            errors.insert(field.id.clone(), message);
        }
    }
    errors
}

/// Empty for validation purposes. `0` is a value; an unchecked checkbox is not.
fn is_missing(kind: FieldType, value: &FieldValue) -> bool {
    match (kind, value) {
        (FieldType::Checkbox, FieldValue::Bool(checked)) => !checked,
        (_, value) => value.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ValidationRule;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, FieldValue)]) -> IndexMap<FieldId, FieldValue> {
        pairs
            .iter()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_required_fields_report_once() {
        let schema = FormSchema::named("Signup")
            .with_field(Field::new("n", "Name", FieldType::Text).required(true))
            .with_field(Field::new("a", "Age", FieldType::Number).required(true))
            .with_field(Field::new("c", "City", FieldType::Select).required(true));

        let errors = validate_form(&schema, &values(&[("n", "".into())]));
        assert_eq!(
            errors.into_iter().collect::<Vec<_>>(),
            vec![
                ("n".to_string(), "Name is required".to_string()),
                ("a".to_string(), "Age is required".to_string()),
                ("c".to_string(), "City is required".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_is_present() {
        let schema = FormSchema::named("Count")
            .with_field(Field::new("a", "Age", FieldType::Number).required(true));
        assert!(validate_form(&schema, &values(&[("a", 0.0.into())])).is_empty());
    }

    #[test]
    fn test_optional_fields_never_report_errors() {
        let mut nick = Field::new("n", "Nick", FieldType::Text);
        nick.validation_rules = vec![
            ValidationRule::new(RuleKind::NotEmpty),
            ValidationRule::new(RuleKind::MinLength(5)),
        ];
        let schema = FormSchema::named("Opt")
            .with_field(nick)
            .with_field(Field::new("b", "Agree", FieldType::Checkbox));
        for value in [FieldValue::Empty, "".into(), false.into(), "x".into(), "ab".into()] {
            let live = values(&[("n", value.clone()), ("b", value)]);
            assert!(validate_form(&schema, &live).is_empty());
        }
    }

    #[test]
    fn test_rules_do_not_block_required_fields() {
        let mut code = Field::new("c", "Code", FieldType::Text).required(true);
        code.validation_rules = vec![ValidationRule::new(RuleKind::MinLength(5))];
        let schema = FormSchema::named("Codes").with_field(code);

        let live = values(&[("c", "ab".into())]);
        assert!(validate_form(&schema, &live).is_empty());
        assert_eq!(
            rule_advisories(&schema, &live).get("c"),
            Some(&"Code must be at least 5 characters".to_string())
        );
    }

    #[test]
    fn test_required_checkbox_must_be_checked() {
        let schema = FormSchema::named("Terms")
            .with_field(Field::new("t", "Terms", FieldType::Checkbox).required(true));
        assert_eq!(
            validate_form(&schema, &values(&[("t", false.into())])).get("t"),
            Some(&"Terms is required".to_string())
        );
        assert!(validate_form(&schema, &values(&[("t", true.into())])).is_empty());
    }

    #[test]
    fn test_derived_is_skipped() {
        let schema = FormSchema::named("Calc")
            .with_field(Field::new("d", "Total", FieldType::Derived).required(true));
        assert!(validate_form(&schema, &IndexMap::new()).is_empty());
    }

    #[test]
    fn test_rule_advisories_in_order() {
        let mut email = Field::new("e", "Email", FieldType::Text);
        email.validation_rules = vec![
            ValidationRule::new(RuleKind::MinLength(3)),
            ValidationRule::new(RuleKind::Email),
        ];
        let schema = FormSchema::named("Contact").with_field(email);

        assert!(rule_advisories(&schema, &values(&[("e", "".into())])).is_empty());
        assert_eq!(
            rule_advisories(&schema, &values(&[("e", "ab".into())])).get("e"),
            Some(&"Email must be at least 3 characters".to_string())
        );
        assert_eq!(
            rule_advisories(&schema, &values(&[("e", "abcdef".into())])).get("e"),
            Some(&"Email must be a valid email".to_string())
        );
        assert!(rule_advisories(&schema, &values(&[("e", "me@example.com".into())])).is_empty());
    }

    #[test]
    fn test_disabled_rules_are_ignored() {
        let mut field = Field::new("z", "Zip", FieldType::Text);
        let mut rule = ValidationRule::new(RuleKind::Custom("[0-9]{5}".to_string()));
        rule.enabled = false;
        field.validation_rules.push(rule);
        assert_eq!(check_rules(&field, &"abc".into()), None);
    }

    #[test]
    fn test_not_empty_rule_checks_blank_text() {
        let mut field = Field::new("n", "Nickname", FieldType::Text);
        field
            .validation_rules
            .push(ValidationRule::new(RuleKind::NotEmpty).with_message("Pick a nickname"));
        assert_eq!(
            check_rules(&field, &"   ".into()),
            Some("Pick a nickname".to_string())
        );
        assert_eq!(
            check_rules(&field, &FieldValue::Empty),
            Some("Pick a nickname".to_string())
        );
    }
}
