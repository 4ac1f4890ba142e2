//! Whole-word replacement of field labels and ids inside a formula.

use regex::{NoExpand, Regex, RegexBuilder};

use crate::error::FormulaError;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive pattern matching `token` only where it is not part of a
/// longer word.
///
/// A boundary is required only on a side whose edge character is a word
/// character, so labels such as `Cost ($)` still match.
pub fn token_pattern(token: &str) -> Result<Regex, FormulaError> {
    let starts_with_word = token.chars().next().is_some_and(is_word_char);
    let ends_with_word = token.chars().last().is_some_and(is_word_char);

    let pattern = format!(
        "{}{}{}",
        if starts_with_word { r"\b" } else { "" },
        regex::escape(token),
        if ends_with_word { r"\b" } else { "" },
    );

    Ok(RegexBuilder::new(&pattern).case_insensitive(true).build()?)
}

/// Replace every whole-word occurrence of `token` in `formula`.
///
/// Blank tokens leave the formula unchanged.
pub fn substitute_token(
    formula: &str,
    token: &str,
    replacement: &str,
) -> Result<String, FormulaError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(formula.to_string());
    }

    let pattern = token_pattern(token)?;
    Ok(pattern
        .replace_all(formula, NoExpand(replacement))
        .into_owned())
}
