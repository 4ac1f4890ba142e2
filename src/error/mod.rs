//! Error types for every layer of the crate.

use crate::field::FieldType;
use crate::span::Span;
use thiserror::Error;

/// Formula scanning errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexerError {
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedChar(char, Span),

    #[error("Invalid number '{0}' at {1}")]
    InvalidNumber(String, Span),
}

impl LexerError {
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::UnexpectedChar(c, span)
    }

    pub fn invalid_number(s: String, span: Span) -> Self {
        Self::InvalidNumber(s, span)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar(_, span) => *span,
            Self::InvalidNumber(_, span) => *span,
        }
    }
}

/// Formula parsing errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserError {
    #[error("Unexpected token '{found}', expected {expected} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of formula at {0}")]
    UnexpectedEof(Span),

    #[error("Formula nested too deeply at {0}")]
    TooDeep(Span),

    #[error("Empty formula")]
    Empty,
}

impl ParserError {
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::UnexpectedEof(span)
    }

    pub fn too_deep(span: Span) -> Self {
        Self::TooDeep(span)
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::UnexpectedEof(span) | Self::TooDeep(span) => Some(*span),
            Self::Empty => None,
        }
    }
}

/// Formula evaluation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unresolved reference '{0}' at {1}")]
    UnresolvedReference(String, Span),
}

impl EvalError {
    pub fn unresolved_reference(name: impl Into<String>, span: Span) -> Self {
        Self::UnresolvedReference(name.into(), span)
    }
}

/// Any failure while turning a formula string into a number.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Invalid field label pattern: {0}")]
    Pattern(String),
}

impl From<regex::Error> for FormulaError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern(err.to_string())
    }
}

/// Field builder errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuilderError {
    #[error("Rule '{rule}' is not supported by {kind} fields")]
    UnsupportedRule { rule: String, kind: FieldType },

    #[error("Field definition #{0} has no type")]
    MissingType(usize),

    #[error("Field definition #{index}: {message}")]
    InvalidDefinition { index: usize, message: String },

    #[error("Field id '{0}' is used more than once")]
    DuplicateId(String),
}

/// Form store errors.
///
/// Only `EmptyName` and `NoWorkingForm` are returned to callers of the store;
/// I/O and JSON failures surface as persistence warnings.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Form name is required")]
    EmptyName,

    #[error("No form is being edited")]
    NoWorkingForm,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No data directory could be determined")]
    NoDataDir,
}

/// Top-level error for the command-line front end.
#[derive(Debug, Error)]
pub enum FormsmithError {
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    #[error("Form '{0}' not found")]
    FormNotFound(String),

    #[error("{0}")]
    Usage(String),
}

impl FormsmithError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}
