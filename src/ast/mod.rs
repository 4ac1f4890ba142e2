//! Abstract syntax tree for arithmetic formulas.

pub mod expr;

pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
