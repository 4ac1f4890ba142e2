//! Tree-walking evaluator for parsed formulas.
//!
//! The evaluator has no environment: every variable must have been replaced by
//! a number before parsing, so a surviving reference is an error.

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::EvalError;

pub type EvalResult = Result<f64, EvalError>;

/// Evaluates arithmetic expressions with IEEE-754 semantics.
///
/// Division by zero is not an error here; it yields an infinity or NaN and
/// callers decide how to present non-finite results.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Number(n) => Ok(*n),

            ExprKind::Reference(name) => Err(EvalError::unresolved_reference(name, expr.span)),

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Unary { operator, operand } => {
                let value = self.evaluate(operand)?;
                Ok(match operator {
                    UnaryOp::Negate => -value,
                    UnaryOp::Plus => value,
                })
            }

            ExprKind::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(match operator {
                    BinaryOp::Add => left + right,
                    BinaryOp::Subtract => left - right,
                    BinaryOp::Multiply => left * right,
                    BinaryOp::Divide => left / right,
                })
            }
        }
    }
}
