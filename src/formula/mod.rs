//! Restricted arithmetic formulas.
//!
//! A formula is scanned, parsed and evaluated by the crate's own lexer, parser
//! and interpreter. Nothing outside `+ - * / ( )` and decimal numbers is
//! accepted, so user-authored text can never reach a general code evaluator.

mod substitute;

pub use substitute::{substitute_token, token_pattern};

use crate::ast::Expr;
use crate::error::FormulaError;
use crate::interpreter::Interpreter;
use crate::lexer::Scanner;
use crate::parser::Parser;

/// Parse a formula into an expression tree.
pub fn parse(source: &str) -> Result<Expr, FormulaError> {
    let tokens = Scanner::new(source).scan_tokens()?;
    Ok(Parser::new(tokens).parse()?)
}

/// Scan, parse and evaluate a fully substituted formula.
pub fn evaluate(source: &str) -> Result<f64, FormulaError> {
    let expr = parse(source)?;
    Ok(Interpreter::new().evaluate(&expr)?)
}

/// Shortest decimal form of a number, without a trailing `.0`.
///
/// Negative zero prints as `0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EvalError, LexerError, ParserError};

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate("4 * 5"), Ok(20.0));
        assert_eq!(evaluate(" ( 1.5 + .5 ) / 4 "), Ok(0.5));
    }

    #[test]
    fn test_error_layers() {
        assert!(matches!(
            evaluate("4 $ 5"),
            Err(FormulaError::Lexer(LexerError::UnexpectedChar('$', _)))
        ));
        assert!(matches!(
            evaluate("4 +"),
            Err(FormulaError::Parser(ParserError::UnexpectedEof(_)))
        ));
        assert!(matches!(
            evaluate("Area + 1"),
            Err(FormulaError::Eval(EvalError::UnresolvedReference(_, _)))
        ));
    }

    #[test]
    fn test_no_code_evaluation() {
        for source in [
            "process.exit()",
            "(() => 1)()",
            "alert(1)",
            "1; 2",
            "this.constructor",
            "`1`",
        ] {
            assert!(evaluate(source).is_err(), "expected error for {source:?}");
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }
}
