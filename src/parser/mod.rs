//! Parser for arithmetic formulas.

mod core;
mod expressions;
mod precedence;


pub use self::core::{ParseResult, Parser, MAX_DEPTH};
