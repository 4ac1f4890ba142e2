//! Core parser struct and helper methods.

use crate::ast::Expr;
use crate::error::ParserError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

pub type ParseResult<T> = Result<T, ParserError>;

/// Deepest expression tree the parser will build.
pub const MAX_DEPTH: usize = 128;

/// The formula parser.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    pub(crate) depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::eof(end, 1, end + 1));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parse a complete formula: exactly one expression followed by the end.
    pub fn parse(&mut self) -> ParseResult<Expr> {
        if self.is_at_end() {
            return Err(ParserError::Empty);
        }

        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(ParserError::unexpected_token(
                "operator or end of formula",
                format!("{}", self.peek().kind),
                self.current_span(),
            ));
        }

        Ok(expr)
    }

    // ===== Token manipulation =====

    pub(crate) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current.saturating_sub(1)].clone()
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else if self.is_at_end() {
            Err(ParserError::unexpected_eof(self.current_span()))
        } else {
            Err(ParserError::unexpected_token(
                format!("{}", kind),
                format!("{}", self.peek().kind),
                self.current_span(),
            ))
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.previous().span
    }
}
