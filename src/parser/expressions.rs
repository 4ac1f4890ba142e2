//! Expression parsing using Pratt precedence.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser, MAX_DEPTH};
use super::precedence::{get_precedence, Precedence};

impl Parser {
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        self.parse_precedence(Precedence::Term)
    }

    pub(crate) fn parse_precedence(&mut self, min_precedence: Precedence) -> ParseResult<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(ParserError::too_deep(self.current_span()));
        }
        self.depth += 1;
        let result = self.parse_operators(min_precedence);
        self.depth -= 1;
        result
    }

    fn parse_operators(&mut self, min_precedence: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.is_at_end() {
            let precedence = get_precedence(&self.peek().kind);
            if precedence == Precedence::None || precedence < min_precedence {
                break;
            }

            left = self.parse_infix(left, precedence)?;
            // Operator chains grow the tree without recursing.
            if left.depth > MAX_DEPTH {
                return Err(ParserError::too_deep(left.span));
            }
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        if self.is_at_end() {
            return Err(ParserError::unexpected_eof(self.current_span()));
        }

        let token = self.advance();
        let start_span = token.span;

        match &token.kind {
            TokenKind::Number(n) => Ok(Expr::new(ExprKind::Number(*n), start_span)),

            TokenKind::Identifier(name) => {
                Ok(Expr::new(ExprKind::Reference(name.clone()), start_span))
            }

            TokenKind::LeftParen => {
                let expr = self.expression()?;
                self.expect(&TokenKind::RightParen)?;
                let span = start_span.merge(&self.previous_span());
                Ok(Expr::new(ExprKind::Grouping(Box::new(expr)), span))
            }

            TokenKind::Minus => self.unary_expr(UnaryOp::Negate, start_span),
            TokenKind::Plus => self.unary_expr(UnaryOp::Plus, start_span),

            _ => Err(ParserError::unexpected_token(
                "number or '('",
                format!("{}", token.kind),
                token.span,
            )),
        }
    }

    fn parse_infix(&mut self, left: Expr, precedence: Precedence) -> ParseResult<Expr> {
        let token = self.advance();

        match &token.kind {
            TokenKind::Plus => self.binary_expr(left, BinaryOp::Add, precedence),
            TokenKind::Minus => self.binary_expr(left, BinaryOp::Subtract, precedence),
            TokenKind::Star => self.binary_expr(left, BinaryOp::Multiply, precedence),
            TokenKind::Slash => self.binary_expr(left, BinaryOp::Divide, precedence),

            _ => Err(ParserError::unexpected_token(
                "operator",
                format!("{}", token.kind),
                token.span,
            )),
        }
    }

    fn unary_expr(
        &mut self,
        operator: UnaryOp,
        start_span: crate::span::Span,
    ) -> ParseResult<Expr> {
        let operand = self.parse_precedence(Precedence::Unary)?;
        let span = start_span.merge(&operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn binary_expr(
        &mut self,
        left: Expr,
        operator: BinaryOp,
        precedence: Precedence,
    ) -> ParseResult<Expr> {
        let right = self.parse_precedence(precedence.next())?;
        let span = left.span.merge(&right.span);
        Ok(Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            span,
        ))
    }
}
