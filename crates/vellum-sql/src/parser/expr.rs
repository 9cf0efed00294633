//! Expression parsing.
//!
//! Precedence ladder, weakest first: `OR`, `AND`, comparison, primary.
//! `OR` and `AND` are left-associative; comparison operators do not
//! chain.

use vellum_common::VellumResult;
use vellum_core::document::ValuePath;

use crate::ast::{BinaryOperator, Expr};
use crate::lexer::TokenKind;

use super::Parser;

fn comparison_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Eq => Some(BinaryOperator::Eq),
        TokenKind::Neq => Some(BinaryOperator::NotEq),
        TokenKind::Lt => Some(BinaryOperator::Lt),
        TokenKind::Lte => Some(BinaryOperator::LtEq),
        TokenKind::Gt => Some(BinaryOperator::Gt),
        TokenKind::Gte => Some(BinaryOperator::GtEq),
        _ => None,
    }
}

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> VellumResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> VellumResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::KwOr) {
            left = left.or(self.parse_and()?);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> VellumResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat(&TokenKind::KwAnd) {
            left = left.and(self.parse_comparison()?);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> VellumResult<Expr> {
        let left = self.parse_primary()?;

        if let Some(op) = comparison_operator(&self.peek().kind) {
            self.advance();
            let right = self.parse_primary()?;
            return Ok(Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> VellumResult<Expr> {
        let token = self.advance();

        match token.kind {
            TokenKind::Integer(i) => Ok(Expr::int(i)),
            TokenKind::Float(v) => Ok(Expr::float(v)),
            TokenKind::Str(s) => Ok(Expr::string(s)),
            TokenKind::KwTrue => Ok(Expr::bool(true)),
            TokenKind::KwFalse => Ok(Expr::bool(false)),
            TokenKind::KwNull => Ok(Expr::null()),
            TokenKind::Ident(first) => Ok(Expr::Field(self.parse_path_from(first)?)),
            TokenKind::Positional => {
                let ordinal = self.next_positional(token.line, token.col)?;
                Ok(Expr::PositionalParam(ordinal))
            }
            TokenKind::NamedParam(name) => {
                self.note_named(token.line, token.col)?;
                Ok(Expr::NamedParam(name))
            }
            TokenKind::KwNot => Ok(self.parse_primary()?.not()),
            TokenKind::LParen => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            ref kind => Err(self.error_at(&token, format!("expected expression, found {kind}"))),
        }
    }

    /// Continues a dotted field path whose first segment was already
    /// consumed.
    pub(crate) fn parse_path_from(&mut self, first: String) -> VellumResult<ValuePath> {
        let mut segments = vec![first];
        while self.eat(&TokenKind::Dot) {
            segments.push(self.expect_ident("field path segment")?);
        }
        Ok(ValuePath::new(segments))
    }

    /// Parses a full dotted field path.
    pub(crate) fn parse_path(&mut self) -> VellumResult<ValuePath> {
        let first = self.expect_ident("field name")?;
        self.parse_path_from(first)
    }
}
