//! Recursive-descent parser.
//!
//! The parser walks the token stream top-down, dispatching on the
//! leading keyword of each statement. It aborts on the first syntax
//! error, reporting the line and column of the offending token; no
//! recovery is attempted.
//!
//! Within a single statement, positional (`?`) and named (`$name`)
//! parameters must not be mixed; positional parameters are numbered
//! from 1 in order of appearance.

mod expr;
mod stmt;

use vellum_common::{VellumError, VellumResult};

use crate::ast::{Expr, Statement};
use crate::lexer::{tokenize, Token, TokenKind};

/// Parses zero or more `;`-separated statements.
///
/// Consecutive separators are allowed and elided; an empty or
/// separator-only input yields an empty list.
pub fn parse_query(input: &str) -> VellumResult<Vec<Statement>> {
    Parser::new(input)?.parse_query()
}

/// Parses a single expression spanning the whole input.
pub fn parse_expr(input: &str) -> VellumResult<Expr> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamStyle {
    Positional,
    Named,
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    // Parameter bookkeeping, reset at each statement boundary.
    param_style: Option<ParamStyle>,
    positional_count: usize,
}

impl Parser {
    fn new(input: &str) -> VellumResult<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            param_style: None,
            positional_count: 0,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        // The trailing Eof token is never consumed.
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> VellumError {
        VellumError::syntax(token.line, token.col, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> VellumResult<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            let token = self.peek().clone();
            Err(self.error_at(&token, format!("expected {what}, found {}", token.kind)))
        }
    }

    fn expect_ident(&mut self, what: &str) -> VellumResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            kind => {
                let token = self.peek().clone();
                Err(self.error_at(&token, format!("expected {what}, found {kind}")))
            }
        }
    }

    fn expect_eof(&mut self) -> VellumResult<()> {
        let token = self.peek().clone();
        if token.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.error_at(&token, format!("unexpected token {}", token.kind)))
        }
    }

    fn parse_query(&mut self) -> VellumResult<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            while self.eat(&TokenKind::Semicolon) {}
            if self.peek().kind == TokenKind::Eof {
                return Ok(statements);
            }

            self.param_style = None;
            self.positional_count = 0;
            statements.push(self.parse_statement()?);

            let token = self.peek().clone();
            if !matches!(token.kind, TokenKind::Semicolon | TokenKind::Eof) {
                return Err(self.error_at(
                    &token,
                    format!("expected ';' after statement, found {}", token.kind),
                ));
            }
        }
    }

    fn parse_statement(&mut self) -> VellumResult<Statement> {
        match self.peek().kind {
            TokenKind::KwSelect => self.parse_select(),
            TokenKind::KwInsert => self.parse_insert(),
            TokenKind::KwUpdate => self.parse_update(),
            TokenKind::KwDelete => self.parse_delete(),
            TokenKind::KwCreate => self.parse_create(),
            _ => {
                let token = self.peek().clone();
                Err(self.error_at(
                    &token,
                    format!(
                        "expected SELECT, INSERT, UPDATE, DELETE or CREATE, found {}",
                        token.kind
                    ),
                ))
            }
        }
    }

    fn next_positional(&mut self, line: u32, col: u32) -> VellumResult<usize> {
        if self.param_style == Some(ParamStyle::Named) {
            return Err(VellumError::MixedParameters { line, col });
        }
        self.param_style = Some(ParamStyle::Positional);
        self.positional_count += 1;
        Ok(self.positional_count)
    }

    fn note_named(&mut self, line: u32, col: u32) -> VellumResult<()> {
        if self.param_style == Some(ParamStyle::Positional) {
            return Err(VellumError::MixedParameters { line, col });
        }
        self.param_style = Some(ParamStyle::Named);
        Ok(())
    }
}
