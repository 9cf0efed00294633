//! Statement parsing.

use vellum_common::VellumResult;

use crate::ast::{
    CreateTableStmt, DeleteStmt, Expr, InsertStmt, RecordSpec, SelectStmt, Statement, UpdateStmt,
};
use crate::lexer::TokenKind;

use super::Parser;

impl Parser {
    pub(crate) fn parse_select(&mut self) -> VellumResult<Statement> {
        self.expect(TokenKind::KwSelect, "SELECT")?;

        // `*` projects every field and is represented as an empty list.
        let mut fields = Vec::new();
        if !self.eat(&TokenKind::Asterisk) {
            loop {
                fields.push(self.parse_path()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::KwFrom, "FROM")?;
        let table = self.expect_ident("table name")?;

        let mut stmt = SelectStmt::new(table).with_fields(fields);
        if let Some(expr) = self.parse_optional_where()? {
            stmt = stmt.with_where(expr);
        }
        Ok(Statement::Select(stmt))
    }

    pub(crate) fn parse_delete(&mut self) -> VellumResult<Statement> {
        self.expect(TokenKind::KwDelete, "DELETE")?;
        self.expect(TokenKind::KwFrom, "FROM")?;
        let table = self.expect_ident("table name")?;

        let mut stmt = DeleteStmt::new(table);
        if let Some(expr) = self.parse_optional_where()? {
            stmt = stmt.with_where(expr);
        }
        Ok(Statement::Delete(stmt))
    }

    pub(crate) fn parse_update(&mut self) -> VellumResult<Statement> {
        self.expect(TokenKind::KwUpdate, "UPDATE")?;
        let table = self.expect_ident("table name")?;
        self.expect(TokenKind::KwSet, "SET")?;

        let mut stmt = UpdateStmt::new(table);
        loop {
            let field = self.expect_ident("field name")?;
            self.expect(TokenKind::Eq, "'='")?;
            let expr = self.parse_expression()?;
            stmt = stmt.set(field, expr);

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        if let Some(expr) = self.parse_optional_where()? {
            stmt = stmt.with_where(expr);
        }
        Ok(Statement::Update(stmt))
    }

    pub(crate) fn parse_insert(&mut self) -> VellumResult<Statement> {
        self.expect(TokenKind::KwInsert, "INSERT")?;
        self.expect(TokenKind::KwInto, "INTO")?;
        let table = self.expect_ident("table name")?;

        let mut stmt = InsertStmt::new(table);

        match self.peek().kind {
            TokenKind::LParen => {
                self.advance();
                let mut fields = Vec::new();
                loop {
                    fields.push(self.expect_ident("field name")?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                stmt = stmt.with_fields(fields);

                self.expect(TokenKind::KwValues, "VALUES")?;
                self.parse_value_lists(stmt)
            }
            TokenKind::KwValues => {
                self.advance();
                self.parse_value_lists(stmt)
            }
            TokenKind::KwRecords => {
                self.advance();
                loop {
                    stmt = stmt.record(self.parse_record_spec()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                Ok(Statement::Insert(stmt))
            }
            _ => {
                let token = self.peek().clone();
                Err(self.error_at(
                    &token,
                    format!(
                        "expected VALUES, RECORDS or a field list, found {}",
                        token.kind
                    ),
                ))
            }
        }
    }

    fn parse_value_lists(&mut self, mut stmt: InsertStmt) -> VellumResult<Statement> {
        loop {
            self.expect(TokenKind::LParen, "'('")?;
            let mut list = Vec::new();
            loop {
                list.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            stmt = stmt.values(list);

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::Insert(stmt))
    }

    fn parse_record_spec(&mut self) -> VellumResult<RecordSpec> {
        let token = self.advance();
        match token.kind {
            TokenKind::LParen => {
                let mut pairs = Vec::new();
                loop {
                    let field = self.expect_ident("field name")?;
                    self.expect(TokenKind::Colon, "':'")?;
                    let expr = self.parse_expression()?;
                    pairs.push((field, expr));

                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                Ok(RecordSpec::Pairs(pairs))
            }
            TokenKind::Positional => {
                let ordinal = self.next_positional(token.line, token.col)?;
                Ok(RecordSpec::Param(Expr::PositionalParam(ordinal)))
            }
            TokenKind::NamedParam(name) => {
                self.note_named(token.line, token.col)?;
                Ok(RecordSpec::Param(Expr::NamedParam(name)))
            }
            ref kind => Err(self.error_at(
                &token,
                format!("expected a record or a parameter, found {kind}"),
            )),
        }
    }

    pub(crate) fn parse_create(&mut self) -> VellumResult<Statement> {
        self.expect(TokenKind::KwCreate, "CREATE")?;
        self.expect(TokenKind::KwTable, "TABLE")?;
        let name = self.expect_ident("table name")?;

        let mut stmt = CreateTableStmt::new(name);
        if self.eat(&TokenKind::KwIf) {
            self.expect(TokenKind::KwNot, "NOT")?;
            self.expect(TokenKind::KwExists, "EXISTS")?;
            stmt = stmt.if_not_exists();
        }
        Ok(Statement::CreateTable(stmt))
    }

    fn parse_optional_where(&mut self) -> VellumResult<Option<Expr>> {
        if self.eat(&TokenKind::KwWhere) {
            Ok(Some(self.parse_expression()?))
        } else {
            Ok(None)
        }
    }
}
