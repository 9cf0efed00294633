//! Statement and expression AST.
//!
//! The parser emits these values; the execution layer consumes them.
//! Both trees are immutable once built, and their `Display`
//! implementations emit text that parses back to an equal tree.

mod expr;
mod stmt;

pub use expr::{BinaryOperator, Expr, UnaryOperator};
pub use stmt::{
    CreateTableStmt, DeleteStmt, InsertStmt, RecordSpec, SelectStmt, Statement, UpdateStmt,
};
