//! Expression trees.

use std::fmt;

use serde::{Deserialize, Serialize};

use vellum_core::document::{Value, ValuePath};

/// A parsed expression.
///
/// Parameter placeholders are leaf variants; they are resolved at
/// execution time against a positional list or a name map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal value.
    Literal(Value),
    /// A reference to a document field.
    Field(ValuePath),
    /// A positional parameter (`?`), numbered from 1 in order of
    /// appearance within a statement.
    PositionalParam(usize),
    /// A named parameter (`$name`).
    NamedParam(String),
    /// A binary operation.
    BinaryOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A unary operation.
    UnaryOp {
        /// Operator.
        op: UnaryOperator,
        /// Operand.
        expr: Box<Expr>,
    },
}

impl Expr {
    /// Creates a field reference from a dotted path.
    pub fn field(path: &str) -> Self {
        Expr::Field(ValuePath::parse(path))
    }

    /// Creates an integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Expr::Literal(Value::Int64(value))
    }

    /// Creates a float literal.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Expr::Literal(Value::Float64(value))
    }

    /// Creates a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Value::Text(value.into()))
    }

    /// Creates a boolean literal.
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Expr::Literal(Value::Bool(value))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub fn null() -> Self {
        Expr::Literal(Value::Null)
    }

    /// Creates a named parameter.
    pub fn named_param(name: impl Into<String>) -> Self {
        Expr::NamedParam(name.into())
    }

    /// Creates a positional parameter with the given 1-based ordinal.
    #[must_use]
    pub fn positional_param(ordinal: usize) -> Self {
        Expr::PositionalParam(ordinal)
    }

    fn binary(self, op: BinaryOperator, other: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(self),
            op,
            right: Box::new(other),
        }
    }

    /// `self = other`
    #[must_use]
    pub fn eq(self, other: Expr) -> Self {
        self.binary(BinaryOperator::Eq, other)
    }

    /// `self != other`
    #[must_use]
    pub fn neq(self, other: Expr) -> Self {
        self.binary(BinaryOperator::NotEq, other)
    }

    /// `self < other`
    #[must_use]
    pub fn lt(self, other: Expr) -> Self {
        self.binary(BinaryOperator::Lt, other)
    }

    /// `self <= other`
    #[must_use]
    pub fn lte(self, other: Expr) -> Self {
        self.binary(BinaryOperator::LtEq, other)
    }

    /// `self > other`
    #[must_use]
    pub fn gt(self, other: Expr) -> Self {
        self.binary(BinaryOperator::Gt, other)
    }

    /// `self >= other`
    #[must_use]
    pub fn gte(self, other: Expr) -> Self {
        self.binary(BinaryOperator::GtEq, other)
    }

    /// `self AND other`
    #[must_use]
    pub fn and(self, other: Expr) -> Self {
        self.binary(BinaryOperator::And, other)
    }

    /// `self OR other`
    #[must_use]
    pub fn or(self, other: Expr) -> Self {
        self.binary(BinaryOperator::Or, other)
    }

    /// `NOT self`
    #[must_use]
    pub fn not(self) -> Self {
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(self),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Field(path) => write!(f, "{path}"),
            Expr::PositionalParam(_) => write!(f, "?"),
            Expr::NamedParam(name) => write!(f, "${name}"),
            Expr::BinaryOp { left, op, right } => write!(f, "({left} {op} {right})"),
            Expr::UnaryOp { op, expr } => write!(f, "{op} {expr}"),
        }
    }
}

/// Binary operators, weakest binding first: `OR`, `AND`, then the
/// comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    /// Equal.
    Eq,
    /// Not equal.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl BinaryOperator {
    /// Returns true if this is a comparison operator.
    #[must_use]
    pub fn is_comparison(&self) -> bool {
        !self.is_logical()
    }

    /// Returns true if this is a logical connective.
    #[must_use]
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Eq => write!(f, "="),
            BinaryOperator::NotEq => write!(f, "!="),
            BinaryOperator::Lt => write!(f, "<"),
            BinaryOperator::LtEq => write!(f, "<="),
            BinaryOperator::Gt => write!(f, ">"),
            BinaryOperator::GtEq => write!(f, ">="),
            BinaryOperator::And => write!(f, "AND"),
            BinaryOperator::Or => write!(f, "OR"),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Logical NOT.
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => write!(f, "NOT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_builders() {
        let expr = Expr::field("age").eq(Expr::int(10));
        assert!(matches!(
            expr,
            Expr::BinaryOp {
                op: BinaryOperator::Eq,
                ..
            }
        ));
    }

    #[test]
    fn test_expr_display() {
        let expr = Expr::field("age").gte(Expr::int(10));
        assert_eq!(expr.to_string(), "(age >= 10)");

        let expr = Expr::field("a").eq(Expr::int(1)).and(Expr::field("b").lt(Expr::float(2.5)));
        assert_eq!(expr.to_string(), "((a = 1) AND (b < 2.5))");

        let expr = Expr::field("name").eq(Expr::string("it's"));
        assert_eq!(expr.to_string(), "(name = 'it''s')");

        assert_eq!(Expr::named_param("age").to_string(), "$age");
        assert_eq!(Expr::positional_param(2).to_string(), "?");
        assert_eq!(Expr::bool(true).not().to_string(), "NOT TRUE");
    }

    #[test]
    fn test_operator_predicates() {
        assert!(BinaryOperator::Eq.is_comparison());
        assert!(BinaryOperator::GtEq.is_comparison());
        assert!(!BinaryOperator::And.is_comparison());
        assert!(BinaryOperator::Or.is_logical());
    }
}
