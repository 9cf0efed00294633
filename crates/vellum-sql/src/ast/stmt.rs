//! Statement trees.

use std::fmt;

use serde::{Deserialize, Serialize};

use vellum_core::document::ValuePath;

use super::Expr;

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// A SELECT statement.
    Select(SelectStmt),
    /// An INSERT statement.
    Insert(InsertStmt),
    /// An UPDATE statement.
    Update(UpdateStmt),
    /// A DELETE statement.
    Delete(DeleteStmt),
    /// A CREATE TABLE statement.
    CreateTable(CreateTableStmt),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(s) => write!(f, "{s}"),
            Statement::Insert(s) => write!(f, "{s}"),
            Statement::Update(s) => write!(f, "{s}"),
            Statement::Delete(s) => write!(f, "{s}"),
            Statement::CreateTable(s) => write!(f, "{s}"),
        }
    }
}

/// `SELECT ( * | field, ... ) FROM table [WHERE expr]`
///
/// An empty field list means `*`: all fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    /// Projected fields; empty for `*`.
    pub fields: Vec<ValuePath>,
    /// The table to read.
    pub table: String,
    /// Optional filter predicate.
    pub where_clause: Option<Expr>,
}

impl SelectStmt {
    /// Creates a `SELECT * FROM table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            fields: Vec::new(),
            table: table.into(),
            where_clause: None,
        }
    }

    /// Sets the projected fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<ValuePath>) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn with_where(mut self, expr: Expr) -> Self {
        self.where_clause = Some(expr);
        self
    }
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.fields.is_empty() {
            write!(f, "*")?;
        } else {
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{field}")?;
            }
        }
        write!(f, " FROM {}", self.table)?;
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {expr}")?;
        }
        Ok(())
    }
}

/// `DELETE FROM table [WHERE expr]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStmt {
    /// The table to delete from.
    pub table: String,
    /// Optional filter predicate.
    pub where_clause: Option<Expr>,
}

impl DeleteStmt {
    /// Creates a `DELETE FROM table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
        }
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn with_where(mut self, expr: Expr) -> Self {
        self.where_clause = Some(expr);
        self
    }
}

impl fmt::Display for DeleteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {expr}")?;
        }
        Ok(())
    }
}

/// `UPDATE table SET field = expr, ... [WHERE expr]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStmt {
    /// The table to update.
    pub table: String,
    /// Field assignments, in parse order.
    pub assignments: Vec<(String, Expr)>,
    /// Optional filter predicate.
    pub where_clause: Option<Expr>,
}

impl UpdateStmt {
    /// Creates an `UPDATE table` with no assignments yet.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            where_clause: None,
        }
    }

    /// Appends an assignment.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, expr: Expr) -> Self {
        self.assignments.push((field.into(), expr));
        self
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn with_where(mut self, expr: Expr) -> Self {
        self.where_clause = Some(expr);
        self
    }
}

impl fmt::Display for UpdateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.table)?;
        for (i, (field, expr)) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field} = {expr}")?;
        }
        if let Some(expr) = &self.where_clause {
            write!(f, " WHERE {expr}")?;
        }
        Ok(())
    }
}

/// One record in `INSERT ... RECORDS`: either an inline list of
/// field/value pairs, or a parameter resolved at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordSpec {
    /// `(field: expr, ...)` with field order preserved.
    Pairs(Vec<(String, Expr)>),
    /// `?` or `$name`.
    Param(Expr),
}

impl fmt::Display for RecordSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSpec::Pairs(pairs) => {
                write!(f, "(")?;
                for (i, (field, expr)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}: {expr}")?;
                }
                write!(f, ")")
            }
            RecordSpec::Param(expr) => write!(f, "{expr}"),
        }
    }
}

/// `INSERT INTO table ...` in either its VALUES or RECORDS form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStmt {
    /// The table to insert into.
    pub table: String,
    /// Declared column order for the VALUES form; may be empty.
    pub fields: Vec<String>,
    /// Value lists of the VALUES form.
    pub values: Vec<Vec<Expr>>,
    /// Record specs of the RECORDS form.
    pub records: Vec<RecordSpec>,
}

impl InsertStmt {
    /// Creates an `INSERT INTO table` with no rows yet.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            values: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Sets the declared column names.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Appends one value list.
    #[must_use]
    pub fn values(mut self, list: Vec<Expr>) -> Self {
        self.values.push(list);
        self
    }

    /// Appends one record spec.
    #[must_use]
    pub fn record(mut self, spec: RecordSpec) -> Self {
        self.records.push(spec);
        self
    }
}

impl fmt::Display for InsertStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;

        if !self.records.is_empty() {
            write!(f, " RECORDS ")?;
            for (i, record) in self.records.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{record}")?;
            }
            return Ok(());
        }

        if !self.fields.is_empty() {
            write!(f, " (")?;
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{field}")?;
            }
            write!(f, ")")?;
        }

        write!(f, " VALUES ")?;
        for (i, list) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "(")?;
            for (j, expr) in list.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{expr}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// `CREATE TABLE name [IF NOT EXISTS]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStmt {
    /// The table name.
    pub name: String,
    /// Do not fail if the table already exists.
    pub if_not_exists: bool,
}

impl CreateTableStmt {
    /// Creates a `CREATE TABLE name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            if_not_exists: false,
        }
    }

    /// Adds the `IF NOT EXISTS` modifier.
    #[must_use]
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

impl fmt::Display for CreateTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE {}", self.name)?;
        if self.if_not_exists {
            write!(f, " IF NOT EXISTS")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_display() {
        let stmt = SelectStmt::new("users");
        assert_eq!(stmt.to_string(), "SELECT * FROM users");

        let stmt = SelectStmt::new("users")
            .with_fields(vec![ValuePath::parse("name"), ValuePath::parse("address.city")])
            .with_where(Expr::field("age").gt(Expr::int(21)));
        assert_eq!(
            stmt.to_string(),
            "SELECT name, address.city FROM users WHERE (age > 21)"
        );
    }

    #[test]
    fn test_update_display() {
        let stmt = UpdateStmt::new("users")
            .set("a", Expr::int(1))
            .set("b", Expr::int(2))
            .with_where(Expr::field("age").eq(Expr::int(10)));
        assert_eq!(
            stmt.to_string(),
            "UPDATE users SET a = 1, b = 2 WHERE (age = 10)"
        );
    }

    #[test]
    fn test_insert_display() {
        let stmt = InsertStmt::new("test")
            .with_fields(vec!["a".into(), "b".into()])
            .values(vec![Expr::string("c"), Expr::string("d")])
            .values(vec![Expr::string("e"), Expr::string("f")]);
        assert_eq!(
            stmt.to_string(),
            "INSERT INTO test (a, b) VALUES ('c', 'd'), ('e', 'f')"
        );

        let stmt = InsertStmt::new("test")
            .record(RecordSpec::Pairs(vec![
                ("a".into(), Expr::string("a")),
                ("b".into(), Expr::float(2.3)),
            ]))
            .record(RecordSpec::Param(Expr::named_param("foo")));
        assert_eq!(
            stmt.to_string(),
            "INSERT INTO test RECORDS (a: 'a', b: 2.3), $foo"
        );
    }

    #[test]
    fn test_create_table_display() {
        assert_eq!(
            CreateTableStmt::new("test").to_string(),
            "CREATE TABLE test"
        );
        assert_eq!(
            CreateTableStmt::new("test").if_not_exists().to_string(),
            "CREATE TABLE test IF NOT EXISTS"
        );
    }
}
