//! Typed document values.
//!
//! A [`Value`] is a tagged union over the types Vellum understands; a
//! [`Document`] is an ordered mapping from field names to values; a
//! [`ValuePath`] names a possibly nested field.

pub mod encoding;

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use vellum_common::{VellumError, VellumResult};

/// The type tag of a [`Value`].
///
/// Discriminants are stable: they double as the type tags of the binary
/// codec in [`encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValueType {
    /// The null type.
    Null = 0,
    /// Boolean.
    Bool = 1,
    /// 64-bit signed integer.
    Int64 = 2,
    /// 64-bit floating point.
    Float64 = 3,
    /// UTF-8 text.
    Text = 4,
    /// Raw bytes.
    Blob = 5,
    /// Nested document.
    Document = 6,
    /// Ordered sequence of values.
    Array = 7,
}

impl ValueType {
    /// Returns the numeric tag.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Looks a type up by its numeric tag.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ValueType::Null),
            1 => Some(ValueType::Bool),
            2 => Some(ValueType::Int64),
            3 => Some(ValueType::Float64),
            4 => Some(ValueType::Text),
            5 => Some(ValueType::Blob),
            6 => Some(ValueType::Document),
            7 => Some(ValueType::Array),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int64 => "int64",
            ValueType::Float64 => "float64",
            ValueType::Text => "text",
            ValueType::Blob => "blob",
            ValueType::Document => "document",
            ValueType::Array => "array",
        };
        write!(f, "{name}")
    }
}

/// A typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 64-bit float.
    Float64(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Bytes),
    /// A nested document.
    Document(Document),
    /// An ordered sequence of values.
    Array(Vec<Value>),
}

impl Value {
    /// Creates a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Creates a blob value.
    pub fn blob(bytes: impl Into<Bytes>) -> Self {
        Value::Blob(bytes.into())
    }

    /// Returns this value's type tag.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int64(_) => ValueType::Int64,
            Value::Float64(_) => ValueType::Float64,
            Value::Text(_) => ValueType::Text,
            Value::Blob(_) => ValueType::Blob,
            Value::Document(_) => ValueType::Document,
            Value::Array(_) => ValueType::Array,
        }
    }

    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, expected: ValueType) -> VellumError {
        VellumError::TypeMismatch {
            expected: expected.to_string(),
            actual: self.value_type().to_string(),
        }
    }

    /// Returns the boolean inside, or `TypeMismatch`.
    pub fn as_bool(&self) -> VellumResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(ValueType::Bool)),
        }
    }

    /// Returns the integer inside, or `TypeMismatch`.
    pub fn as_i64(&self) -> VellumResult<i64> {
        match self {
            Value::Int64(i) => Ok(*i),
            other => Err(other.mismatch(ValueType::Int64)),
        }
    }

    /// Returns the float inside, or `TypeMismatch`.
    pub fn as_f64(&self) -> VellumResult<f64> {
        match self {
            Value::Float64(f) => Ok(*f),
            other => Err(other.mismatch(ValueType::Float64)),
        }
    }

    /// Returns the text inside, or `TypeMismatch`.
    pub fn as_text(&self) -> VellumResult<&str> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch(ValueType::Text)),
        }
    }

    /// Returns the blob inside, or `TypeMismatch`.
    pub fn as_blob(&self) -> VellumResult<&Bytes> {
        match self {
            Value::Blob(b) => Ok(b),
            other => Err(other.mismatch(ValueType::Blob)),
        }
    }

    /// Returns the document inside, or `TypeMismatch`.
    pub fn as_document(&self) -> VellumResult<&Document> {
        match self {
            Value::Document(d) => Ok(d),
            other => Err(other.mismatch(ValueType::Document)),
        }
    }

    /// Returns the array inside, or `TypeMismatch`.
    pub fn as_array(&self) -> VellumResult<&[Value]> {
        match self {
            Value::Array(values) => Ok(values),
            other => Err(other.mismatch(ValueType::Array)),
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value in SQL literal syntax. Text is single-quoted
    /// with embedded quotes doubled, so formatted expressions re-parse
    /// to the same value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int64(i) => write!(f, "{i}"),
            // Debug formatting keeps a trailing ".0" on round floats,
            // which re-parses as a float rather than an integer.
            Value::Float64(v) => write!(f, "{v:?}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Blob(b) => {
                write!(f, "x'")?;
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, "'")
            }
            Value::Document(d) => write!(f, "{d}"),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An ordered mapping from field names to values.
///
/// Field order is insertion order and is preserved by the codec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, returning the document for chaining.
    #[must_use]
    pub fn add(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// Returns the value of the first field with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Like [`get`](Document::get) but failing with an encoding error
    /// naming the missing field.
    pub fn require(&self, name: &str) -> VellumResult<&Value> {
        self.get(name)
            .ok_or_else(|| VellumError::encoding(name, "missing field"))
    }

    /// Iterates over the fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// A path to a possibly nested field, e.g. `address.city`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValuePath(Vec<String>);

impl ValuePath {
    /// Creates a path from its segments.
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Parses a dotted path string into its segments.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(path.split('.').map(str::to_owned).collect())
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Returns the path's segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for ValuePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl FromIterator<String> for ValuePath {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_round_trip() {
        for tag in 0..=7u8 {
            let vt = ValueType::from_u8(tag).unwrap();
            assert_eq!(vt.as_u8(), tag);
        }
        assert!(ValueType::from_u8(8).is_none());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int64(42).as_i64().unwrap(), 42);
        assert_eq!(Value::text("hi").as_text().unwrap(), "hi");
        assert!(Value::Null.is_null());

        let err = Value::Int64(1).as_text().unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected text, got int64");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Bool(true).to_string(), "TRUE");
        assert_eq!(Value::Int64(-3).to_string(), "-3");
        assert_eq!(Value::Float64(10.4).to_string(), "10.4");
        // Round floats keep their decimal point.
        assert_eq!(Value::Float64(10.0).to_string(), "10.0");
        assert_eq!(Value::text("it's").to_string(), "'it''s'");
    }

    #[test]
    fn test_document_order_and_lookup() {
        let doc = Document::new()
            .add("b", Value::Int64(2))
            .add("a", Value::Int64(1));

        let names: Vec<_> = doc.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(doc.get("a"), Some(&Value::Int64(1)));
        assert!(doc.get("c").is_none());
        assert!(doc.require("c").is_err());
    }

    #[test]
    fn test_value_path() {
        let path = ValuePath::parse("address.city");
        assert_eq!(path.segments(), &["address", "city"]);
        assert_eq!(path.to_string(), "address.city");
        assert_eq!(path, ValuePath::from("address.city"));

        let single = ValuePath::parse("age");
        assert_eq!(single.len(), 1);
    }
}
