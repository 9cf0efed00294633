//! Binary document codec.
//!
//! The catalog persists its own state with this codec. Values are
//! tag-prefixed and length-delimited with big-endian lengths:
//!
//! ```text
//! value    := tag:u8 payload
//! payload  := ()                                      -- Null
//!           | u8                                      -- Bool
//!           | i64:be                                  -- Int64
//!           | f64 bits:be                             -- Float64
//!           | len:u32 utf8                            -- Text
//!           | len:u32 bytes                           -- Blob
//!           | count:u32 (name_len:u32 name value)*    -- Document
//!           | count:u32 value*                        -- Array
//! ```
//!
//! Decode failures report the path of the field being decoded.

use bytes::{BufMut, Bytes};

use vellum_common::{VellumError, VellumResult};

use super::{Document, Value, ValueType};

/// Encodes a document to its binary form.
#[must_use]
pub fn encode_document(doc: &Document) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    buf.put_u8(ValueType::Document.as_u8());
    encode_document_fields(doc, &mut buf);
    buf
}

/// Decodes a binary-encoded document.
pub fn decode_document(bytes: &[u8]) -> VellumResult<Document> {
    let mut decoder = Decoder::new(bytes);
    let value = decoder.decode_value()?;
    match value {
        Value::Document(doc) => Ok(doc),
        other => Err(VellumError::encoding(
            "(root)",
            format!("expected document, got {}", other.value_type()),
        )),
    }
}

/// Encodes a single value, appending to `buf`.
pub fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    buf.put_u8(value.value_type().as_u8());

    match value {
        Value::Null => {}
        Value::Bool(b) => buf.put_u8(u8::from(*b)),
        Value::Int64(i) => buf.put_i64(*i),
        Value::Float64(f) => buf.put_f64(*f),
        Value::Text(s) => {
            buf.put_u32(s.len() as u32);
            buf.put_slice(s.as_bytes());
        }
        Value::Blob(b) => {
            buf.put_u32(b.len() as u32);
            buf.put_slice(b);
        }
        Value::Document(doc) => encode_document_fields(doc, buf),
        Value::Array(values) => {
            buf.put_u32(values.len() as u32);
            for value in values {
                encode_value(value, buf);
            }
        }
    }
}

/// Decodes a single value from the start of `bytes`.
pub fn decode_value(bytes: &[u8]) -> VellumResult<Value> {
    Decoder::new(bytes).decode_value()
}

fn encode_document_fields(doc: &Document, buf: &mut Vec<u8>) {
    buf.put_u32(doc.len() as u32);
    for (name, value) in doc.iter() {
        buf.put_u32(name.len() as u32);
        buf.put_slice(name.as_bytes());
        encode_value(value, buf);
    }
}

struct Decoder<'a> {
    buf: &'a [u8],
    // Path of the field currently being decoded, for error context.
    path: Vec<String>,
}

impl<'a> Decoder<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            path: Vec::new(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> VellumError {
        let field = if self.path.is_empty() {
            "(root)".to_owned()
        } else {
            self.path.join(".")
        };
        VellumError::encoding(field, reason)
    }

    fn take(&mut self, n: usize) -> VellumResult<&'a [u8]> {
        if self.buf.len() < n {
            return Err(self.error(format!(
                "truncated data: need {n} bytes, have {}",
                self.buf.len()
            )));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn read_u8(&mut self) -> VellumResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> VellumResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn decode_value(&mut self) -> VellumResult<Value> {
        let tag = self.read_u8()?;
        let value_type = ValueType::from_u8(tag)
            .ok_or_else(|| self.error(format!("unknown type tag {tag:#04x}")))?;

        match value_type {
            ValueType::Null => Ok(Value::Null),
            ValueType::Bool => match self.read_u8()? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(self.error(format!("invalid boolean byte {other:#04x}"))),
            },
            ValueType::Int64 => {
                let bytes = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Ok(Value::Int64(i64::from_be_bytes(raw)))
            }
            ValueType::Float64 => {
                let bytes = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Ok(Value::Float64(f64::from_bits(u64::from_be_bytes(raw))))
            }
            ValueType::Text => {
                let len = self.read_u32()? as usize;
                let bytes = self.take(len)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| self.error("invalid UTF-8 in text value"))?;
                Ok(Value::Text(text.to_owned()))
            }
            ValueType::Blob => {
                let len = self.read_u32()? as usize;
                let bytes = self.take(len)?;
                Ok(Value::Blob(Bytes::copy_from_slice(bytes)))
            }
            ValueType::Document => {
                let count = self.read_u32()? as usize;
                let mut doc = Document::new();
                for _ in 0..count {
                    let name_len = self.read_u32()? as usize;
                    let name_bytes = self.take(name_len)?;
                    let name = std::str::from_utf8(name_bytes)
                        .map_err(|_| self.error("invalid UTF-8 in field name"))?
                        .to_owned();

                    self.path.push(name.clone());
                    let value = self.decode_value()?;
                    self.path.pop();

                    doc = doc.add(name, value);
                }
                Ok(Value::Document(doc))
            }
            ValueType::Array => {
                let count = self.read_u32()? as usize;
                let mut values = Vec::with_capacity(count.min(1024));
                for i in 0..count {
                    self.path.push(i.to_string());
                    values.push(self.decode_value()?);
                    self.path.pop();
                }
                Ok(Value::Array(values))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_round_trip() {
        let doc = Document::new()
            .add("name", Value::text("alice"))
            .add("age", Value::Int64(34))
            .add("score", Value::Float64(9.5))
            .add("tags", Value::Array(vec![Value::text("a"), Value::text("b")]))
            .add(
                "address",
                Value::Document(Document::new().add("city", Value::text("lyon"))),
            )
            .add("photo", Value::blob(&b"\x00\x01\x02"[..]))
            .add("deleted", Value::Null);

        let encoded = encode_document(&doc);
        let decoded = decode_document(&encoded).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_decode_preserves_field_order() {
        let doc = Document::new()
            .add("z", Value::Int64(1))
            .add("a", Value::Int64(2));

        let decoded = decode_document(&encode_document(&doc)).unwrap();
        let names: Vec<_> = decoded.iter().map(|(name, _)| name.to_owned()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_decode_error_carries_field_path() {
        let doc = Document::new().add(
            "config",
            Value::Document(Document::new().add("flag", Value::Bool(true))),
        );
        let mut encoded = encode_document(&doc);

        // Corrupt the boolean payload byte at the end.
        let last = encoded.len() - 1;
        encoded[last] = 0x7F;

        let err = decode_document(&encoded).unwrap_err();
        assert!(err.to_string().contains("config.flag"), "{err}");
    }

    #[test]
    fn test_decode_truncated() {
        let doc = Document::new().add("n", Value::Int64(7));
        let encoded = encode_document(&doc);

        let err = decode_document(&encoded[..encoded.len() - 2]).unwrap_err();
        assert!(err.to_string().contains("truncated"), "{err}");
    }

    #[test]
    fn test_decode_rejects_non_document_root() {
        let mut buf = Vec::new();
        encode_value(&Value::Int64(1), &mut buf);
        assert!(decode_document(&buf).is_err());
    }
}
