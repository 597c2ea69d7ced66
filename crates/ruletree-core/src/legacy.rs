//! Legacy persisted-format reader
//!
//! Before the move to JSON documents, condition trees were stored in the
//! platform's old array-serialization format: `a:N:{...}` arrays keyed by
//! `type` / `attribute` / `operator` / `value` / `aggregator` /
//! `conditions`. This module reads that format into the same
//! `SerializedNode` model the JSON path uses, so both representations
//! decode to identical trees. It is strictly read-only: the engine always
//! writes the current JSON format.

use crate::error::{CoreError, Result};
use crate::factory::SerializedNode;
use crate::value::Value;

/// Quick sniff for the legacy format (serialized arrays start with `a:`)
pub fn looks_legacy(doc: &str) -> bool {
    doc.trim_start().starts_with("a:")
}

/// Parse a legacy document into the persisted-node model
pub fn parse(doc: &str) -> Result<SerializedNode> {
    let mut cursor = Cursor::new(doc.trim());
    let value = cursor.parse_value()?;
    cursor.expect_end()?;
    node_from(&value)
}

/// One decoded legacy value
#[derive(Debug, Clone, PartialEq)]
enum Legacy {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<(LegacyKey, Legacy)>),
}

#[derive(Debug, Clone, PartialEq)]
enum LegacyKey {
    Int(i64),
    Str(String),
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(doc: &'a str) -> Self {
        Self {
            bytes: doc.as_bytes(),
            pos: 0,
        }
    }

    fn fail(&self, message: &str) -> CoreError {
        CoreError::MalformedTree(format!("legacy document, byte {}: {}", self.pos, message))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<u8> {
        let byte = self.peek().ok_or_else(|| self.fail("unexpected end"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let got = self.bump()?;
        if got != expected {
            return Err(self.fail(&format!(
                "expected '{}', got '{}'",
                expected as char, got as char
            )));
        }
        Ok(())
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(self.fail("trailing bytes after document"));
        }
        Ok(())
    }

    /// Read digits (with optional sign and dot) up to the next `;`
    fn read_number_text(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b';' {
                let text = std::str::from_utf8(&self.bytes[start..self.pos])
                    .map_err(|_| self.fail("non-utf8 number"))?;
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(self.fail("unterminated number"))
    }

    fn read_len(&mut self) -> Result<usize> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b':' {
                let text = std::str::from_utf8(&self.bytes[start..self.pos])
                    .map_err(|_| self.fail("non-utf8 length"))?;
                self.pos += 1;
                return text
                    .parse::<usize>()
                    .map_err(|_| self.fail("invalid length"));
            }
            self.pos += 1;
        }
        Err(self.fail("unterminated length"))
    }

    fn parse_value(&mut self) -> Result<Legacy> {
        match self.bump()? {
            b'N' => {
                self.expect(b';')?;
                Ok(Legacy::Null)
            }
            b'b' => {
                self.expect(b':')?;
                let flag = self.bump()?;
                self.expect(b';')?;
                match flag {
                    b'0' => Ok(Legacy::Bool(false)),
                    b'1' => Ok(Legacy::Bool(true)),
                    _ => Err(self.fail("invalid boolean")),
                }
            }
            b'i' => {
                self.expect(b':')?;
                let text = self.read_number_text()?;
                text.parse::<i64>()
                    .map(Legacy::Int)
                    .map_err(|_| self.fail("invalid integer"))
            }
            b'd' => {
                self.expect(b':')?;
                let text = self.read_number_text()?;
                text.parse::<f64>()
                    .map(Legacy::Float)
                    .map_err(|_| self.fail("invalid float"))
            }
            b's' => {
                self.expect(b':')?;
                let len = self.read_len()?;
                self.expect(b'"')?;
                // checked: a hostile length must not overflow the offset
                let end = self
                    .pos
                    .checked_add(len)
                    .filter(|end| *end <= self.bytes.len())
                    .ok_or_else(|| self.fail("string length past end of document"))?;
                let text = std::str::from_utf8(&self.bytes[self.pos..end])
                    .map_err(|_| self.fail("non-utf8 string"))?
                    .to_string();
                self.pos = end;
                self.expect(b'"')?;
                self.expect(b';')?;
                Ok(Legacy::Str(text))
            }
            b'a' => {
                self.expect(b':')?;
                let count = self.read_len()?;
                self.expect(b'{')?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = match self.parse_value()? {
                        Legacy::Int(i) => LegacyKey::Int(i),
                        Legacy::Str(s) => LegacyKey::Str(s),
                        _ => return Err(self.fail("array key must be int or string")),
                    };
                    let value = self.parse_value()?;
                    entries.push((key, value));
                }
                self.expect(b'}')?;
                Ok(Legacy::Array(entries))
            }
            other => Err(self.fail(&format!("unknown type marker '{}'", other as char))),
        }
    }
}

fn lookup<'v>(entries: &'v [(LegacyKey, Legacy)], key: &str) -> Option<&'v Legacy> {
    entries.iter().find_map(|(k, v)| match k {
        LegacyKey::Str(name) if name == key => Some(v),
        _ => None,
    })
}

fn scalar_from(value: &Legacy) -> Result<Value> {
    match value {
        Legacy::Null => Ok(Value::Null),
        Legacy::Bool(b) => Ok(Value::Bool(*b)),
        Legacy::Int(i) => Ok(Value::Number(*i as f64)),
        Legacy::Float(f) => Ok(Value::Number(*f)),
        Legacy::Str(s) => Ok(Value::String(s.clone())),
        Legacy::Array(entries) => {
            let items = entries
                .iter()
                .map(|(_, v)| scalar_from(v))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(items))
        }
    }
}

fn node_from(value: &Legacy) -> Result<SerializedNode> {
    let entries = match value {
        Legacy::Array(entries) => entries,
        _ => {
            return Err(CoreError::MalformedTree(
                "legacy node is not an array".to_string(),
            ))
        }
    };

    let node_type = match lookup(entries, "type") {
        Some(Legacy::Str(s)) => s.as_str(),
        _ => {
            return Err(CoreError::MalformedTree(
                "legacy node has no type discriminator".to_string(),
            ))
        }
    };

    match node_type {
        "condition" => {
            let attribute = match lookup(entries, "attribute") {
                Some(Legacy::Str(s)) => s.clone(),
                _ => {
                    return Err(CoreError::MalformedTree(
                        "legacy condition has no attribute".to_string(),
                    ))
                }
            };
            let operator = match lookup(entries, "operator") {
                Some(Legacy::Str(s)) => s.clone(),
                _ => {
                    return Err(CoreError::MalformedTree(
                        "legacy condition has no operator".to_string(),
                    ))
                }
            };
            let value = match lookup(entries, "value") {
                Some(v) => scalar_from(v)?,
                None => Value::Null,
            };
            Ok(SerializedNode::Condition {
                attribute,
                operator,
                value,
            })
        }
        "combine" => {
            let aggregator = match lookup(entries, "aggregator") {
                Some(Legacy::Str(s)) => s.clone(),
                _ => {
                    return Err(CoreError::MalformedTree(
                        "legacy combine has no aggregator".to_string(),
                    ))
                }
            };
            let negated = match lookup(entries, "negated") {
                Some(Legacy::Bool(b)) => *b,
                Some(Legacy::Int(i)) => *i != 0,
                Some(Legacy::Str(s)) => s == "1",
                _ => false,
            };
            let children = match lookup(entries, "conditions") {
                Some(Legacy::Array(child_entries)) => child_entries
                    .iter()
                    .map(|(_, child)| node_from(child))
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
                Some(_) => {
                    return Err(CoreError::MalformedTree(
                        "legacy combine conditions is not an array".to_string(),
                    ))
                }
            };
            Ok(SerializedNode::Combine {
                aggregator,
                negated,
                children,
            })
        }
        other => Err(CoreError::UnknownNodeType(other.to_string())),
    }
}
