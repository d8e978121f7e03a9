//! Tolerant decoder for the serialized nested structures embedded in catalog
//! exports.
//!
//! Raw tables persisted as CSV carry genre lists, credits blocks and similar
//! fields as literal text. Upstream exports write them in Python-repr form
//! (single-quoted strings, `True`/`False`/`None`); our own persistence writes
//! JSON. [`parse_structured`] accepts both and never fails: anything that is
//! not a decodable mapping or sequence degrades to an empty sequence.

use crate::table::Cell;
use serde_json::{Map, Value};

/// Normalizes a cell to a nested structure (JSON array or object).
///
/// Already-structured cells pass through unchanged, null and empty cells
/// become an empty array, and text cells are decoded as literal structures.
/// Total: malformed input means "no data", never an error.
#[must_use]
pub fn parse_structured(cell: &Cell) -> Value {
    let empty = || Value::Array(Vec::new());

    match cell {
        Cell::Nested(value @ (Value::Array(_) | Value::Object(_))) => value.clone(),
        Cell::Text(text) => match parse_literal(text) {
            Some(value @ (Value::Array(_) | Value::Object(_))) => value,
            _ => empty(),
        },
        _ => empty(),
    }
}

/// Decodes one literal value. Returns `None` on any syntax error, including
/// trailing garbage after the value.
#[must_use]
pub fn parse_literal(input: &str) -> Option<Value> {
    let mut parser = Literal {
        bytes: input.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos == parser.bytes.len() {
        Some(value)
    } else {
        None
    }
}

struct Literal<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Literal<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Option<Value> {
        match self.peek()? {
            b'[' => self.sequence(),
            b'{' => self.mapping(),
            b'\'' | b'"' => self.string().map(Value::String),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.number(),
            _ => self.keyword(),
        }
    }

    fn sequence(&mut self) -> Option<Value> {
        self.pos += 1; // '['
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek()? == b']' {
                self.pos += 1;
                return Some(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b']' => {}
                _ => return None,
            }
        }
    }

    fn mapping(&mut self) -> Option<Value> {
        self.pos += 1; // '{'
        let mut entries = Map::new();

        loop {
            self.skip_whitespace();
            if self.peek()? == b'}' {
                self.pos += 1;
                return Some(Value::Object(entries));
            }
            let key = self.string()?;
            self.skip_whitespace();
            if self.peek()? != b':' {
                return None;
            }
            self.pos += 1;
            self.skip_whitespace();
            let value = self.value()?;
            entries.insert(key, value);
            self.skip_whitespace();
            match self.peek()? {
                b',' => self.pos += 1,
                b'}' => {}
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.peek()?;
        if quote != b'\'' && quote != b'"' {
            return None;
        }
        self.pos += 1;

        let mut raw = Vec::new();
        loop {
            let byte = self.peek()?;
            self.pos += 1;
            if byte == quote {
                return String::from_utf8(raw).ok();
            }
            if byte == b'\\' {
                let escaped = self.peek()?;
                self.pos += 1;
                raw.push(match escaped {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    other => other,
                });
            } else {
                raw.push(byte);
            }
        }
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;

        if let Ok(int) = text.parse::<i64>() {
            return Some(Value::Number(int.into()));
        }
        let float: f64 = text.parse().ok()?;
        serde_json::Number::from_f64(float).map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z')) {
            self.pos += 1;
        }
        match &self.bytes[start..self.pos] {
            b"True" | b"true" => Some(Value::Bool(true)),
            b"False" | b"false" => Some(Value::Bool(false)),
            b"None" | b"null" => Some(Value::Null),
            _ => None,
        }
    }
}
