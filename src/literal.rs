//! Literal-syntax value parser.
//!
//! Source data produced by Python pipelines embeds structured cell values as
//! Python literals: `[1, 2]`, `{'a': 1}`, `('x', 'y')`, `None`, `True`.
//! This module parses that syntax into [`serde_json::Value`] without going
//! through a Python runtime. Bare words (`hello`) are rejected so callers can
//! fall through to plainer interpretations.

use anyhow::{Result, anyhow};
use serde_json::{Map, Number, Value};

/// Parses a complete literal expression. Trailing non-whitespace input is an
/// error, as is any token the literal grammar does not cover.
pub fn parse_literal(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(anyhow!(
            "Unexpected trailing input in literal '{input}' at byte {}",
            parser.pos
        ));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'[') => self.parse_sequence(b'[', b']'),
            Some(b'(') => self.parse_sequence(b'(', b')'),
            Some(b'{') => self.parse_braced(),
            Some(b'\'' | b'"') => self.parse_string().map(Value::String),
            Some(b'+' | b'-' | b'0'..=b'9' | b'.') => self.parse_number(),
            Some(_) => self.parse_keyword(),
            None => Err(anyhow!("Unexpected end of literal '{}'", self.input)),
        }
    }

    fn parse_sequence(&mut self, open: u8, close: u8) -> Result<Value> {
        debug_assert_eq!(self.peek(), Some(open));
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                }
                Some(c) if c == close => {}
                _ => {
                    return Err(anyhow!(
                        "Expected ',' or '{}' in literal '{}' at byte {}",
                        close as char,
                        self.input,
                        self.pos
                    ));
                }
            }
        }
    }

    /// `{}` is an empty dict; otherwise the first `:` vs `,`/`}` after the
    /// first element decides between dict and set (sets become arrays).
    fn parse_braced(&mut self) -> Result<Value> {
        debug_assert_eq!(self.peek(), Some(b'{'));
        self.bump();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.bump();
            return Ok(Value::Object(Map::new()));
        }
        let first = self.parse_value()?;
        self.skip_whitespace();
        match self.peek() {
            Some(b':') => {
                self.bump();
                let mut map = Map::new();
                let value = self.parse_value()?;
                map.insert(key_string(&first)?, value);
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b'}') => {
                            self.bump();
                            return Ok(Value::Object(map));
                        }
                        Some(b',') => {
                            self.bump();
                            self.skip_whitespace();
                            if self.peek() == Some(b'}') {
                                self.bump();
                                return Ok(Value::Object(map));
                            }
                            let key = self.parse_value()?;
                            self.skip_whitespace();
                            if self.bump() != Some(b':') {
                                return Err(anyhow!(
                                    "Expected ':' after key in literal '{}' at byte {}",
                                    self.input,
                                    self.pos
                                ));
                            }
                            let value = self.parse_value()?;
                            map.insert(key_string(&key)?, value);
                        }
                        _ => {
                            return Err(anyhow!(
                                "Expected ',' or '}}' in literal '{}' at byte {}",
                                self.input,
                                self.pos
                            ));
                        }
                    }
                }
            }
            Some(b',' | b'}') => {
                let mut items = vec![first];
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b'}') => {
                            self.bump();
                            return Ok(Value::Array(items));
                        }
                        Some(b',') => {
                            self.bump();
                            self.skip_whitespace();
                            if self.peek() == Some(b'}') {
                                self.bump();
                                return Ok(Value::Array(items));
                            }
                            items.push(self.parse_value()?);
                        }
                        _ => {
                            return Err(anyhow!(
                                "Expected ',' or '}}' in literal '{}' at byte {}",
                                self.input,
                                self.pos
                            ));
                        }
                    }
                }
            }
            _ => Err(anyhow!(
                "Expected ':', ',' or '}}' in literal '{}' at byte {}",
                self.input,
                self.pos
            )),
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let quote = self.bump().expect("caller checked quote");
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(b'\\') => match self.bump() {
                    Some(b'n') => out.push('\n'),
                    Some(b't') => out.push('\t'),
                    Some(b'r') => out.push('\r'),
                    Some(b'0') => out.push('\0'),
                    Some(other) => out.push(other as char),
                    None => {
                        return Err(anyhow!(
                            "Unterminated escape in literal '{}'",
                            self.input
                        ));
                    }
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) if c.is_ascii() => out.push(c as char),
                Some(_) => {
                    // Re-read a full UTF-8 character at the previous byte.
                    self.pos -= 1;
                    let ch = self.input[self.pos..]
                        .chars()
                        .next()
                        .ok_or_else(|| anyhow!("Invalid UTF-8 in literal '{}'", self.input))?;
                    out.push(ch);
                    self.pos += ch.len_utf8();
                }
                None => {
                    return Err(anyhow!("Unterminated string in literal '{}'", self.input));
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(byte) = self.peek() {
            match byte {
                b'0'..=b'9' => {
                    self.bump();
                }
                b'.' => {
                    is_float = true;
                    self.bump();
                }
                b'e' | b'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some(b'+' | b'-')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        let text = &self.input[start..self.pos];
        if !is_float {
            if let Ok(parsed) = text.parse::<i64>() {
                return Ok(Value::Number(Number::from(parsed)));
            }
        }
        let parsed: f64 = text
            .parse()
            .map_err(|_| anyhow!("Invalid number '{text}' in literal '{}'", self.input))?;
        Number::from_f64(parsed)
            .map(Value::Number)
            .ok_or_else(|| anyhow!("Non-finite number '{text}' in literal '{}'", self.input))
    }

    fn parse_keyword(&mut self) -> Result<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'A'..=b'Z' | b'a'..=b'z')) {
            self.bump();
        }
        match &self.input[start..self.pos] {
            "None" => Ok(Value::Null),
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            word => Err(anyhow!(
                "'{word}' is not a literal in '{}' at byte {start}",
                self.input
            )),
        }
    }
}

/// JSON object keys must be strings; scalar dict keys are stringified the way
/// they would print, anything unhashable is rejected.
fn key_string(key: &Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        other => Err(anyhow!("Unsupported dict key {other}")),
    }
}
