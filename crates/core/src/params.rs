//! Ordered parameter model and the PHP parameters codec.
//!
//! Generated artifacts are PHP documents of the shape
//! `<?php $parameters = array('key' => 'value', ...);` consumed by the
//! tenant application at boot. This module treats that document as
//! *data*: a recursive-descent parser reads it without ever executing
//! anything, and a deterministic serializer writes it back. The two
//! round-trip: `parse(serialize(m)) == m` for every [`ParamMap`].

use indexmap::IndexMap;

/// Insertion-ordered parameter mapping. Order is preserved through
/// parse/serialize so regenerated artifacts diff cleanly.
pub type ParamMap = IndexMap<String, ParamValue>;

/// A parameter value in a generated configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Map(ParamMap),
}

impl ParamValue {
    /// The string content, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

/// A syntax error while reading a parameters document.
#[derive(Debug, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serialize a parameter map to the artifact document.
///
/// Output is deterministic: insertion order, four-space indentation per
/// nesting level, single-quoted strings with `\` and `'` escaped, bare
/// literals for integers, booleans, and null.
pub fn serialize(params: &ParamMap) -> String {
    let mut out = String::from("<?php\n$parameters = array(\n");
    write_entries(&mut out, params, 1);
    out.push_str(");\n");
    out
}

fn write_entries(out: &mut String, map: &ParamMap, depth: usize) {
    let indent = "    ".repeat(depth);
    for (key, value) in map {
        out.push_str(&indent);
        out.push('\'');
        out.push_str(&escape_single_quoted(key));
        out.push_str("' => ");
        write_value(out, value, depth);
        out.push_str(",\n");
    }
}

fn write_value(out: &mut String, value: &ParamValue, depth: usize) {
    match value {
        ParamValue::Null => out.push_str("null"),
        ParamValue::Bool(true) => out.push_str("true"),
        ParamValue::Bool(false) => out.push_str("false"),
        ParamValue::Int(i) => out.push_str(&i.to_string()),
        ParamValue::Str(s) => {
            out.push('\'');
            out.push_str(&escape_single_quoted(s));
            out.push('\'');
        }
        ParamValue::Map(inner) => {
            out.push_str("array(\n");
            write_entries(out, inner, depth + 1);
            out.push_str(&"    ".repeat(depth));
            out.push(')');
        }
    }
}

fn escape_single_quoted(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            other => escaped.push(other),
        }
    }
    escaped
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a parameters document into a [`ParamMap`].
///
/// Accepts everything [`serialize`] emits, plus the variations found in
/// hand-edited files: `[...]` short array syntax, double-quoted
/// strings, line (`//`, `#`) and block (`/* */`) comments, and
/// arbitrary whitespace. Duplicate keys keep the last value, matching
/// PHP array literal semantics.
pub fn parse(input: &str) -> Result<ParamMap, ParseError> {
    let mut parser = Parser::new(input);
    parser.skip_trivia();
    parser.eat_keyword("<?php"); // optional opening tag
    parser.skip_trivia();
    parser.expect_keyword("$parameters")?;
    parser.skip_trivia();
    parser.expect_char(b'=')?;
    parser.skip_trivia();
    let map = parser.parse_array()?;
    parser.skip_trivia();
    parser.eat_char(b';');
    parser.skip_trivia();
    parser.eat_keyword("?>");
    parser.skip_trivia();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(map)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            offset: self.pos,
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.pos += 1;
                }
                Some(b'#') => self.skip_line(),
                Some(b'/') if self.input.get(self.pos + 1) == Some(&b'/') => self.skip_line(),
                Some(b'/') if self.input.get(self.pos + 1) == Some(&b'*') => {
                    self.pos += 2;
                    while self.pos < self.input.len() {
                        if self.input[self.pos] == b'*'
                            && self.input.get(self.pos + 1) == Some(&b'/')
                        {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    /// Consume `keyword` if it is next; returns whether it was eaten.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.input[self.pos..].starts_with(keyword.as_bytes()) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{keyword}'")))
        }
    }

    fn eat_char(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, c: u8) -> Result<(), ParseError> {
        if self.eat_char(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c as char)))
        }
    }

    /// Parse `array( ... )` or `[ ... ]` into a map.
    fn parse_array(&mut self) -> Result<ParamMap, ParseError> {
        let closer = if self.eat_keyword("array") {
            self.skip_trivia();
            self.expect_char(b'(')?;
            b')'
        } else if self.eat_char(b'[') {
            b']'
        } else {
            return Err(self.error("expected 'array(' or '['"));
        };

        let mut map = ParamMap::new();
        loop {
            self.skip_trivia();
            if self.eat_char(closer) {
                break;
            }
            let key = self.parse_string()?;
            self.skip_trivia();
            self.expect_keyword("=>")?;
            self.skip_trivia();
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_trivia();
            if !self.eat_char(b',') {
                self.skip_trivia();
                self.expect_char(closer)?;
                break;
            }
        }
        Ok(map)
    }

    fn parse_value(&mut self) -> Result<ParamValue, ParseError> {
        match self.peek() {
            Some(b'\'') | Some(b'"') => Ok(ParamValue::Str(self.parse_string()?)),
            Some(b'[') => Ok(ParamValue::Map(self.parse_array()?)),
            Some(b'a') | Some(b'A') if self.keyword_ahead("array") => {
                Ok(ParamValue::Map(self.parse_array()?))
            }
            Some(b'-') | Some(b'0'..=b'9') => self.parse_int(),
            Some(_) => self.parse_bare_literal(),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn keyword_ahead(&self, keyword: &str) -> bool {
        self.input[self.pos..]
            .get(..keyword.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(keyword.as_bytes()))
    }

    fn parse_int(&mut self) -> Result<ParamValue, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .expect("digit run is valid UTF-8");
        text.parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| self.error("invalid integer literal"))
    }

    /// `null`, `true`, `false` -- case-insensitive, as PHP accepts them.
    fn parse_bare_literal(&mut self) -> Result<ParamValue, ParseError> {
        for (keyword, value) in [
            ("null", ParamValue::Null),
            ("true", ParamValue::Bool(true)),
            ("false", ParamValue::Bool(false)),
        ] {
            if self.keyword_ahead(keyword) {
                self.pos += keyword.len();
                return Ok(value);
            }
        }
        Err(self.error("expected a value"))
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let quote = match self.bump() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.error("expected a quoted string")),
        };
        let mut out = Vec::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(b) if b == quote => break,
                Some(b'\\') => match self.bump() {
                    None => return Err(self.error("unterminated escape")),
                    Some(b'\\') => out.push(b'\\'),
                    Some(b) if b == quote => out.push(b),
                    // Double-quoted strings understand a few more
                    // escapes; single-quoted ones keep the backslash
                    // literal, matching PHP.
                    Some(b'n') if quote == b'"' => out.push(b'\n'),
                    Some(b't') if quote == b'"' => out.push(b'\t'),
                    Some(b'r') if quote == b'"' => out.push(b'\r'),
                    Some(b'$') if quote == b'"' => out.push(b'$'),
                    Some(other) => {
                        out.push(b'\\');
                        out.push(other);
                    }
                },
                Some(b) => out.push(b),
            }
        }
        String::from_utf8(out).map_err(|_| self.error("string is not valid UTF-8"))
    }
}
