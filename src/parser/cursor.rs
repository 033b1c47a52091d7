//! Anchored-pattern tokenizer over a text cursor.
//!
//! Both grammars are parsed by recursive descent where every production
//! peeks at or consumes a [`Pattern`] at the current offset.

use crate::error::ParseError;
use regex::Regex;
use std::sync::OnceLock;

/// Number of characters of remaining input quoted in errors.
const EXCERPT_LEN: usize = 10;

/// A token pattern, compiled on first use and anchored at the cursor.
#[derive(Debug)]
pub struct Pattern {
    name: &'static str,
    source: &'static str,
    compiled: OnceLock<Regex>,
}

impl Pattern {
    /// Declare a pattern. `name` is what errors report as expected.
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            compiled: OnceLock::new(),
        }
    }

    /// Human readable name of the expected token.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn regex(&self) -> &Regex {
        self.compiled.get_or_init(|| {
            Regex::new(&format!("(?i)^(?:{})", self.source)).expect("Invalid token pattern")
        })
    }
}

/// Cursor over the unconsumed part of a grammar text.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor, skipping leading whitespace.
    pub fn new(source: &'a str) -> Self {
        let mut cursor = Self { source, offset: 0 };
        cursor.skip_whitespace();
        cursor
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    /// Byte offset of the cursor into the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Check if all input has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Match `pattern` at the cursor without advancing.
    pub fn peek(&self, pattern: &Pattern) -> Option<&'a str> {
        let rest = self.rest();
        pattern
            .regex()
            .find(rest)
            .filter(|m| !m.is_empty())
            .map(|m| &rest[..m.end()])
    }

    /// Check if `pattern` matches at the cursor.
    pub fn at(&self, pattern: &Pattern) -> bool {
        self.peek(pattern).is_some()
    }

    /// Match `pattern` at the cursor, then advance past it and any whitespace.
    pub fn consume(&mut self, pattern: &Pattern) -> Result<&'a str, ParseError> {
        match self.peek(pattern) {
            Some(token) => {
                self.offset += token.len();
                self.skip_whitespace();
                Ok(token)
            },
            None => Err(self.error(pattern.name())),
        }
    }

    /// Consume one value up to the next top-level `,` or `;`.
    ///
    /// Quoted strings and bracketed lists may contain either delimiter.
    pub fn consume_value(&mut self) -> Result<&'a str, ParseError> {
        let rest = self.rest();
        let mut depth = 0usize;
        let mut quoted = false;
        let mut escaped = false;
        let mut end = rest.len();
        for (i, c) in rest.char_indices() {
            if quoted {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => quoted = false,
                    _ => {},
                }
                continue;
            }
            match c {
                '"' => quoted = true,
                '[' | '{' | '(' => depth += 1,
                ']' | '}' | ')' => depth = depth.saturating_sub(1),
                ',' | ';' if depth == 0 => {
                    end = i;
                    break;
                },
                _ => {},
            }
        }
        let token = &rest[..end];
        if token.trim().is_empty() {
            return Err(self.error("attribute value"));
        }
        self.offset += end;
        self.skip_whitespace();
        Ok(token)
    }

    /// Build an error naming `expected` and quoting the upcoming input.
    pub fn error(&self, expected: &str) -> ParseError {
        ParseError::unexpected(expected, self.rest().chars().take(EXCERPT_LEN).collect::<String>())
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.offset += rest.len() - rest.trim_start().len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static OPEN: Pattern = Pattern::new("'{'", r"\{");
    static WORD: Pattern = Pattern::new("word", r"\w+");
    static DATASET: Pattern = Pattern::new("'dataset'", "dataset");

    #[test]
    fn peek_does_not_advance() {
        let cursor = Cursor::new("  Dataset {");
        assert_eq!(cursor.peek(&DATASET), Some("Dataset"));
        assert_eq!(cursor.peek(&DATASET), Some("Dataset"));
        assert_eq!(cursor.rest(), "Dataset {");
    }

    #[test]
    fn consume_skips_trailing_whitespace() {
        let mut cursor = Cursor::new("dataset \n\t{ x");
        assert_eq!(cursor.consume(&DATASET).unwrap(), "dataset");
        assert_eq!(cursor.rest(), "{ x");
        assert_eq!(cursor.consume(&OPEN).unwrap(), "{");
        assert_eq!(cursor.consume(&WORD).unwrap(), "x");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn matching_is_anchored() {
        let cursor = Cursor::new("x { dataset");
        assert_eq!(cursor.peek(&DATASET), None);
        assert!(!cursor.at(&OPEN));
    }

    #[test]
    fn failed_consume_is_repeatable() {
        let mut cursor = Cursor::new("Structure { Int32 a; } s;");
        let first = cursor.consume(&OPEN).unwrap_err();
        let second = cursor.consume(&OPEN).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first, ParseError::unexpected("'{'", "Structure "));
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn consume_value_respects_quotes_and_brackets() {
        let mut cursor = Cursor::new("[1, 2], \"a;b\";");
        assert_eq!(cursor.consume_value().unwrap(), "[1, 2]");
        assert_eq!(cursor.rest(), ", \"a;b\";");
        cursor.offset += 1;
        cursor.skip_whitespace();
        assert_eq!(cursor.consume_value().unwrap(), "\"a;b\"");
        assert_eq!(cursor.rest(), ";");
    }

    #[test]
    fn consume_value_rejects_empty() {
        let mut cursor = Cursor::new(";");
        assert!(cursor.consume_value().is_err());
    }
}
