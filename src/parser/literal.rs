//! Literal-only parser for numeric attribute values.
//!
//! Accepts numbers, double-quoted strings and bracketed lists of those,
//! nested to any depth. Nothing is ever evaluated.

use crate::error::ParseError;
use crate::schema::AttrValue;

/// Parse one literal attribute value.
pub fn parse_literal(text: &str) -> Result<AttrValue, ParseError> {
    let mut parser = LiteralParser { text, pos: 0 };
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos != text.len() {
        return Err(ParseError::invalid_number(text));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    text: &'a str,
    pos: usize,
}

impl LiteralParser<'_> {
    fn value(&mut self) -> Result<AttrValue, ParseError> {
        self.skip_whitespace();
        match self.peek_char() {
            Some('[') => self.list(),
            Some('"') => self.string(),
            Some(_) => self.number(),
            None => Err(self.invalid()),
        }
    }

    fn list(&mut self) -> Result<AttrValue, ParseError> {
        self.pos += 1;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.eat(']') {
            return Ok(AttrValue::List(items));
        }
        loop {
            items.push(self.value()?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(AttrValue::List(items));
            }
            return Err(self.invalid());
        }
    }

    fn string(&mut self) -> Result<AttrValue, ParseError> {
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.text[self.pos..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(AttrValue::Str(out));
                },
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                _ => out.push(c),
            }
        }
        Err(self.invalid())
    }

    fn number(&mut self) -> Result<AttrValue, ParseError> {
        let rest = &self.text[self.pos..];
        let end = rest
            .find(|c: char| c == ',' || c == ']' || c.is_whitespace())
            .unwrap_or(rest.len());
        let token = &rest[..end];
        let value = parse_number(token).ok_or_else(|| ParseError::invalid_number(token))?;
        self.pos += end;
        Ok(AttrValue::Number(value))
    }

    fn peek_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn invalid(&self) -> ParseError {
        ParseError::invalid_number(self.text)
    }
}

fn parse_number(token: &str) -> Option<f64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let hex = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"));
    let magnitude = match hex {
        Some(hex) => u64::from_str_radix(hex, 16).ok()? as f64,
        None => {
            // Reject words such as "infinity" that f64 parsing would accept.
            if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                return None;
            }
            digits.parse::<f64>().ok()?
        },
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> AttrValue {
        AttrValue::Number(n)
    }

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_literal("42").unwrap(), num(42.0));
        assert_eq!(parse_literal(" -1.5e3 ").unwrap(), num(-1500.0));
        assert_eq!(parse_literal(".25").unwrap(), num(0.25));
        assert_eq!(parse_literal("0x1F").unwrap(), num(31.0));
        assert_eq!(parse_literal("+7").unwrap(), num(7.0));
    }

    #[test]
    fn parses_nested_lists() {
        assert_eq!(
            parse_literal("[1, [2, 3], \"x\"]").unwrap(),
            AttrValue::List(vec![
                num(1.0),
                AttrValue::List(vec![num(2.0), num(3.0)]),
                AttrValue::Str("x".to_string()),
            ])
        );
        assert_eq!(parse_literal("[]").unwrap(), AttrValue::List(vec![]));
    }

    #[test]
    fn parses_strings_with_escapes() {
        assert_eq!(
            parse_literal(r#""a \"b\"""#).unwrap(),
            AttrValue::Str("a \"b\"".to_string())
        );
    }

    #[test]
    fn rejects_code_and_garbage() {
        assert!(parse_literal("alert(1)").is_err());
        assert!(parse_literal("1 + 2").is_err());
        assert!(parse_literal("[1, 2").is_err());
        assert!(parse_literal("infinity").is_err());
        assert!(parse_literal("\"open").is_err());
    }
}
