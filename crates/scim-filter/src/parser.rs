//! SCIM path and filter parser (RFC 7644 §3.4.2.2, §3.5.2).
//!
//! ```text
//! PATH      = attrPath / valuePath [subAttr]
//! FILTER    = attrExp / logExp / valuePath / *1"not" "(" FILTER ")"
//! valuePath = attrPath "[" valFilter "]"
//! attrExp   = (attrPath SP "pr") / (attrPath SP compareOp SP compValue)
//! logExp    = FILTER SP ("and" / "or") SP FILTER
//! attrPath  = [URI ":"] ATTRNAME *1subAttr
//! ```
//!
//! `and` binds tighter than `or`. Keywords and operators are case-insensitive.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::types::*;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Invalid attribute name: {0}")]
    InvalidAttributeName(String),
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Invalid comparison value")]
    InvalidCompareValue,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Unexpected trailing input: {0}")]
    TrailingInput(String),
}

/// SCIM path / filter parser.
pub struct ScimPathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ScimPathParser<'a> {
    /// Parse a PATCH operation path, e.g. `emails[type eq "work"].value`.
    pub fn parse_path(input: &'a str) -> Result<Path, ParseError> {
        let mut parser = Self { input, pos: 0 };
        let path = parser.path()?;
        parser.finish()?;
        Ok(path)
    }

    /// Parse a standalone filter expression, e.g. `userName eq "bjensen"`.
    pub fn parse_filter(input: &'a str) -> Result<Expression, ParseError> {
        let mut parser = Self { input, pos: 0 };
        let expr = parser.filter()?;
        parser.finish()?;
        Ok(expr)
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.is_at_end() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput(self.input[self.pos..].to_string()))
        }
    }

    fn path(&mut self) -> Result<Path, ParseError> {
        self.skip_whitespace();
        let attr = self.attribute_path()?;
        let mut path = Path {
            uri_prefix: attr.uri_prefix,
            attribute_name: attr.attribute_name,
            sub_attribute: attr.sub_attribute,
            value_expression: None,
        };

        if self.peek() == Some('[') {
            // `name.givenName[...]` is not a valuePath
            if path.sub_attribute.is_some() {
                return Err(ParseError::UnexpectedChar('['));
            }
            self.advance();
            let expr = self.filter()?;
            self.skip_whitespace();
            self.expect(']')?;
            path.value_expression = Some(expr);

            if self.peek() == Some('.') {
                self.advance();
                let sub = self.take_token();
                path.sub_attribute = Some(check_attribute_name(sub)?);
            }
        }

        Ok(path)
    }

    fn filter(&mut self) -> Result<Expression, ParseError> {
        self.or_expression()
    }

    fn or_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.and_expression()?;
        self.skip_whitespace();

        while self.peek_keyword("or") {
            self.advance_by(2);
            let right = self.and_expression()?;
            left = Expression::Logical {
                operator: LogicalOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
            self.skip_whitespace();
        }

        Ok(left)
    }

    fn and_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.unary_expression()?;
        self.skip_whitespace();

        while self.peek_keyword("and") {
            self.advance_by(3);
            let right = self.unary_expression()?;
            left = Expression::Logical {
                operator: LogicalOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
            self.skip_whitespace();
        }

        Ok(left)
    }

    fn unary_expression(&mut self) -> Result<Expression, ParseError> {
        self.skip_whitespace();

        if self.peek_keyword("not") {
            self.advance_by(3);
            self.skip_whitespace();
            self.expect('(')?;
            let expr = self.filter()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(Expression::Not(Box::new(expr)));
        }

        if self.peek() == Some('(') {
            self.advance();
            let expr = self.filter()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(expr);
        }

        self.attribute_expression()
    }

    fn attribute_expression(&mut self) -> Result<Expression, ParseError> {
        let path = self.attribute_path()?;

        if self.peek() == Some('[') {
            self.advance();
            let filter = self.filter()?;
            self.skip_whitespace();
            self.expect(']')?;
            return Ok(Expression::ValuePath {
                path,
                filter: Box::new(filter),
            });
        }

        self.skip_whitespace();
        let keyword = self.take_word();
        if keyword.is_empty() {
            return match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar(c)),
                None => Err(ParseError::UnexpectedEnd),
            };
        }
        if keyword.eq_ignore_ascii_case("pr") {
            return Ok(Expression::Present(path));
        }
        let operator = CompareOperator::from_keyword(keyword)
            .ok_or_else(|| ParseError::UnknownOperator(keyword.to_string()))?;

        self.skip_whitespace();
        let value = self.compare_value()?;
        Ok(Expression::Attribute {
            path,
            operator,
            value,
        })
    }

    fn attribute_path(&mut self) -> Result<AttributePath, ParseError> {
        let token = self.take_token();
        if token.is_empty() {
            return match self.peek() {
                Some(c) => Err(ParseError::UnexpectedChar(c)),
                None => Err(ParseError::UnexpectedEnd),
            };
        }
        split_attribute_path(token)
    }

    fn compare_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some('"') => Ok(Value::String(self.parse_string()?)),
            Some('-') | Some('0'..='9') => self.parse_number(),
            Some(_) => {
                let word = self.take_word();
                if word.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if word.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else if word.eq_ignore_ascii_case("null") {
                    Ok(Value::Null)
                } else {
                    Err(ParseError::InvalidCompareValue)
                }
            }
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('b') => result.push('\u{08}'),
                        Some('f') => result.push('\u{0c}'),
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('u') => {
                            self.advance();
                            result.push(self.parse_unicode_escape()?);
                            continue;
                        }
                        _ => return Err(ParseError::InvalidEscape),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    /// Reads the hex digits of a `\uXXXX` escape (the `\u` is already consumed),
    /// including a trailing low surrogate when the first unit is a high surrogate.
    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.parse_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            if !self.peek_str("\\u") {
                return Err(ParseError::InvalidEscape);
            }
            self.advance_by(2);
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(ParseError::InvalidEscape);
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code).ok_or(ParseError::InvalidEscape);
        }
        char::from_u32(high).ok_or(ParseError::InvalidEscape)
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let digits = self.input[self.pos..]
            .get(..4)
            .ok_or(ParseError::InvalidEscape)?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidEscape)?;
        self.advance_by(4);
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let mut is_float = false;

        if self.peek() == Some('-') {
            self.advance();
        }

        if !matches!(self.peek(), Some('0'..='9')) {
            return Err(ParseError::InvalidNumber);
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }

        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber);
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber);
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        if !is_float {
            if let Ok(n) = num_str.parse::<i64>() {
                return Ok(Value::from(n));
            }
        }
        let f = num_str.parse::<f64>().map_err(|_| ParseError::InvalidNumber)?;
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or(ParseError::InvalidNumber)
    }

    /// Consumes an attribute-path token: everything up to whitespace or a
    /// bracket / parenthesis.
    fn take_token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')') {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    fn take_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    /// True if the input continues with `kw` (case-insensitive) followed by a
    /// delimiter, so `notes` or `order` never read as keywords.
    fn peek_keyword(&self, kw: &str) -> bool {
        let rest = &self.input[self.pos..];
        match rest.get(..kw.len()) {
            Some(head) if head.eq_ignore_ascii_case(kw) => {
                matches!(rest[kw.len()..].chars().next(), Some(c) if c.is_whitespace() || c == '(')
            }
            _ => false,
        }
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(ParseError::UnexpectedChar(c)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}

/// Splits `urn:...:User:name.givenName` into URI prefix, name and sub-attribute.
///
/// The URI ends at the last `:`; schema URIs may contain dots (`2.0`) but the
/// attribute part never contains a colon.
fn split_attribute_path(token: &str) -> Result<AttributePath, ParseError> {
    let (uri_prefix, rest) = match token.rfind(':') {
        Some(0) => return Err(ParseError::InvalidAttributeName(token.to_string())),
        Some(idx) => (Some(token[..idx].to_string()), &token[idx + 1..]),
        None => (None, token),
    };

    let (name, sub) = match rest.split_once('.') {
        Some((name, sub)) => (name, Some(sub)),
        None => (rest, None),
    };

    Ok(AttributePath {
        uri_prefix,
        attribute_name: check_attribute_name(name)?,
        sub_attribute: sub.map(check_attribute_name).transpose()?,
    })
}

/// `ATTRNAME = ALPHA *(nameChar)`, plus the `$ref` special case.
fn check_attribute_name(name: &str) -> Result<String, ParseError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name.to_string())
    } else {
        Err(ParseError::InvalidAttributeName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_uri_with_dotted_version() {
        let attr = split_attribute_path(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.value",
        )
        .unwrap();
        assert_eq!(
            attr.uri_prefix.as_deref(),
            Some("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User")
        );
        assert_eq!(attr.attribute_name, "manager");
        assert_eq!(attr.sub_attribute.as_deref(), Some("value"));
    }

    #[test]
    fn split_rejects_leading_colon() {
        assert!(split_attribute_path(":name").is_err());
    }

    #[test]
    fn attribute_names() {
        assert!(check_attribute_name("$ref").is_ok());
        assert!(check_attribute_name("x509Certificates").is_ok());
        assert!(check_attribute_name("9lives").is_err());
        assert!(check_attribute_name("").is_err());
        assert!(check_attribute_name("a b").is_err());
    }

    #[test]
    fn keyword_needs_delimiter() {
        let parser = ScimPathParser { input: "notes eq 1", pos: 0 };
        assert!(!parser.peek_keyword("not"));
        let parser = ScimPathParser { input: "NOT (a pr)", pos: 0 };
        assert!(parser.peek_keyword("not"));
    }

    #[test]
    fn numbers_keep_integer_kind() {
        let expr = ScimPathParser::parse_filter("age gt 42").unwrap();
        match expr {
            Expression::Attribute { value, .. } => assert_eq!(value, json!(42)),
            other => panic!("unexpected {other:?}"),
        }
        let expr = ScimPathParser::parse_filter("score le -1.5e2").unwrap();
        match expr {
            Expression::Attribute { value, .. } => assert_eq!(value, json!(-150.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unicode_escapes() {
        let expr =
            ScimPathParser::parse_filter(r#"displayName eq "caf\u00e9 \ud83d\ude00""#).unwrap();
        assert_eq!(expr, Expression::equals("displayName", "café 😀"));
    }
}
