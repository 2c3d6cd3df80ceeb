//! Parse JSON text into a token stream.
use crate::read::{IoRead, Read, SliceRead};
use crate::token::{Token, TokenRead};
use crate::Error;
use std::io::BufRead;

const DEPTH_LIMIT: usize = 128;

enum Scope {
    Array { first: bool },
    Object { first: bool, expect_key: bool },
}

/// A structure that parses JSON text into a stream of tokens.
///
/// Multiple whitespace-separated root values are accepted; `None` is only
/// produced once the input is exhausted at root position, so the plain copy
/// loop terminates on the first `None`.
pub struct JsonReader<R> {
    reader: R,
    stack: Vec<Scope>,
}

impl<'a> JsonReader<SliceRead<'a>> {
    /// Creates a `JsonReader` from an in-memory buffer.
    pub fn from_slice(slice: &'a [u8]) -> Self {
        JsonReader::new(SliceRead::new(slice))
    }
}

impl<R> JsonReader<IoRead<R>>
where
    R: BufRead,
{
    /// Creates a `JsonReader` from a buffered IO stream.
    pub fn from_reader(reader: R) -> Self {
        JsonReader::new(IoRead::new(reader))
    }
}

impl<R> JsonReader<R>
where
    R: Read,
{
    /// Creates a new `JsonReader`.
    pub fn new(reader: R) -> Self {
        JsonReader {
            reader,
            stack: vec![],
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), Error> {
        while let Some(b) = self.reader.peek()? {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.reader.consume(),
                _ => break,
            }
        }
        Ok(())
    }

    fn lex_literal(&mut self, expected: &'static [u8], token: Token) -> Result<Token, Error> {
        for &expected in expected {
            match self.reader.next()? {
                Some(b) if b == expected => {}
                Some(b) => return Err(Error::unexpected_character(b)),
                None => return Err(Error::eof_while_parsing_value()),
            }
        }
        Ok(token)
    }

    fn lex_hex(&mut self) -> Result<u32, Error> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = match self.reader.next()? {
                Some(b @ b'0'..=b'9') => u32::from(b - b'0'),
                Some(b @ b'a'..=b'f') => u32::from(b - b'a') + 10,
                Some(b @ b'A'..=b'F') => u32::from(b - b'A') + 10,
                _ => return Err(Error::invalid_unicode_escape()),
            };
            code = code << 4 | digit;
        }
        Ok(code)
    }

    fn lex_unicode_escape(&mut self, buf: &mut Vec<u8>) -> Result<(), Error> {
        let code = self.lex_hex()?;

        let code = match code {
            // a high surrogate must be followed by an escaped low surrogate
            0xd800..=0xdbff => {
                if self.reader.next()? != Some(b'\\') || self.reader.next()? != Some(b'u') {
                    return Err(Error::invalid_unicode_escape());
                }
                let low = self.lex_hex()?;
                if !(0xdc00..=0xdfff).contains(&low) {
                    return Err(Error::invalid_unicode_escape());
                }
                0x10000 + ((code - 0xd800) << 10) + (low - 0xdc00)
            }
            0xdc00..=0xdfff => return Err(Error::invalid_unicode_escape()),
            code => code,
        };

        let c = char::from_u32(code).ok_or_else(Error::invalid_unicode_escape)?;
        buf.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes());
        Ok(())
    }

    fn lex_string(&mut self) -> Result<String, Error> {
        // opening quote
        self.reader.consume();

        let mut buf = vec![];
        loop {
            let b = self
                .reader
                .next()?
                .ok_or_else(Error::unterminated_string)?;
            match b {
                b'"' => break,
                b'\\' => {
                    let escape = self
                        .reader
                        .next()?
                        .ok_or_else(Error::unterminated_string)?;
                    match escape {
                        b'"' | b'\\' | b'/' => buf.push(escape),
                        b'b' => buf.push(0x08),
                        b'f' => buf.push(0x0c),
                        b'n' => buf.push(b'\n'),
                        b'r' => buf.push(b'\r'),
                        b't' => buf.push(b'\t'),
                        b'u' => self.lex_unicode_escape(&mut buf)?,
                        _ => return Err(Error::invalid_escape()),
                    }
                }
                0x00..=0x1f => return Err(Error::unescaped_control_character()),
                _ => buf.push(b),
            }
        }

        String::from_utf8(buf).map_err(|_| Error::invalid_utf8())
    }

    fn lex_number(&mut self) -> Result<Token, Error> {
        let mut buf = String::new();
        while let Some(b) = self.reader.peek()? {
            match b {
                b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E' => {
                    buf.push(char::from(b));
                    self.reader.consume();
                }
                _ => break,
            }
        }

        let digits = buf.strip_prefix('-').unwrap_or(&buf);
        if digits.len() > 1 && digits.starts_with('0') && digits.as_bytes()[1].is_ascii_digit() {
            return Err(Error::invalid_number(&buf));
        }
        if digits.is_empty() || buf.ends_with('.') {
            return Err(Error::invalid_number(&buf));
        }

        if buf.contains(['.', 'e', 'E']) {
            match buf.parse() {
                Ok(v) => Ok(Token::Double(v)),
                Err(_) => Err(Error::invalid_number(&buf)),
            }
        } else {
            match buf.parse() {
                Ok(v) => Ok(Token::Integer(v)),
                // integers beyond the i64 range fall back to floating point
                Err(_) => match buf.parse() {
                    Ok(v) => Ok(Token::Double(v)),
                    Err(_) => Err(Error::invalid_number(&buf)),
                },
            }
        }
    }

    fn parse_value(&mut self) -> Result<Token, Error> {
        let b = self
            .reader
            .peek()?
            .ok_or_else(Error::eof_while_parsing_value)?;
        match b {
            b'{' => {
                self.reader.consume();
                Ok(Token::StartObject)
            }
            b'[' => {
                self.reader.consume();
                Ok(Token::StartArray)
            }
            b'"' => Ok(Token::String(self.lex_string()?)),
            b't' => self.lex_literal(b"true", Token::Boolean(true)),
            b'f' => self.lex_literal(b"false", Token::Boolean(false)),
            b'n' => self.lex_literal(b"null", Token::Null),
            b'-' | b'0'..=b'9' => self.lex_number(),
            _ => Err(Error::unexpected_character(b)),
        }
    }

    fn parse_key(&mut self) -> Result<Token, Error> {
        match self.reader.peek()? {
            Some(b'"') => Ok(Token::FieldName(self.lex_string()?)),
            Some(_) => Err(Error::expected_key_or_end()),
            None => Err(Error::eof_while_parsing_map()),
        }
    }

    fn expect_comma(&mut self) -> Result<(), Error> {
        match self.reader.next()? {
            Some(b',') => self.skip_whitespace(),
            Some(_) => Err(Error::expected_comma_or_end()),
            None => Err(Error::eof_while_parsing_value()),
        }
    }

    fn expect_colon(&mut self) -> Result<(), Error> {
        match self.reader.next()? {
            Some(b':') => self.skip_whitespace(),
            _ => Err(Error::expected_colon()),
        }
    }

    fn value_complete(&mut self) {
        if let Some(Scope::Object { expect_key, .. }) = self.stack.last_mut() {
            *expect_key = true;
        }
    }

    fn push_scope(&mut self, scope: Scope) -> Result<(), Error> {
        if self.stack.len() >= DEPTH_LIMIT {
            return Err(Error::recursion_limit_exceeded());
        }
        self.stack.push(scope);
        Ok(())
    }

    fn clear_first(&mut self) {
        match self.stack.last_mut() {
            Some(Scope::Array { first }) => *first = false,
            Some(Scope::Object { first, .. }) => *first = false,
            None => {}
        }
    }

    fn finish_token(&mut self, token: &Token) -> Result<(), Error> {
        match token {
            Token::StartObject => self.push_scope(Scope::Object {
                first: true,
                expect_key: true,
            })?,
            Token::StartArray => self.push_scope(Scope::Array { first: true })?,
            Token::EndObject | Token::EndArray => {
                self.stack.pop();
                self.value_complete();
            }
            Token::FieldName(_) => {
                if let Some(Scope::Object { expect_key, .. }) = self.stack.last_mut() {
                    *expect_key = false;
                }
            }
            _ => self.value_complete(),
        }

        Ok(())
    }
}

impl<R> TokenRead for JsonReader<R>
where
    R: Read,
{
    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        self.skip_whitespace()?;

        let scope = match self.stack.last() {
            None => None,
            Some(Scope::Array { first }) => Some((false, *first)),
            Some(Scope::Object { first, expect_key }) => {
                if *expect_key {
                    Some((true, *first))
                } else {
                    self.expect_colon()?;
                    let token = self.parse_value()?;
                    self.finish_token(&token)?;
                    return Ok(Some(token));
                }
            }
        };

        let token = match scope {
            None => {
                if self.reader.peek()?.is_none() {
                    return Ok(None);
                }
                self.parse_value()?
            }
            Some((false, first)) => match self.reader.peek()? {
                None => return Err(Error::eof_while_parsing_array()),
                Some(b']') => {
                    self.reader.consume();
                    Token::EndArray
                }
                Some(_) => {
                    if first {
                        self.clear_first();
                    } else {
                        self.expect_comma()?;
                    }
                    self.parse_value()?
                }
            },
            Some((true, first)) => match self.reader.peek()? {
                None => return Err(Error::eof_while_parsing_map()),
                Some(b'}') => {
                    self.reader.consume();
                    Token::EndObject
                }
                Some(_) => {
                    if first {
                        self.clear_first();
                    } else {
                        self.expect_comma()?;
                    }
                    self.parse_key()?
                }
            },
        };

        self.finish_token(&token)?;
        Ok(Some(token))
    }
}
