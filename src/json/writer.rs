//! Render a token stream as compact JSON text.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crate::token::{Token, TokenWrite};
use crate::Error;
use std::io::Write;

enum Scope {
    Array { first: bool },
    Object { first: bool, expect_key: bool },
}

/// A structure for rendering a token stream as compact JSON text.
///
/// Successive root-level values are separated by a single space.
pub struct JsonWriter<W> {
    writer: W,
    stack: Vec<Scope>,
    root_value_written: bool,
}

impl<W> JsonWriter<W>
where
    W: Write,
{
    /// Creates a new `JsonWriter`.
    pub fn new(writer: W) -> Self {
        JsonWriter {
            writer,
            stack: vec![],
            root_value_written: false,
        }
    }

    /// Consumes the `JsonWriter`, returning the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_escaped_str(&mut self, v: &str) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(v.len() + 2);
        buf.push(b'"');
        for b in v.bytes() {
            match b {
                b'"' => buf.extend_from_slice(b"\\\""),
                b'\\' => buf.extend_from_slice(b"\\\\"),
                0x08 => buf.extend_from_slice(b"\\b"),
                0x0c => buf.extend_from_slice(b"\\f"),
                b'\n' => buf.extend_from_slice(b"\\n"),
                b'\r' => buf.extend_from_slice(b"\\r"),
                b'\t' => buf.extend_from_slice(b"\\t"),
                0x00..=0x1f => {
                    const HEX: &[u8; 16] = b"0123456789abcdef";
                    buf.extend_from_slice(&[
                        b'\\',
                        b'u',
                        b'0',
                        b'0',
                        HEX[usize::from(b >> 4)],
                        HEX[usize::from(b & 0xf)],
                    ]);
                }
                _ => buf.push(b),
            }
        }
        buf.push(b'"');
        self.writer.write_all(&buf).map_err(Error::io)
    }

    // comma/separator bookkeeping before a value is emitted in the current scope
    fn value_prefix(&mut self, token: &Token) -> Result<(), Error> {
        match self.stack.last_mut() {
            None => {
                if self.root_value_written {
                    self.writer.write_all(b" ").map_err(Error::io)?;
                }
                self.root_value_written = true;
                Ok(())
            }
            Some(Scope::Array { first }) => {
                if *first {
                    *first = false;
                    Ok(())
                } else {
                    self.writer.write_all(b",").map_err(Error::io)
                }
            }
            Some(Scope::Object { expect_key: false, .. }) => Ok(()),
            Some(Scope::Object { .. }) => Err(Error::misplaced_token(token.kind())),
        }
    }

    fn value_complete(&mut self) {
        if let Some(Scope::Object { expect_key, .. }) = self.stack.last_mut() {
            *expect_key = true;
        }
    }
}

impl<W> TokenWrite for JsonWriter<W>
where
    W: Write,
{
    fn write_token(&mut self, token: &Token) -> Result<(), Error> {
        match token {
            Token::StartObject => {
                self.value_prefix(token)?;
                self.writer.write_all(b"{").map_err(Error::io)?;
                self.stack.push(Scope::Object {
                    first: true,
                    expect_key: true,
                });
            }
            Token::EndObject => {
                match self.stack.last() {
                    Some(Scope::Object { expect_key: true, .. }) => {}
                    _ => return Err(Error::misplaced_token(token.kind())),
                }
                self.stack.pop();
                self.writer.write_all(b"}").map_err(Error::io)?;
                self.value_complete();
            }
            Token::StartArray => {
                self.value_prefix(token)?;
                self.writer.write_all(b"[").map_err(Error::io)?;
                self.stack.push(Scope::Array { first: true });
            }
            Token::EndArray => {
                match self.stack.last() {
                    Some(Scope::Array { .. }) => {}
                    _ => return Err(Error::misplaced_token(token.kind())),
                }
                self.stack.pop();
                self.writer.write_all(b"]").map_err(Error::io)?;
                self.value_complete();
            }
            Token::FieldName(name) => {
                let first = match self.stack.last_mut() {
                    Some(Scope::Object {
                        first,
                        expect_key: true,
                    }) => {
                        let f = *first;
                        *first = false;
                        f
                    }
                    _ => return Err(Error::misplaced_token(token.kind())),
                };
                if !first {
                    self.writer.write_all(b",").map_err(Error::io)?;
                }
                self.write_escaped_str(name)?;
                self.writer.write_all(b":").map_err(Error::io)?;
                if let Some(Scope::Object { expect_key, .. }) = self.stack.last_mut() {
                    *expect_key = false;
                }
            }
            Token::String(v) => {
                self.value_prefix(token)?;
                self.write_escaped_str(v)?;
                self.value_complete();
            }
            Token::Integer(v) => {
                self.value_prefix(token)?;
                let mut buf = itoa::Buffer::new();
                self.writer
                    .write_all(buf.format(*v).as_bytes())
                    .map_err(Error::io)?;
                self.value_complete();
            }
            Token::Double(v) => {
                self.value_prefix(token)?;
                let mut buf = ryu::Buffer::new();
                self.writer
                    .write_all(buf.format(*v).as_bytes())
                    .map_err(Error::io)?;
                self.value_complete();
            }
            Token::Boolean(v) => {
                self.value_prefix(token)?;
                let text: &[u8] = if *v { b"true" } else { b"false" };
                self.writer.write_all(text).map_err(Error::io)?;
                self.value_complete();
            }
            Token::Null => {
                self.value_prefix(token)?;
                self.writer.write_all(b"null").map_err(Error::io)?;
                self.value_complete();
            }
            Token::Binary(v) => {
                // JSON has no binary type; Smile binary payloads come out as
                // base64 strings, which never need escaping
                self.value_prefix(token)?;
                let mut buf = Vec::with_capacity(v.len() / 3 * 4 + 6);
                buf.push(b'"');
                buf.extend_from_slice(STANDARD.encode(v).as_bytes());
                buf.push(b'"');
                self.writer.write_all(&buf).map_err(Error::io)?;
                self.value_complete();
            }
        }

        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.writer.flush().map_err(Error::io)
    }
}
