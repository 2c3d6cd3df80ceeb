//! The token vocabulary shared by every reader and writer in this crate.
//!
//! A [`Token`] is one parse event: a structural marker, an object key, or a
//! scalar value. Readers produce tokens in document order and writers consume
//! them in the same order, so a full document is never materialized.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crate::Error;
use std::borrow::Cow;
use std::fmt;

/// One parse event, with its value payload where the event carries one.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// The start of an object (`{`).
    StartObject,
    /// The end of an object (`}`).
    EndObject,
    /// The start of an array (`[`).
    StartArray,
    /// The end of an array (`]`).
    EndArray,
    /// An object key.
    FieldName(String),
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating point value.
    Double(f64),
    /// A boolean value.
    Boolean(bool),
    /// A null value.
    Null,
    /// A binary value. JSON has no binary type, so these only appear when
    /// decoding Smile input and are rendered as base64 text.
    Binary(Vec<u8>),
}

impl Token {
    /// Returns the payload-free tag of this token.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartObject => TokenKind::StartObject,
            Token::EndObject => TokenKind::EndObject,
            Token::StartArray => TokenKind::StartArray,
            Token::EndArray => TokenKind::EndArray,
            Token::FieldName(_) => TokenKind::FieldName,
            Token::String(_) => TokenKind::String,
            Token::Integer(_) => TokenKind::Integer,
            Token::Double(_) => TokenKind::Double,
            Token::Boolean(_) => TokenKind::Boolean,
            Token::Null => TokenKind::Null,
            Token::Binary(_) => TokenKind::Binary,
        }
    }

    /// Returns the textual representation of this token, independent of its tag.
    ///
    /// Numeric text is regenerated from the parsed value rather than preserved
    /// from the input, so both sides of a round trip produce identical text.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Token::StartObject => Cow::Borrowed("{"),
            Token::EndObject => Cow::Borrowed("}"),
            Token::StartArray => Cow::Borrowed("["),
            Token::EndArray => Cow::Borrowed("]"),
            Token::FieldName(s) => Cow::Borrowed(s),
            Token::String(s) => Cow::Borrowed(s),
            Token::Integer(v) => {
                let mut buf = itoa::Buffer::new();
                Cow::Owned(buf.format(*v).to_string())
            }
            Token::Double(v) => {
                let mut buf = ryu::Buffer::new();
                Cow::Owned(buf.format(*v).to_string())
            }
            Token::Boolean(true) => Cow::Borrowed("true"),
            Token::Boolean(false) => Cow::Borrowed("false"),
            Token::Null => Cow::Borrowed("null"),
            Token::Binary(v) => Cow::Owned(STANDARD.encode(v)),
        }
    }
}

/// The tag of a [`Token`], used for lockstep comparison and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The start of an object.
    StartObject,
    /// The end of an object.
    EndObject,
    /// The start of an array.
    StartArray,
    /// The end of an array.
    EndArray,
    /// An object key.
    FieldName,
    /// A string value.
    String,
    /// An integer value.
    Integer,
    /// A floating point value.
    Double,
    /// A boolean value.
    Boolean,
    /// A null value.
    Null,
    /// A binary value.
    Binary,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::StartObject => "start-object",
            TokenKind::EndObject => "end-object",
            TokenKind::StartArray => "start-array",
            TokenKind::EndArray => "end-array",
            TokenKind::FieldName => "field-name",
            TokenKind::String => "string",
            TokenKind::Integer => "integer",
            TokenKind::Double => "double",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Binary => "binary",
        };
        f.write_str(s)
    }
}

/// A source of tokens in document order.
pub trait TokenRead {
    /// Advances to the next token, or returns `None` at a stream boundary.
    ///
    /// A reader is exhausted exactly when two consecutive calls both return
    /// `None`. Readers over formats with mid-stream segment boundaries (see
    /// [`SmileReader`](crate::SmileReader)) yield a lone `None` at each
    /// boundary and then resume.
    fn next_token(&mut self) -> Result<Option<Token>, Error>;
}

/// A sink of tokens in document order.
pub trait TokenWrite {
    /// Writes one token, including its value payload.
    fn write_token(&mut self, token: &Token) -> Result<(), Error>;

    /// Flushes trailing structure. Must be called after the last token on
    /// every exit path, including errors.
    fn close(&mut self) -> Result<(), Error>;
}
