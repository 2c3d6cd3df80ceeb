//! Decode Smile data into a token stream.
use crate::read::{IoRead, Read, SliceRead};
use crate::smile::string_cache::DecodeCache;
use crate::smile::SmileOptions;
use crate::token::{Token, TokenRead};
use crate::Error;
use std::convert::TryFrom;
use std::io::BufRead;
use std::str;

const DEPTH_LIMIT: usize = 128;

enum Scope {
    Array,
    Object { expect_key: bool },
}

/// A structure that decodes Smile data into a stream of tokens.
///
/// A Smile stream may contain several independently-headered documents with no
/// outer terminator. The reader yields a lone `None` at each such segment
/// boundary (an explicit `0xff` end-of-stream marker, or a fresh `:)\n` header
/// at root position) and then resumes with the next document's tokens. True
/// end of input yields `None` on every subsequent call, so callers distinguish
/// the two by requesting one more token.
pub struct SmileReader<R> {
    reader: R,
    require_header: bool,
    header_checked: bool,
    shared_strings: Option<DecodeCache>,
    shared_properties: Option<DecodeCache>,
    stack: Vec<Scope>,
}

impl<'a> SmileReader<SliceRead<'a>> {
    /// Creates a `SmileReader` from an in-memory buffer.
    pub fn from_slice(slice: &'a [u8], options: &SmileOptions) -> Self {
        SmileReader::new(SliceRead::new(slice), options)
    }
}

impl<R> SmileReader<IoRead<R>>
where
    R: BufRead,
{
    /// Creates a `SmileReader` from a buffered IO stream.
    pub fn from_reader(reader: R, options: &SmileOptions) -> Self {
        SmileReader::new(IoRead::new(reader), options)
    }
}

impl<R> SmileReader<R>
where
    R: Read,
{
    /// Creates a new `SmileReader`.
    ///
    /// The header is parsed lazily on the first token request, so an empty
    /// input is not an error: it simply produces no tokens.
    pub fn new(reader: R, options: &SmileOptions) -> Self {
        SmileReader {
            reader,
            require_header: options.require_header,
            header_checked: false,
            shared_strings: None,
            shared_properties: None,
            stack: vec![],
        }
    }

    fn read_header(&mut self) -> Result<(), Error> {
        let header = self
            .reader
            .read(4)?
            .ok_or_else(Error::eof_while_parsing_header)?;
        if !header.starts_with(b":)\n") {
            return Err(Error::invalid_header());
        }

        let info = header[3];
        if info & 0xf0 != 0 {
            return Err(Error::unsupported_version());
        }

        self.shared_strings = if info & 0x02 != 0 {
            Some(DecodeCache::new())
        } else {
            None
        };
        self.shared_properties = if info & 0x01 != 0 {
            Some(DecodeCache::new())
        } else {
            None
        };

        Ok(())
    }

    // Headerless input decodes with the Smile specification defaults.
    fn assume_default_header(&mut self) {
        self.shared_strings = None;
        self.shared_properties = Some(DecodeCache::new());
    }

    fn check_header(&mut self) -> Result<bool, Error> {
        match self.reader.peek()? {
            None => return Ok(false),
            Some(b':') => self.read_header()?,
            Some(_) if self.require_header => return Err(Error::invalid_header()),
            Some(_) => self.assume_default_header(),
        }

        self.header_checked = true;
        Ok(true)
    }

    fn parse_u8(&mut self) -> Result<u8, Error> {
        self.reader
            .next()?
            .ok_or_else(Error::eof_while_parsing_value)
    }

    fn parse_vint(&mut self, byte_limit: usize) -> Result<u64, Error> {
        let mut value = 0;
        for _ in 0..byte_limit {
            let byte = self.parse_u8()?;
            let end = byte & 0x80 != 0;

            let shift = if end { 6 } else { 7 };
            value = value << shift | byte as u64 & 0x7f;

            if end {
                return Ok(value);
            }
        }

        Err(Error::unterminated_vint())
    }

    fn parse_i32(&mut self) -> Result<Token, Error> {
        let vint = self.parse_vint(5)? as u32;
        Ok(Token::Integer(zigzag_i32(vint) as i64))
    }

    fn parse_i64(&mut self) -> Result<Token, Error> {
        let vint = self.parse_vint(10)?;
        Ok(Token::Integer(zigzag_i64(vint)))
    }

    fn parse_f32(&mut self) -> Result<Token, Error> {
        let buf = self
            .reader
            .read(5)?
            .ok_or_else(Error::eof_while_parsing_value)?;
        let raw = (buf[0] as u32) << 28
            | (buf[1] as u32) << 21
            | (buf[2] as u32) << 14
            | (buf[3] as u32) << 7
            | (buf[4] as u32);
        Ok(Token::Double(f32::from_bits(raw) as f64))
    }

    fn parse_f64(&mut self) -> Result<Token, Error> {
        let buf = self
            .reader
            .read(10)?
            .ok_or_else(Error::eof_while_parsing_value)?;
        let raw = (buf[0] as u64) << 63
            | (buf[1] as u64) << 56
            | (buf[2] as u64) << 49
            | (buf[3] as u64) << 42
            | (buf[4] as u64) << 35
            | (buf[5] as u64) << 28
            | (buf[6] as u64) << 21
            | (buf[7] as u64) << 14
            | (buf[8] as u64) << 7
            | (buf[9] as u64);
        Ok(Token::Double(f64::from_bits(raw)))
    }

    fn parse_7_bit_binary(&mut self) -> Result<Vec<u8>, Error> {
        let raw_len = self.parse_vint(10)?;
        let chunks = raw_len / 7;
        let remainder = raw_len % 7;
        let encoded_remainder = if remainder == 0 { 0 } else { remainder + 1 };

        let encoded_len = chunks
            .checked_mul(8)
            .and_then(|v| v.checked_add(encoded_remainder))
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(Error::buffer_length_overflow)?;

        let buf = self
            .reader
            .read_mut(encoded_len)?
            .ok_or_else(Error::eof_while_parsing_value)?;

        let mut in_base = 0;
        let mut out_base = 0;
        for _ in 0..chunks {
            buf[out_base] = buf[in_base] << 1 | buf[in_base + 1] >> 6;
            buf[out_base + 1] = buf[in_base + 1] << 2 | buf[in_base + 2] >> 5;
            buf[out_base + 2] = buf[in_base + 2] << 3 | buf[in_base + 3] >> 4;
            buf[out_base + 3] = buf[in_base + 3] << 4 | buf[in_base + 4] >> 3;
            buf[out_base + 4] = buf[in_base + 4] << 5 | buf[in_base + 5] >> 2;
            buf[out_base + 5] = buf[in_base + 5] << 6 | buf[in_base + 6] >> 1;
            buf[out_base + 6] = buf[in_base + 6] << 7 | buf[in_base + 7];

            in_base += 8;
            out_base += 7;
        }

        if remainder > 0 {
            // the last byte is annoyingly right-aligned
            buf[in_base + remainder as usize] <<= 7 - remainder as usize;

            for i in 0..(remainder as usize) {
                buf[out_base + i] = buf[in_base + i] << (i + 1) | buf[in_base + i + 1] >> (6 - i);
            }
        }

        Ok(buf[..raw_len as usize].to_vec())
    }

    fn parse_big_integer(&mut self) -> Result<Token, Error> {
        let buf = self.parse_7_bit_binary()?;

        if buf.is_empty() {
            return Ok(Token::Integer(0));
        }

        if buf.len() <= 8 {
            let mut out = [(buf[0] as i8 >> 7) as u8; 8];
            out[8 - buf.len()..].copy_from_slice(&buf);
            return Ok(Token::Integer(i64::from_be_bytes(out)));
        }

        if buf.len() == 9 && buf[0] == 0 {
            let mut out = [0; 8];
            out.copy_from_slice(&buf[1..]);
            let v = u64::from_be_bytes(out);
            if let Ok(v) = i64::try_from(v) {
                return Ok(Token::Integer(v));
            }
        }

        Err(Error::unsupported_big_integer())
    }

    fn parse_raw_binary(&mut self) -> Result<Token, Error> {
        let len = self.parse_vint(10)?;
        let len = usize::try_from(len).map_err(|_| Error::buffer_length_overflow())?;
        let buf = self
            .reader
            .read(len)?
            .ok_or_else(Error::eof_while_parsing_value)?;
        Ok(Token::Binary(buf.to_vec()))
    }

    fn parse_shared_string(&mut self, reference: u16) -> Result<Token, Error> {
        let s = self
            .shared_strings
            .as_ref()
            .and_then(|c| c.get(reference))
            .ok_or_else(Error::invalid_string_reference)?;
        Ok(Token::String(s.to_string()))
    }

    fn parse_long_shared_string(&mut self, reference_hi: u8) -> Result<Token, Error> {
        let reference_lo = self.parse_u8()?;
        let reference = (reference_hi as u16) << 8 | reference_lo as u16;
        self.parse_shared_string(reference)
    }

    fn parse_short_string(&mut self, len: usize) -> Result<Token, Error> {
        let buf = self
            .reader
            .read(len)?
            .ok_or_else(Error::eof_while_parsing_value)?;
        let s = str::from_utf8(buf)
            .map_err(|_| Error::invalid_utf8())?
            .to_string();

        if s.len() <= 64 {
            if let Some(shared_strings) = &mut self.shared_strings {
                shared_strings.intern(&s);
            }
        }

        Ok(Token::String(s))
    }

    fn parse_long_string(&mut self) -> Result<Token, Error> {
        let buf = self
            .reader
            .read_until(0xfc)?
            .ok_or_else(Error::eof_while_parsing_value)?;
        let s = str::from_utf8(buf).map_err(|_| Error::invalid_utf8())?;
        Ok(Token::String(s.to_string()))
    }

    fn parse_value(&mut self) -> Result<Token, Error> {
        match self.parse_u8()? {
            0x00 => Err(Error::reserved_token()),
            token @ 0x01..=0x1f => self.parse_shared_string(token as u16 - 1),
            0x20 => Ok(Token::String(String::new())),
            0x21 => Ok(Token::Null),
            0x22 => Ok(Token::Boolean(false)),
            0x23 => Ok(Token::Boolean(true)),
            0x24 => self.parse_i32(),
            0x25 => self.parse_i64(),
            0x26 => self.parse_big_integer(),
            0x27 => Err(Error::reserved_token()),
            0x28 => self.parse_f32(),
            0x29 => self.parse_f64(),
            0x2a => Err(Error::unsupported_big_decimal()),
            0x2b..=0x3f => Err(Error::reserved_token()),
            token @ 0x40..=0x5f => self.parse_short_string(token as usize - (0x40 - 1)),
            token @ 0x60..=0x7f => self.parse_short_string(token as usize - (0x60 - 33)),
            token @ 0x80..=0x9f => self.parse_short_string(token as usize - (0x80 - 2)),
            token @ 0xa0..=0xbf => self.parse_short_string(token as usize - (0xa0 - 34)),
            token @ 0xc0..=0xdf => Ok(Token::Integer(zigzag_i32(token as u32 - 0xc0) as i64)),
            0xe0 => self.parse_long_string(),
            0xe1..=0xe3 => Err(Error::reserved_token()),
            0xe4 => self.parse_long_string(),
            0xe5..=0xe7 => Err(Error::reserved_token()),
            0xe8 => Ok(Token::Binary(self.parse_7_bit_binary()?)),
            0xe9..=0xeb => Err(Error::reserved_token()),
            token @ 0xec..=0xef => self.parse_long_shared_string(token - 0xec),
            0xf0..=0xf7 => Err(Error::reserved_token()),
            0xf8 => Ok(Token::StartArray),
            0xf9 => Err(Error::unexpected_token()),
            0xfa => Ok(Token::StartObject),
            0xfb => Err(Error::unexpected_token()),
            0xfc => Err(Error::unexpected_token()),
            0xfd => self.parse_raw_binary(),
            0xfe => Err(Error::reserved_token()),
            0xff => Err(Error::eof_while_parsing_value()),
        }
    }

    fn parse_shared_name(&mut self, reference: u16) -> Result<Token, Error> {
        let s = self
            .shared_properties
            .as_ref()
            .and_then(|c| c.get(reference))
            .ok_or_else(Error::invalid_string_reference)?;
        Ok(Token::FieldName(s.to_string()))
    }

    fn parse_long_shared_name(&mut self, reference_hi: u8) -> Result<Token, Error> {
        let reference_lo = self.parse_u8()?;
        let reference = (reference_hi as u16) << 8 | reference_lo as u16;
        self.parse_shared_name(reference)
    }

    fn intern_name(&mut self, s: &str) {
        if s.len() <= 64 {
            if let Some(shared_properties) = &mut self.shared_properties {
                shared_properties.intern(s);
            }
        }
    }

    fn parse_short_name(&mut self, len: usize) -> Result<Token, Error> {
        let buf = self
            .reader
            .read(len)?
            .ok_or_else(Error::eof_while_parsing_value)?;
        let s = str::from_utf8(buf)
            .map_err(|_| Error::invalid_utf8())?
            .to_string();
        self.intern_name(&s);
        Ok(Token::FieldName(s))
    }

    fn parse_long_name(&mut self) -> Result<Token, Error> {
        let buf = self
            .reader
            .read_until(0xfc)?
            .ok_or_else(Error::eof_while_parsing_value)?;
        let s = str::from_utf8(buf)
            .map_err(|_| Error::invalid_utf8())?
            .to_string();
        self.intern_name(&s);
        Ok(Token::FieldName(s))
    }

    fn parse_key(&mut self) -> Result<Token, Error> {
        let byte = self
            .reader
            .next()?
            .ok_or_else(Error::eof_while_parsing_map)?;
        match byte {
            0x00..=0x1f => Err(Error::reserved_token()),
            0x20 => Ok(Token::FieldName(String::new())),
            0x21..=0x2f => Err(Error::reserved_token()),
            token @ 0x30..=0x33 => self.parse_long_shared_name(token - 0x30),
            0x34 => self.parse_long_name(),
            0x35..=0x39 => Err(Error::reserved_token()),
            0x3a => Err(Error::unexpected_token()),
            0x3b..=0x3f => Err(Error::reserved_token()),
            token @ 0x40..=0x7f => self.parse_shared_name(token as u16 - 0x40),
            token @ 0x80..=0xbf => self.parse_short_name(token as usize - (0x80 - 1)),
            token @ 0xc0..=0xf7 => self.parse_short_name(token as usize - (0xc0 - 2)),
            0xf8..=0xfa => Err(Error::reserved_token()),
            0xfb => Ok(Token::EndObject),
            0xfc..=0xff => Err(Error::reserved_token()),
        }
    }

    fn value_complete(&mut self) {
        if let Some(Scope::Object { expect_key }) = self.stack.last_mut() {
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
}

impl<R> TokenRead for SmileReader<R>
where
    R: Read,
{
    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        if !self.header_checked && !self.check_header()? {
            return Ok(None);
        }

        let token = match self.stack.last() {
            None => match self.reader.peek()? {
                None => return Ok(None),
                Some(0xff) => {
                    // end-of-stream marker: a segment boundary, the next
                    // segment (if any) starts from a fresh header
                    self.reader.consume();
                    self.header_checked = false;
                    return Ok(None);
                }
                Some(b':') => {
                    // a new header at root position: another document was
                    // concatenated onto this stream
                    self.header_checked = false;
                    return Ok(None);
                }
                Some(_) => self.parse_value()?,
            },
            Some(Scope::Array) => match self.reader.peek()? {
                None => return Err(Error::eof_while_parsing_array()),
                Some(0xf9) => {
                    self.reader.consume();
                    Token::EndArray
                }
                Some(_) => self.parse_value()?,
            },
            Some(Scope::Object { expect_key: true }) => self.parse_key()?,
            Some(Scope::Object { expect_key: false }) => self.parse_value()?,
        };

        match &token {
            Token::StartObject => self.push_scope(Scope::Object { expect_key: true })?,
            Token::StartArray => self.push_scope(Scope::Array)?,
            Token::EndObject | Token::EndArray => {
                self.stack.pop();
                self.value_complete();
            }
            Token::FieldName(_) => {
                if let Some(Scope::Object { expect_key }) = self.stack.last_mut() {
                    *expect_key = false;
                }
            }
            _ => self.value_complete(),
        }

        Ok(Some(token))
    }
}

#[inline]
fn zigzag_i32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ (-((v & 1) as i32))
}

#[inline]
fn zigzag_i64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ (-((v & 1) as i64))
}
