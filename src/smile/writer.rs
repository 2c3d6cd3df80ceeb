//! Encode a token stream as Smile data.
use crate::smile::string_cache::EncodeCache;
use crate::smile::SmileOptions;
use crate::token::{Token, TokenWrite};
use crate::Error;
use std::convert::TryFrom;
use std::io::Write;

enum Scope {
    Array,
    Object { expect_key: bool },
}

/// A structure for encoding a token stream as Smile.
pub struct SmileWriter<W> {
    writer: W,
    raw_binary: bool,
    write_end_marker: bool,
    shared_strings: Option<EncodeCache>,
    shared_properties: Option<EncodeCache>,
    stack: Vec<Scope>,
}

impl<W> SmileWriter<W>
where
    W: Write,
{
    /// Creates a new `SmileWriter`, writing the Smile header to the writer if
    /// the options call for one.
    pub fn new(mut writer: W, options: &SmileOptions) -> Result<Self, Error> {
        if options.write_header {
            let mut flags = 0;
            if options.raw_binary {
                flags |= 0x04;
            }
            if options.shared_strings {
                flags |= 0x02;
            }
            if options.shared_properties {
                flags |= 0x01;
            }
            let buf = [b':', b')', b'\n', flags];
            writer.write_all(&buf).map_err(Error::io)?;
        }

        Ok(SmileWriter {
            writer,
            raw_binary: options.raw_binary,
            write_end_marker: options.write_end_marker,
            shared_strings: if options.shared_strings {
                Some(EncodeCache::new())
            } else {
                None
            },
            shared_properties: if options.shared_properties {
                Some(EncodeCache::new())
            } else {
                None
            },
            stack: vec![],
        })
    }

    /// Consumes the `SmileWriter`, returning the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn put_u8(&mut self, b: u8) -> Result<(), Error> {
        self.writer.write_all(&[b]).map_err(Error::io)
    }

    fn write_vint(&mut self, mut v: u64) -> Result<(), Error> {
        let mut buf = [0; 10];

        let mut i = 9;
        // the last byte only stores 6 bits
        buf[i] = v as u8 & 0x3f | 0x80;
        v >>= 6;

        while v != 0 {
            i -= 1;
            buf[i] = v as u8 & 0x7f;
            v >>= 7;
        }

        self.writer.write_all(&buf[i..]).map_err(Error::io)
    }

    fn write_i32(&mut self, v: i32) -> Result<(), Error> {
        let zigzag = ((v << 1) ^ (v >> 31)) as u32 as u64;

        if zigzag < 32 {
            self.put_u8(0xc0 + zigzag as u8)
        } else {
            self.put_u8(0x24)?;
            self.write_vint(zigzag)
        }
    }

    fn write_i64(&mut self, v: i64) -> Result<(), Error> {
        match i32::try_from(v) {
            Ok(v) => self.write_i32(v),
            Err(_) => {
                self.put_u8(0x25)?;
                let zigzag = ((v << 1) ^ (v >> 63)) as u64;
                self.write_vint(zigzag)
            }
        }
    }

    // to match with the Java implementation, doubles are encoded without sign extension
    // https://github.com/FasterXML/jackson-dataformats-binary/issues/300
    fn write_f64(&mut self, v: f64) -> Result<(), Error> {
        let bits = v.to_bits();
        let buf = [
            0x29,
            (bits >> 63) as u8 & 0x7f,
            (bits >> 56) as u8 & 0x7f,
            (bits >> 49) as u8 & 0x7f,
            (bits >> 42) as u8 & 0x7f,
            (bits >> 35) as u8 & 0x7f,
            (bits >> 28) as u8 & 0x7f,
            (bits >> 21) as u8 & 0x7f,
            (bits >> 14) as u8 & 0x7f,
            (bits >> 7) as u8 & 0x7f,
            bits as u8 & 0x7f,
        ];
        self.writer.write_all(&buf).map_err(Error::io)
    }

    fn write_shared_str(&mut self, v: &str) -> Result<bool, Error> {
        let shared_strings = match &mut self.shared_strings {
            Some(shared_strings) => shared_strings,
            None => return Ok(false),
        };

        if v.len() > 64 {
            return Ok(false);
        }

        match shared_strings.get(v) {
            Some(backref) => {
                if backref <= 30 {
                    self.put_u8(backref as u8 + 1)?;
                } else {
                    let buf = [0xec | (backref >> 8) as u8, backref as u8];
                    self.writer.write_all(&buf).map_err(Error::io)?;
                }
                Ok(true)
            }
            None => {
                shared_strings.intern(v);
                Ok(false)
            }
        }
    }

    fn write_str(&mut self, v: &str) -> Result<(), Error> {
        if v.is_empty() {
            return self.put_u8(0x20);
        }

        if self.write_shared_str(v)? {
            return Ok(());
        }

        #[allow(clippy::collapsible_else_if)]
        if v.is_ascii() {
            if v.len() <= 32 {
                self.put_u8(0x40 + v.len() as u8 - 1)?;
                self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
            } else if v.len() <= 64 {
                self.put_u8(0x60 + v.len() as u8 - 33)?;
                self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
            } else {
                self.put_u8(0xe0)?;
                self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
                self.put_u8(0xfc)?;
            }
        } else {
            if v.len() <= 33 {
                self.put_u8(0x80 + v.len() as u8 - 2)?;
                self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
            } else if v.len() <= 64 {
                self.put_u8(0xa0 + v.len() as u8 - 34)?;
                self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
            } else {
                self.put_u8(0xe4)?;
                self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
                self.put_u8(0xfc)?;
            }
        }

        Ok(())
    }

    fn write_shared_property(&mut self, v: &str) -> Result<bool, Error> {
        let shared_properties = match &mut self.shared_properties {
            Some(shared_properties) => shared_properties,
            None => return Ok(false),
        };

        if v.len() > 64 {
            return Ok(false);
        }

        match shared_properties.get(v) {
            Some(backref) => {
                if backref <= 63 {
                    self.put_u8(0x40 + backref as u8)?;
                } else {
                    let buf = [0x30 | (backref >> 8) as u8, backref as u8];
                    self.writer.write_all(&buf).map_err(Error::io)?;
                }
                Ok(true)
            }
            None => {
                shared_properties.intern(v);
                Ok(false)
            }
        }
    }

    fn write_key(&mut self, v: &str) -> Result<(), Error> {
        if v.is_empty() {
            return self.put_u8(0x20);
        }

        if self.write_shared_property(v)? {
            return Ok(());
        }

        if v.len() <= 64 && v.is_ascii() {
            self.put_u8(0x80 + v.len() as u8 - 1)?;
            self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
        } else if v.len() < 57 {
            self.put_u8(0xc0 + v.len() as u8 - 2)?;
            self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
        } else {
            self.put_u8(0x34)?;
            self.writer.write_all(v.as_bytes()).map_err(Error::io)?;
            self.put_u8(0xfc)?;
        }

        Ok(())
    }

    fn write_7_bit_binary(&mut self, v: &[u8]) -> Result<(), Error> {
        self.write_vint(v.len() as u64)?;

        let mut it = v.chunks_exact(7);
        for chunk in &mut it {
            let buf = [
                chunk[0] >> 1,
                ((chunk[0] << 6) | (chunk[1] >> 2)) & 0x7f,
                ((chunk[1] << 5) | (chunk[2] >> 3)) & 0x7f,
                ((chunk[2] << 4) | (chunk[3] >> 4)) & 0x7f,
                ((chunk[3] << 3) | (chunk[4] >> 5)) & 0x7f,
                ((chunk[4] << 2) | (chunk[5] >> 6)) & 0x7f,
                ((chunk[5] << 1) | (chunk[6] >> 7)) & 0x7f,
                chunk[6] & 0x7f,
            ];
            self.writer.write_all(&buf).map_err(Error::io)?;
        }

        if it.remainder().is_empty() {
            return Ok(());
        }

        let mut buf = [0; 7];
        let len = it.remainder().len();

        for (i, &b) in it.remainder().iter().enumerate() {
            buf[i] |= b >> (i + 1);
            buf[i + 1] = (b << (6 - i)) & 0x7f;
        }
        // the last byte is annoyingly not actually shifted to its normal place
        buf[len] >>= 7 - len;
        self.writer.write_all(&buf[..len + 1]).map_err(Error::io)
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<(), Error> {
        if self.raw_binary {
            self.put_u8(0xfd)?;
            self.write_vint(v.len() as u64)?;
            self.writer.write_all(v).map_err(Error::io)
        } else {
            self.put_u8(0xe8)?;
            self.write_7_bit_binary(v)
        }
    }

    fn expecting_key(&self) -> bool {
        matches!(self.stack.last(), Some(Scope::Object { expect_key: true }))
    }

    fn value_complete(&mut self) {
        if let Some(Scope::Object { expect_key }) = self.stack.last_mut() {
            *expect_key = true;
        }
    }

    fn check_value_position(&self, token: &Token) -> Result<(), Error> {
        if self.expecting_key() {
            Err(Error::misplaced_token(token.kind()))
        } else {
            Ok(())
        }
    }
}

impl<W> TokenWrite for SmileWriter<W>
where
    W: Write,
{
    fn write_token(&mut self, token: &Token) -> Result<(), Error> {
        match token {
            Token::StartObject => {
                self.check_value_position(token)?;
                self.put_u8(0xfa)?;
                self.stack.push(Scope::Object { expect_key: true });
            }
            Token::EndObject => {
                if !self.expecting_key() {
                    return Err(Error::misplaced_token(token.kind()));
                }
                self.stack.pop();
                self.put_u8(0xfb)?;
                self.value_complete();
            }
            Token::StartArray => {
                self.check_value_position(token)?;
                self.put_u8(0xf8)?;
                self.stack.push(Scope::Array);
            }
            Token::EndArray => {
                match self.stack.last() {
                    Some(Scope::Array) => {}
                    _ => return Err(Error::misplaced_token(token.kind())),
                }
                self.stack.pop();
                self.put_u8(0xf9)?;
                self.value_complete();
            }
            Token::FieldName(name) => {
                if !self.expecting_key() {
                    return Err(Error::misplaced_token(token.kind()));
                }
                self.write_key(name)?;
                if let Some(Scope::Object { expect_key }) = self.stack.last_mut() {
                    *expect_key = false;
                }
            }
            Token::String(v) => {
                self.check_value_position(token)?;
                self.write_str(v)?;
                self.value_complete();
            }
            Token::Integer(v) => {
                self.check_value_position(token)?;
                self.write_i64(*v)?;
                self.value_complete();
            }
            Token::Double(v) => {
                self.check_value_position(token)?;
                self.write_f64(*v)?;
                self.value_complete();
            }
            Token::Boolean(v) => {
                self.check_value_position(token)?;
                self.put_u8(if *v { 0x23 } else { 0x22 })?;
                self.value_complete();
            }
            Token::Null => {
                self.check_value_position(token)?;
                self.put_u8(0x21)?;
                self.value_complete();
            }
            Token::Binary(v) => {
                self.check_value_position(token)?;
                self.write_binary(v)?;
                self.value_complete();
            }
        }

        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        if self.write_end_marker {
            self.put_u8(0xff)?;
        }
        self.writer.flush().map_err(Error::io)
    }
}
