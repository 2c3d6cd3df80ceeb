//! Byte-level input sources shared by the JSON and Smile readers.
use crate::Error;
use memchr::memchr;
use std::io::BufRead;

pub(crate) mod private {
    pub trait Sealed {}
}

/// A trait used by the token readers to abstract over input types.
///
/// This trait is sealed and cannot be implemented outside of `smile_tool`. The contents of the trait are not
/// considered part of the crate's public API and are subject to change at any time.
pub trait Read: private::Sealed {
    #[doc(hidden)]
    fn next(&mut self) -> Result<Option<u8>, Error>;

    #[doc(hidden)]
    fn peek(&mut self) -> Result<Option<u8>, Error>;

    #[doc(hidden)]
    fn consume(&mut self);

    #[doc(hidden)]
    fn read(&mut self, n: usize) -> Result<Option<&[u8]>, Error>;

    #[doc(hidden)]
    fn read_mut(&mut self, n: usize) -> Result<Option<&mut [u8]>, Error>;

    #[doc(hidden)]
    fn read_until(&mut self, end: u8) -> Result<Option<&[u8]>, Error>;
}

/// A [`Read`] implementation for in-memory buffers.
pub struct SliceRead<'a> {
    slice: &'a [u8],
    index: usize,
    buf: Vec<u8>,
}

impl<'a> SliceRead<'a> {
    /// Creates a new `SliceRead`.
    pub fn new(slice: &'a [u8]) -> Self {
        SliceRead {
            slice,
            index: 0,
            buf: vec![],
        }
    }
}

impl private::Sealed for SliceRead<'_> {}

impl Read for SliceRead<'_> {
    #[inline]
    fn next(&mut self) -> Result<Option<u8>, Error> {
        if self.index < self.slice.len() {
            let b = self.slice[self.index];
            self.index += 1;
            Ok(Some(b))
        } else {
            Ok(None)
        }
    }

    #[inline]
    fn peek(&mut self) -> Result<Option<u8>, Error> {
        if self.index < self.slice.len() {
            Ok(Some(self.slice[self.index]))
        } else {
            Ok(None)
        }
    }

    #[inline]
    fn consume(&mut self) {
        self.index += 1;
    }

    #[inline]
    fn read(&mut self, n: usize) -> Result<Option<&[u8]>, Error> {
        let s = &self.slice[self.index..];
        if n <= s.len() {
            self.index += n;
            Ok(Some(&s[..n]))
        } else {
            Ok(None)
        }
    }

    fn read_mut(&mut self, n: usize) -> Result<Option<&mut [u8]>, Error> {
        let s = &self.slice[self.index..];
        if n <= s.len() {
            self.index += n;
            self.buf.clear();
            self.buf.extend_from_slice(&s[..n]);
            Ok(Some(&mut self.buf))
        } else {
            Ok(None)
        }
    }

    fn read_until(&mut self, end: u8) -> Result<Option<&[u8]>, Error> {
        let s = &self.slice[self.index..];
        match memchr(end, s) {
            Some(end) => {
                self.index += end + 1;
                Ok(Some(&s[..end]))
            }
            None => Ok(None),
        }
    }
}

/// A [`Read`] implementation for buffered IO streams.
pub struct IoRead<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> IoRead<R>
where
    R: BufRead,
{
    /// Creates a new `IoRead`.
    pub fn new(reader: R) -> Self {
        IoRead {
            reader,
            buf: vec![],
        }
    }

    fn fill_buf(&mut self, n: usize) -> Result<bool, Error> {
        self.buf.clear();
        // defend against malicious input pretending to be huge by limiting growth
        self.buf.reserve(usize::min(n, 16 * 1024));

        let mut remaining = n;
        while remaining > 0 {
            let buf = self.reader.fill_buf().map_err(Error::io)?;
            if buf.is_empty() {
                return Ok(false);
            }

            let len = usize::min(remaining, buf.len());
            self.buf.extend_from_slice(&buf[..len]);
            self.reader.consume(len);
            remaining -= len;
        }

        Ok(true)
    }
}

impl<R> private::Sealed for IoRead<R> {}

impl<R> Read for IoRead<R>
where
    R: BufRead,
{
    fn next(&mut self) -> Result<Option<u8>, Error> {
        let r = self.peek();
        if let Ok(Some(_)) = r {
            self.consume();
        }
        r
    }

    fn peek(&mut self) -> Result<Option<u8>, Error> {
        let buf = self.reader.fill_buf().map_err(Error::io)?;
        if buf.is_empty() {
            Ok(None)
        } else {
            Ok(Some(buf[0]))
        }
    }

    fn consume(&mut self) {
        self.reader.consume(1);
    }

    fn read(&mut self, n: usize) -> Result<Option<&[u8]>, Error> {
        if self.fill_buf(n)? {
            Ok(Some(&self.buf))
        } else {
            Ok(None)
        }
    }

    fn read_mut(&mut self, n: usize) -> Result<Option<&mut [u8]>, Error> {
        if self.fill_buf(n)? {
            Ok(Some(&mut self.buf))
        } else {
            Ok(None)
        }
    }

    fn read_until(&mut self, end: u8) -> Result<Option<&[u8]>, Error> {
        self.buf.clear();

        loop {
            let buf = self.reader.fill_buf().map_err(Error::io)?;
            if buf.is_empty() {
                return Ok(None);
            }

            match memchr(end, buf) {
                Some(end) => {
                    self.buf.extend_from_slice(&buf[..end]);
                    self.reader.consume(end + 1);
                    return Ok(Some(&self.buf));
                }
                None => {
                    self.buf.extend(buf);
                    let len = buf.len();
                    self.reader.consume(len);
                }
            }
        }
    }
}
