//! Convert between JSON text and the Smile binary format at the token level.
//!
//! [Smile] is a binary data format created by the developers of the Jackson serialization library for Java. It is
//! designed to be a binary equivalent of JSON, and both formats decompose into the same stream of parse events. This
//! crate bridges the two formats through that shared event vocabulary: a reader produces [`Token`]s one at a time, a
//! writer consumes them, and the copy loops in [`copy`] pump one into the other without ever materializing a document.
//!
//! # Segments
//!
//! A Smile stream may contain several complete documents back to back, each with its own header and optionally
//! separated by the `0xff` end-of-stream marker, with no outer terminator. A [`SmileReader`] therefore yields a lone
//! `None` at each such boundary and resumes with the next document's tokens; only two consecutive `None`s mean the
//! input is really exhausted. [`copy::copy_segmented`] implements that protocol, while the JSON direction uses the
//! simple single-`None` loop in [`copy::copy_all`].
//!
//! # Examples
//!
//! Encode a JSON document as Smile:
//! ```rust
//! use smile_tool::{copy, Error, JsonReader, SmileOptions, SmileWriter, TokenWrite};
//!
//! fn main() -> Result<(), Error> {
//!     let options = SmileOptions::new();
//!
//!     let mut reader = JsonReader::from_slice(br#"{"number":1600,"street":"Pennsylvania Avenue"}"#);
//!     let mut writer = SmileWriter::new(Vec::new(), &options)?;
//!     copy::copy_all(&mut reader, &mut writer)?;
//!     writer.close()?;
//!
//!     let smile = writer.into_inner();
//!     assert!(smile.starts_with(b":)\n"));
//!
//!     Ok(())
//! }
//! ```
//!
//! Verify that a document survives the round trip:
//! ```rust
//! use smile_tool::{verify, Error, SmileOptions};
//!
//! fn main() -> Result<(), Error> {
//!     let json: &[u8] = br#"{"x":"hello"}"#;
//!
//!     let verified = verify::verify(json, json, &SmileOptions::new())?;
//!     println!("{}", verified);
//!
//!     Ok(())
//! }
//! ```
//!
//! [Smile]: https://github.com/FasterXML/smile-format-specification
#![warn(missing_docs)]

#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use json::{JsonReader, JsonWriter};
#[doc(inline)]
pub use smile::{SmileOptions, SmileReader, SmileWriter};
#[doc(inline)]
pub use token::{Token, TokenKind, TokenRead, TokenWrite};

pub mod copy;
mod error;
pub mod json;
pub mod read;
pub mod smile;
#[cfg(test)]
mod test;
pub mod token;
pub mod verify;
