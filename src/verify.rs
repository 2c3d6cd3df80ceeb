//! Round-trip verification: encode JSON to Smile in memory, decode it back,
//! and compare token streams in lockstep.
use crate::copy::copy_all;
use crate::json::JsonReader;
use crate::smile::{SmileOptions, SmileReader, SmileWriter};
use crate::token::{TokenRead, TokenWrite};
use crate::Error;
use std::fmt;
use std::io::BufRead;

/// The result of a successful round-trip verification.
#[derive(Debug)]
pub struct Verified {
    tokens: u64,
    encoded_len: usize,
}

impl Verified {
    /// Returns the number of tokens compared.
    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    /// Returns the size of the intermediate Smile encoding in bytes.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }
}

impl fmt::Display for Verified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OK: verified {} tokens (from {} bytes of Smile encoded data), input and encoded contents are identical",
            self.tokens, self.encoded_len
        )
    }
}

/// Verifies that a JSON document survives a Smile round trip unchanged.
///
/// The input is consumed twice, so two independently-opened handles over the
/// same logical input are required: once to encode into an in-memory Smile
/// buffer, and once to walk the original tokens in lockstep with the decoded
/// ones. Each pair of tokens must agree on both tag and text; the first
/// divergence fails with its 1-based token index, and a stream that ends
/// before the other is a distinct, explicit failure.
///
/// The decode side uses the plain (non-segmented) loop semantics: exactly one
/// logical document was encoded, so the first `None` is the end.
pub fn verify<R1, R2>(input: R1, reinput: R2, options: &SmileOptions) -> Result<Verified, Error>
where
    R1: BufRead,
    R2: BufRead,
{
    // pass 1: encode into memory
    let mut reader = JsonReader::from_reader(input);
    let mut writer = SmileWriter::new(Vec::new(), options)?;
    copy_all(&mut reader, &mut writer)?;
    writer.close()?;
    let smile = writer.into_inner();

    // pass 2: re-read the input and the encoding in lockstep
    let mut expected = JsonReader::from_reader(reinput);
    let mut actual = SmileReader::from_slice(&smile, options);

    let mut count = 0;
    loop {
        let e = expected.next_token()?;
        let a = actual.next_token()?;
        count += 1;

        match (e, a) {
            (Some(e), Some(a)) => {
                if e.kind() != a.kind() {
                    return Err(Error::token_mismatch(count, e.kind(), a.kind()));
                }
                if e.text() != a.text() {
                    return Err(Error::text_mismatch(count, &e.text(), &a.text()));
                }
            }
            (Some(_), None) => return Err(Error::length_mismatch(count, false)),
            (None, Some(_)) => return Err(Error::length_mismatch(count, true)),
            (None, None) => {
                return Ok(Verified {
                    tokens: count - 1,
                    encoded_len: smile.len(),
                })
            }
        }
    }
}
