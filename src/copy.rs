//! The drive loops that pump tokens from a reader into a writer.
//!
//! Copying is one token at a time and never materializes a document. The two
//! loops differ only in how they interpret a `None` from the reader, and the
//! asymmetry is deliberate: JSON text has no mid-stream boundaries, so the
//! encode direction stops at the first `None`, while a Smile source may hold
//! several concatenated documents and only two consecutive `None`s mean the
//! stream is really finished.
use crate::token::{TokenRead, TokenWrite};
use crate::Error;

/// Copies tokens until the reader yields `None`, returning the number of
/// tokens copied.
///
/// Errors from either side are propagated untransformed; the caller remains
/// responsible for closing the writer on every path.
pub fn copy_all<R, W>(reader: &mut R, writer: &mut W) -> Result<u64, Error>
where
    R: TokenRead,
    W: TokenWrite,
{
    let mut count = 0;
    while let Some(token) = reader.next_token()? {
        writer.write_token(&token)?;
        count += 1;
    }
    Ok(count)
}

/// Copies tokens until the reader yields `None` twice in a row, returning the
/// number of tokens copied.
///
/// A lone `None` is a segment boundary and is silently absorbed: the loop
/// immediately asks for another token and keeps copying if one arrives. On an
/// empty input the first two requests both yield `None` and zero tokens are
/// copied.
pub fn copy_segmented<R, W>(reader: &mut R, writer: &mut W) -> Result<u64, Error>
where
    R: TokenRead,
    W: TokenWrite,
{
    let mut count = 0;
    loop {
        let token = match reader.next_token()? {
            Some(token) => token,
            None => match reader.next_token()? {
                Some(token) => token,
                None => return Ok(count),
            },
        };
        writer.write_token(&token)?;
        count += 1;
    }
}
