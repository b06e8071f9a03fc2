//! LZ77 sliding-window compression.
//!
//! Tokens are fixed width:
//!
//! ```text
//! [u16 offset][u16 length][u8 next]   a back reference followed by one literal
//! [u16 offset][u16 length]            final token when the match reaches end of input
//! ```
//!
//! An offset and length of zero encode a lone literal. The final token carries no
//! literal; the decoder recognises it by exactly four bytes remaining.

use log::debug;

use super::fields::{copy_back_reference, put_u16, FieldReader};
use super::window::longest_match;
use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "lz77";

/// Largest window or lookahead a 2-byte field can describe.
pub const MAX_FIELD: usize = u16::MAX as usize;

/// An LZ77 token.
///
/// When a match is found, the token is:
///   (offset, length, next)
///
/// If no match is found, then offset and length are zero, and `next` is the literal.
/// `next` is `None` only for the last token, when the match ends the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub length: usize,
    pub next: Option<u8>,
}

/// LZ77 codec with a fixed search window and lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77 {
    window_size: usize,
    lookahead_buffer_size: usize,
}

impl Default for Lz77 {
    fn default() -> Self {
        Lz77 {
            window_size: 10_000,
            lookahead_buffer_size: 500,
        }
    }
}

impl Lz77 {
    /// Creates a codec searching `window_size` previous bytes for matches of at most
    /// `lookahead_buffer_size` bytes.
    ///
    /// # Errors
    ///
    /// Both sizes are written in 2-byte fields and must be in `1..=65535`.
    pub fn new(window_size: usize, lookahead_buffer_size: usize) -> Result<Self> {
        for (name, value) in [
            ("window_size", window_size),
            ("lookahead_buffer_size", lookahead_buffer_size),
        ] {
            if value == 0 || value > MAX_FIELD {
                return Err(Error::invalid_parameter(
                    NAME,
                    format!("{} must be in 1..={}, got {}", name, MAX_FIELD, value),
                ));
            }
        }
        Ok(Lz77 {
            window_size,
            lookahead_buffer_size,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn lookahead_buffer_size(&self) -> usize {
        self.lookahead_buffer_size
    }

    /// Splits the input into tokens.
    ///
    /// # Example
    ///
    /// ```
    /// use compkit::compression::Lz77;
    ///
    /// let lz77 = Lz77::new(16, 8).unwrap();
    /// let tokens = lz77.tokenize(b"abracadabra abracadabra");
    /// assert!(!tokens.is_empty());
    /// ```
    pub fn tokenize(&self, input: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < input.len() {
            let m = longest_match(input, i, self.window_size, self.lookahead_buffer_size);
            if i + m.length < input.len() {
                tokens.push(Token {
                    offset: m.offset,
                    length: m.length,
                    next: Some(input[i + m.length]),
                });
                i += m.length + 1;
            } else {
                // The match reaches to the end, so there is no next literal.
                tokens.push(Token {
                    offset: m.offset,
                    length: m.length,
                    next: None,
                });
                i = input.len();
            }
        }
        tokens
    }
}

/// Rebuilds the original data from a sequence of LZ77 tokens.
///
/// # Errors
///
/// Returns [`Error::Format`] when a token refers back past the start of the output.
pub fn detokenize(tokens: &[Token]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    for token in tokens {
        // If length > 0, copy the matching substring from output.
        if token.offset != 0 || token.length != 0 {
            copy_back_reference(&mut output, NAME, token.offset, token.length)?;
        }
        // Append the literal (if present).
        if let Some(byte) = token.next {
            output.push(byte);
        }
    }
    Ok(output)
}

impl Compression for Lz77 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tokens = self.tokenize(data);
        let mut out = Vec::with_capacity(tokens.len() * 5);
        for token in &tokens {
            put_u16(&mut out, NAME, "offset", token.offset)?;
            put_u16(&mut out, NAME, "length", token.length)?;
            if let Some(byte) = token.next {
                out.push(byte);
            }
        }
        debug!(
            "lz77: {} bytes -> {} tokens, {} bytes",
            data.len(),
            tokens.len(),
            out.len()
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut reader = FieldReader::new(NAME, data);
        let mut tokens = Vec::with_capacity(data.len() / 5 + 1);

        while !reader.is_empty() {
            let remaining = reader.remaining();
            if remaining != 4 && remaining < 5 {
                return Err(Error::format(
                    NAME,
                    format!("{} trailing bytes do not form a token", remaining),
                ));
            }
            let offset = reader.read_u16()? as usize;
            let length = reader.read_u16()? as usize;
            let next = if remaining >= 5 {
                Some(reader.read_u8()?)
            } else {
                None
            };
            tokens.push(Token {
                offset,
                length,
                next,
            });
        }

        let out = detokenize(&tokens)?;
        debug!(
            "lz77: {} tokens -> {} bytes restored",
            tokens.len(),
            out.len()
        );
        Ok(out)
    }
}
