//! LZSS: LZ77 with an explicit flag per token.
//!
//! ```text
//! [0][u8 literal]
//! [1][u32 offset][u32 length]
//! ```
//!
//! A back reference is only written when it covers at least `min_match_length` bytes;
//! shorter matches cost more than the literals they replace.

use log::debug;

use super::fields::{copy_back_reference, put_u32, FieldReader};
use super::window::longest_match;
use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "lzss";

const LITERAL_FLAG: u8 = 0;
const MATCH_FLAG: u8 = 1;

/// Either a single byte or a back reference to previous bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A single output byte.
    Literal(u8),
    /// Copy `length` bytes starting `offset` bytes behind the end of the output.
    Match { offset: usize, length: usize },
}

/// LZSS codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lzss {
    window_size: usize,
    lookahead_buffer_size: usize,
    min_match_length: usize,
}

impl Default for Lzss {
    fn default() -> Self {
        Lzss {
            window_size: 10_000,
            lookahead_buffer_size: 500,
            min_match_length: 3,
        }
    }
}

impl Lzss {
    /// # Errors
    ///
    /// All three parameters must be at least 1, and the window and lookahead must fit
    /// the 4-byte offset and length fields.
    pub fn new(
        window_size: usize,
        lookahead_buffer_size: usize,
        min_match_length: usize,
    ) -> Result<Self> {
        for (name, value) in [
            ("window_size", window_size),
            ("lookahead_buffer_size", lookahead_buffer_size),
            ("min_match_length", min_match_length),
        ] {
            if value == 0 || u32::try_from(value).is_err() {
                return Err(Error::invalid_parameter(
                    NAME,
                    format!("{} must be in 1..={}, got {}", name, u32::MAX, value),
                ));
            }
        }
        Ok(Lzss {
            window_size,
            lookahead_buffer_size,
            min_match_length,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn lookahead_buffer_size(&self) -> usize {
        self.lookahead_buffer_size
    }

    pub fn min_match_length(&self) -> usize {
        self.min_match_length
    }

    /// Splits the input into literal and match tokens.
    pub fn tokenize(&self, input: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < input.len() {
            let m = longest_match(input, i, self.window_size, self.lookahead_buffer_size);
            if m.length >= self.min_match_length {
                tokens.push(Token::Match {
                    offset: m.offset,
                    length: m.length,
                });
                i += m.length;
            } else {
                tokens.push(Token::Literal(input[i]));
                i += 1;
            }
        }
        tokens
    }
}

impl Compression for Lzss {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tokens = self.tokenize(data);
        let mut out = Vec::with_capacity(tokens.len() * 2);
        let mut matches = 0usize;
        for token in &tokens {
            match *token {
                Token::Literal(byte) => {
                    out.push(LITERAL_FLAG);
                    out.push(byte);
                }
                Token::Match { offset, length } => {
                    out.push(MATCH_FLAG);
                    put_u32(&mut out, NAME, "offset", offset)?;
                    put_u32(&mut out, NAME, "length", length)?;
                    matches += 1;
                }
            }
        }
        debug!(
            "lzss: {} bytes -> {} tokens ({} matches), {} bytes",
            data.len(),
            tokens.len(),
            matches,
            out.len()
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut reader = FieldReader::new(NAME, data);
        let mut out = Vec::with_capacity(data.len() * 2);

        while !reader.is_empty() {
            let at = reader.position();
            match reader.read_u8()? {
                LITERAL_FLAG => out.push(reader.read_u8()?),
                MATCH_FLAG => {
                    let offset = reader.read_u32()? as usize;
                    let length = reader.read_u32()? as usize;
                    copy_back_reference(&mut out, NAME, offset, length)?;
                }
                flag => {
                    return Err(Error::format(
                        NAME,
                        format!("unknown token flag {} at offset {}", flag, at),
                    ));
                }
            }
        }

        debug!("lzss: {} bytes -> {} bytes restored", data.len(), out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let lzss = Lzss::default();
        assert!(lzss.compress(b"").unwrap().is_empty());
        assert!(lzss.decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn test_literals_below_min_match() {
        let lzss = Lzss::default();
        // "ab" repeats but only two bytes long: below the default minimum of 3.
        let encoded = lzss.compress(b"abab").unwrap();
        assert_eq!(encoded, [0, b'a', 0, b'b', 0, b'a', 0, b'b']);
    }

    #[test]
    fn test_match_token_layout() {
        let lzss = Lzss::default();
        let encoded = lzss.compress(b"abcabc").unwrap();
        assert_eq!(
            encoded,
            [0, b'a', 0, b'b', 0, b'c', 1, 0, 0, 0, 3, 0, 0, 0, 3]
        );
        assert_eq!(lzss.decompress(&encoded).unwrap(), b"abcabc");
    }

    #[test]
    fn test_tokens() {
        let lzss = Lzss::new(64, 16, 2).unwrap();
        let tokens = lzss.tokenize(b"xyzxyq");
        assert_eq!(
            tokens,
            [
                Token::Literal(b'x'),
                Token::Literal(b'y'),
                Token::Literal(b'z'),
                Token::Match {
                    offset: 3,
                    length: 2
                },
                Token::Literal(b'q'),
            ]
        );
    }

    #[test]
    fn test_round_trip_repetitive() {
        let lzss = Lzss::new(32, 8, 3).unwrap();
        let input = b"she sells sea shells by the sea shore, she sells sea shells".repeat(4);
        let encoded = lzss.compress(&input).unwrap();
        assert!(encoded.len() < input.len() * 2);
        assert_eq!(lzss.decompress(&encoded).unwrap(), input);
    }

    #[test]
    fn test_unknown_flag() {
        let lzss = Lzss::default();
        let err = lzss.decompress(&[0, b'a', 2, 0]).unwrap_err();
        assert!(matches!(err, Error::Format { codec: "lzss", .. }));
    }

    #[test]
    fn test_truncated_match() {
        let lzss = Lzss::default();
        let err = lzss.decompress(&[0, b'a', 1, 0, 0, 0, 1]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_parameter_validation() {
        assert!(Lzss::new(16, 8, 0).is_err());
        assert!(Lzss::new(0, 8, 3).is_err());
        assert!(Lzss::new(16, 0, 3).is_err());
    }
}
