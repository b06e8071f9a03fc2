//! LZ78 dictionary compression.
//!
//! Tokens are `[u32 prefix code][u8 next]`, where the prefix code names the longest
//! previously seen phrase (0 is the empty phrase). If the input ends on a known phrase,
//! the stream ends with a 4-byte token holding just its code.

use std::collections::HashMap;

use log::debug;

use super::fields::{put_u32, FieldReader};
use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "lz78";

/// An LZ78 token.
///
/// Each token is a pair (index, next), where:
/// - `index` is the dictionary index of the longest previously seen phrase that is a prefix of the current input.
/// - `next` is the next byte that did not match (or `None` if the input ended exactly).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub next: Option<u8>,
}

/// LZ78 codec. The dictionary lives only for the duration of a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lz78;

impl Lz78 {
    /// Compress input data into LZ78 tokens.
    ///
    /// # Algorithm
    ///
    /// 1. Start with a dictionary containing only the empty phrase at index 0.
    /// 2. Extend the current phrase `w` byte by byte while `w` plus the next byte is
    ///    already in the dictionary.
    /// 3. Let `c` be the byte that broke the match. Output `(index(w), c)` and insert
    ///    `w + c` at the next available index.
    /// 4. If the input ends while `w` is a known non-empty phrase, output `(index(w), None)`.
    ///
    /// Phrases are stored as `(prefix index, last byte)` pairs, which identifies each
    /// phrase uniquely without keeping its bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use compkit::compression::Lz78;
    ///
    /// let tokens = Lz78.tokenize(b"TOBEORNOTTOBE");
    /// assert!(!tokens.is_empty());
    /// ```
    pub fn tokenize(&self, input: &[u8]) -> Vec<Token> {
        let mut dict: HashMap<(usize, u8), usize> = HashMap::new();
        let mut next_index = 1;
        let mut tokens = Vec::new();

        let mut index = 0; // dictionary index of the current phrase, 0 = empty
        for &byte in input {
            match dict.get(&(index, byte)) {
                Some(&extended) => index = extended,
                None => {
                    tokens.push(Token {
                        index,
                        next: Some(byte),
                    });
                    dict.insert((index, byte), next_index);
                    next_index += 1;
                    index = 0;
                }
            }
        }
        // End of input reached on a known phrase.
        if index != 0 {
            tokens.push(Token { index, next: None });
        }
        tokens
    }
}

/// Decompress a sequence of LZ78 tokens back into the original data.
///
/// # Algorithm
///
/// 1. Initialize the dictionary with the empty phrase at index 0.
/// 2. For each token (index, next), let phrase = dictionary[index] concatenated with next.
/// 3. Append phrase to the output and add it to the dictionary. A final token without
///    `next` only emits its phrase.
///
/// # Errors
///
/// Returns [`Error::Format`] for an index not yet in the dictionary.
pub fn detokenize(tokens: &[Token]) -> Result<Vec<u8>> {
    let mut dict: Vec<Vec<u8>> = vec![Vec::new()]; // index 0: empty phrase
    let mut output = Vec::new();

    for token in tokens {
        let prefix = dict.get(token.index).ok_or_else(|| {
            Error::format(
                NAME,
                format!(
                    "prefix code {} with {} dictionary entries",
                    token.index,
                    dict.len()
                ),
            )
        })?;
        match token.next {
            Some(byte) => {
                let mut phrase = Vec::with_capacity(prefix.len() + 1);
                phrase.extend_from_slice(prefix);
                phrase.push(byte);
                output.extend_from_slice(&phrase);
                dict.push(phrase);
            }
            None => output.extend_from_slice(prefix),
        }
    }
    Ok(output)
}

impl Compression for Lz78 {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tokens = self.tokenize(data);
        let mut out = Vec::with_capacity(tokens.len() * 5);
        for token in &tokens {
            put_u32(&mut out, NAME, "prefix code", token.index)?;
            if let Some(byte) = token.next {
                out.push(byte);
            }
        }
        debug!(
            "lz78: {} bytes -> {} tokens, {} bytes",
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
            let index = reader.read_u32()? as usize;
            let next = if remaining >= 5 {
                Some(reader.read_u8()?)
            } else {
                None
            };
            tokens.push(Token { index, next });
        }

        let out = detokenize(&tokens)?;
        debug!(
            "lz78: {} tokens -> {} bytes restored",
            tokens.len(),
            out.len()
        );
        Ok(out)
    }
}
