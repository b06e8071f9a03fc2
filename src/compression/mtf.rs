//! Move-To-Front transform.
//!
//! Each byte is replaced with its index in a dynamically updated symbol table, and the
//! symbol is then moved to the front of that table. Symbols that recur close together
//! turn into small indices, which is what makes MTF a good follow-up to the BWT.

use log::debug;

use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "mtf";

/// Largest supported alphabet; indices are written as single bytes.
pub const MAX_ALPHABET_LENGTH: usize = 256;

/// Move-To-Front codec over the alphabet `0..alphabet_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mtf {
    alphabet_length: usize,
}

impl Default for Mtf {
    fn default() -> Self {
        Mtf {
            alphabet_length: MAX_ALPHABET_LENGTH,
        }
    }
}

impl Mtf {
    /// Creates a codec over the symbols `0..alphabet_length`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `1 <= alphabet_length <= 256`.
    pub fn new(alphabet_length: usize) -> Result<Self> {
        if alphabet_length == 0 || alphabet_length > MAX_ALPHABET_LENGTH {
            return Err(Error::invalid_parameter(
                NAME,
                format!(
                    "alphabet_length must be in 1..={}, got {}",
                    MAX_ALPHABET_LENGTH, alphabet_length
                ),
            ));
        }
        Ok(Mtf { alphabet_length })
    }

    pub fn alphabet_length(&self) -> usize {
        self.alphabet_length
    }

    fn initial_table(&self) -> Vec<u8> {
        (0..self.alphabet_length).map(|s| s as u8).collect()
    }
}

/// Moves the entry at `index` to the front, shifting the ones before it back by one.
fn move_to_front(table: &mut [u8], index: usize) {
    table[..=index].rotate_right(1);
}

impl Compression for Mtf {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut table = self.initial_table();
        let mut out = Vec::with_capacity(data.len());

        for &byte in data {
            let index = table.iter().position(|&s| s == byte).ok_or_else(|| {
                Error::format(
                    NAME,
                    format!(
                        "byte {} is outside the alphabet of {} symbols",
                        byte, self.alphabet_length
                    ),
                )
            })?;
            out.push(index as u8);
            move_to_front(&mut table, index);
        }

        debug!(
            "mtf: {} bytes ranked, {} zero indices",
            out.len(),
            out.iter().filter(|&&i| i == 0).count()
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut table = self.initial_table();
        let mut out = Vec::with_capacity(data.len());

        for &code in data {
            let index = code as usize;
            let symbol = *table.get(index).ok_or_else(|| {
                Error::format(
                    NAME,
                    format!(
                        "index {} is outside the alphabet of {} symbols",
                        index, self.alphabet_length
                    ),
                )
            })?;
            out.push(symbol);
            move_to_front(&mut table, index);
        }

        debug!("mtf: {} bytes restored", out.len());
        Ok(out)
    }
}
