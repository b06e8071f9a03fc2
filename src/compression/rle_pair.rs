//! Legacy run-length encoding as fixed `(count, value)` byte pairs.
//!
//! Every run, including a single byte, becomes one pair; counts are capped at 255.
//! There is no literal block, so incompressible input doubles in size.

use log::debug;

use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "rle-pair";

const MAX_RUN: usize = u8::MAX as usize;

/// Pair-based run-length codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RlePair {
    min_run_length: usize,
}

impl Default for RlePair {
    fn default() -> Self {
        RlePair { min_run_length: 1 }
    }
}

impl RlePair {
    /// `min_run_length` is kept for symmetry with [`super::Rle`]; the pair format has
    /// no literal form, so every run is encoded regardless of its length.
    pub fn new(min_run_length: usize) -> Self {
        RlePair { min_run_length }
    }

    pub fn min_run_length(&self) -> usize {
        self.min_run_length
    }
}

impl Compression for RlePair {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let value = data[i];
            let count = data[i..]
                .iter()
                .take(MAX_RUN)
                .take_while(|&&b| b == value)
                .count();
            out.push(count as u8);
            out.push(value);
            i += count;
        }
        debug!("rle-pair: {} -> {} bytes", data.len(), out.len());
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() % 2 != 0 {
            return Err(Error::format(
                NAME,
                format!("stream length {} is not a whole number of pairs", data.len()),
            ));
        }
        let mut out = Vec::with_capacity(data.len());
        for pair in data.chunks_exact(2) {
            out.resize(out.len() + pair[0] as usize, pair[1]);
        }
        debug!("rle-pair: {} -> {} bytes restored", data.len(), out.len());
        Ok(out)
    }
}
