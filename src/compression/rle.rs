//! Run-length encoding with a control byte per block.
//!
//! The stream is a sequence of blocks, each starting with a header byte:
//!
//! - `0LLLLLLL` followed by one byte: the byte repeated `L` times (a run).
//! - `1LLLLLLL` followed by `L` bytes copied verbatim (a literal block).
//!
//! Runs shorter than `min_run_length` are folded into literal blocks, so short
//! repetitions do not pay two bytes each.

use log::debug;

use super::fields::FieldReader;
use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "rle";

/// Longest run or literal block a single header can describe (7 bits).
pub const MAX_BLOCK_LENGTH: usize = 127;

const LITERAL_FLAG: u8 = 0b1000_0000;
const LENGTH_MASK: u8 = 0b0111_1111;

/// Control-byte run-length codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rle {
    min_run_length: usize,
}

impl Default for Rle {
    fn default() -> Self {
        Rle { min_run_length: 2 }
    }
}

impl Rle {
    /// Creates a codec that encodes runs of at least `min_run_length` bytes as runs.
    ///
    /// A value of 0 or 1 encodes every byte as part of a run. Values above
    /// [`MAX_BLOCK_LENGTH`] never produce runs, since no run can be longer than that.
    pub fn new(min_run_length: usize) -> Self {
        Rle { min_run_length }
    }

    pub fn min_run_length(&self) -> usize {
        self.min_run_length
    }

    fn is_run(&self, run: usize) -> bool {
        run >= self.min_run_length
    }
}

/// Length of the run of identical bytes starting at `pos`, capped at one block.
fn run_length_at(data: &[u8], pos: usize) -> usize {
    let value = data[pos];
    data[pos..]
        .iter()
        .take(MAX_BLOCK_LENGTH)
        .take_while(|&&b| b == value)
        .count()
}

impl Compression for Rle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() + data.len() / MAX_BLOCK_LENGTH + 1);
        let mut runs = 0usize;
        let mut literals = 0usize;
        let mut i = 0;

        while i < data.len() {
            let run = run_length_at(data, i);
            if self.is_run(run) {
                out.push(run as u8 & LENGTH_MASK);
                out.push(data[i]);
                runs += 1;
                i += run;
                continue;
            }

            // Collect bytes until the next qualifying run or a full block. A short run
            // goes into the block whole, clipped only by the block limit.
            let start = i;
            while i < data.len() && i - start < MAX_BLOCK_LENGTH {
                let run = run_length_at(data, i);
                if self.is_run(run) {
                    break;
                }
                i += run.min(MAX_BLOCK_LENGTH - (i - start));
            }
            out.push(LITERAL_FLAG | (i - start) as u8);
            out.extend_from_slice(&data[start..i]);
            literals += 1;
        }

        debug!(
            "rle: {} -> {} bytes ({} runs, {} literal blocks)",
            data.len(),
            out.len(),
            runs,
            literals
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut reader = FieldReader::new(NAME, data);

        while !reader.is_empty() {
            let header = reader.read_u8()?;
            let length = (header & LENGTH_MASK) as usize;
            if header & LITERAL_FLAG != 0 {
                if reader.remaining() < length {
                    return Err(Error::format(
                        NAME,
                        format!(
                            "literal block of {} bytes with only {} bytes left",
                            length,
                            reader.remaining()
                        ),
                    ));
                }
                out.extend_from_slice(reader.read_bytes(length)?);
            } else {
                if reader.is_empty() {
                    return Err(Error::format(NAME, "run header without a value byte"));
                }
                let value = reader.read_u8()?;
                out.resize(out.len() + length, value);
            }
        }

        debug!("rle: {} -> {} bytes restored", data.len(), out.len());
        Ok(out)
    }
}
