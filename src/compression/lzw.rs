//! Lempel-Ziv-Welch compression with fixed 4-byte big-endian codes.

use std::collections::HashMap;

use log::debug;

use super::fields::{put_u32, FieldReader};
use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "lzw";

/// Codes below this value stand for the single byte with the same value.
const FIRST_FREE_CODE: usize = 256;

/// LZW codec. Codes are never reset and the dictionary grows without bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lzw;

/// Compresses the input into LZW codes.
///
/// # Details
///
/// The dictionary starts with all 256 single-byte sequences.
/// The algorithm finds the longest sequence `w` present in the dictionary that
/// is a prefix of the remaining input. It outputs the code for `w`, adds `w` concatenated
/// with the next byte to the dictionary, and continues.
///
/// Entries are keyed by `(code of w, next byte)`, so `w` itself is never materialized.
///
/// # Example
///
/// ```
/// use compkit::compression::lzw::encode;
///
/// let codes = encode(b"TOBEORNOTTOBE");
/// assert!(codes.len() < 13);
/// ```
pub fn encode(input: &[u8]) -> Vec<usize> {
    let Some((&first, rest)) = input.split_first() else {
        return Vec::new();
    };

    let mut dict: HashMap<(usize, u8), usize> = HashMap::new();
    let mut next_code = FIRST_FREE_CODE;
    let mut codes = Vec::new();

    let mut w = first as usize;
    for &byte in rest {
        match dict.get(&(w, byte)) {
            Some(&code) => w = code,
            None => {
                codes.push(w);
                dict.insert((w, byte), next_code);
                next_code += 1;
                w = byte as usize;
            }
        }
    }
    codes.push(w);
    codes
}

/// Decompresses a sequence of LZW codes back into the original bytes.
///
/// # Details
///
/// The dictionary is initialized with all 256 single-byte sequences.
/// Then, for each code read, the corresponding dictionary entry is output.
/// The dictionary is updated by appending the first byte of the current entry
/// to the previous entry. A code equal to the next one to be assigned refers to the
/// entry being built, which is the previous entry plus its own first byte.
///
/// # Errors
///
/// Returns [`Error::Format`] for a first code that is not a single byte, or for any
/// code beyond the next one to be assigned.
pub fn decode(codes: &[usize]) -> Result<Vec<u8>> {
    let Some((&first, rest)) = codes.split_first() else {
        return Ok(Vec::new());
    };
    let first = u8::try_from(first).map_err(|_| {
        Error::format(NAME, format!("first code {} is not a single byte", first))
    })?;

    let mut dict: Vec<Vec<u8>> = (0..=255u8).map(|b| vec![b]).collect();
    let mut w = vec![first];
    let mut result = w.clone();

    for &code in rest {
        let entry = match code.cmp(&dict.len()) {
            std::cmp::Ordering::Less => dict[code].clone(),
            std::cmp::Ordering::Equal => {
                let mut entry = w.clone();
                entry.push(w[0]);
                entry
            }
            std::cmp::Ordering::Greater => {
                return Err(Error::format(
                    NAME,
                    format!("code {} with {} dictionary entries", code, dict.len()),
                ));
            }
        };
        result.extend_from_slice(&entry);
        let mut new_entry = w;
        new_entry.push(entry[0]);
        dict.push(new_entry);
        w = entry;
    }
    Ok(result)
}

impl Compression for Lzw {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let codes = encode(data);
        let mut out = Vec::with_capacity(codes.len() * 4);
        for &code in &codes {
            put_u32(&mut out, NAME, "code", code)?;
        }
        debug!(
            "lzw: {} bytes -> {} codes, {} bytes",
            data.len(),
            codes.len(),
            out.len()
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() % 4 != 0 {
            return Err(Error::format(
                NAME,
                format!("stream length {} is not a multiple of 4", data.len()),
            ));
        }
        let mut reader = FieldReader::new(NAME, data);
        let mut codes = Vec::with_capacity(data.len() / 4);
        while !reader.is_empty() {
            codes.push(reader.read_u32()? as usize);
        }

        let out = decode(&codes)?;
        debug!("lzw: {} codes -> {} bytes restored", codes.len(), out.len());
        Ok(out)
    }
}
