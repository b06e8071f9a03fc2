//! Measurements for judging a codec on a given input.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use log::debug;

use crate::compression::Compression;
use crate::error::Result;

/// Original size divided by compressed size; above 1 means the data shrank.
///
/// Returns 0 for an empty original.
pub fn compression_ratio(original_len: usize, compressed_len: usize) -> f64 {
    if original_len == 0 {
        return 0.0;
    }
    original_len as f64 / compressed_len as f64
}

/// Compute the Shannon entropy of `data` in bits per byte.
///
/// ```
/// use compkit::metrics::entropy;
///
/// assert_eq!(entropy(b"aaaa"), 0.0);
/// assert!((entropy(b"abab") - 1.0).abs() < 1e-12);
/// ```
pub fn entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut counts = HashMap::new();
    for &byte in data {
        *counts.entry(byte).or_insert(0usize) += 1;
    }
    let n = data.len() as f64;
    let mut ent = 0.0;
    for (_byte, count) in counts.into_iter() {
        let p = count as f64 / n;
        ent -= p * p.log2();
    }
    ent
}

/// Result of running one codec over one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    pub codec: &'static str,
    pub original_size: usize,
    pub compressed_size: usize,
    pub ratio: f64,
    pub entropy_before: f64,
    pub entropy_after: f64,
    /// Decompressing the output gave back the input exactly.
    pub round_trip_ok: bool,
}

impl Display for CompressionReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} bytes, ratio {:.3}, entropy {:.3} -> {:.3} bits/byte, round trip {}",
            self.codec,
            self.original_size,
            self.compressed_size,
            self.ratio,
            self.entropy_before,
            self.entropy_after,
            if self.round_trip_ok { "ok" } else { "FAILED" }
        )
    }
}

/// Compresses and decompresses `data`, measuring the result.
///
/// # Errors
///
/// Any error from either direction is returned as is; a decompression that succeeds
/// with different bytes is reported through `round_trip_ok` instead.
pub fn evaluate(codec: &dyn Compression, data: &[u8]) -> Result<CompressionReport> {
    let compressed = codec.compress(data)?;
    let restored = codec.decompress(&compressed)?;
    let report = CompressionReport {
        codec: codec.name(),
        original_size: data.len(),
        compressed_size: compressed.len(),
        ratio: compression_ratio(data.len(), compressed.len()),
        entropy_before: entropy(data),
        entropy_after: entropy(&compressed),
        round_trip_ok: restored == data,
    };
    debug!("{}", report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{Huffman, Rle};

    #[test]
    fn test_compression_ratio() {
        assert_eq!(compression_ratio(0, 0), 0.0);
        assert_eq!(compression_ratio(100, 25), 4.0);
        assert_eq!(compression_ratio(10, 20), 0.5);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(b""), 0.0);
        assert_eq!(entropy(b"zzzzzz"), 0.0);
        let all: Vec<u8> = (0..=255).collect();
        assert!((entropy(&all) - 8.0).abs() < 1e-9);
        // p = 1/2, 1/4, 1/4
        assert!((entropy(b"aabc") - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate() {
        let data = b"AAAAAAAAAAAAAAAABBBBBBBBCCCCD";
        let report = evaluate(&Rle::default(), data).unwrap();
        assert_eq!(report.codec, "rle");
        assert_eq!(report.original_size, data.len());
        assert_eq!(report.compressed_size, 8);
        assert!(report.ratio > 3.0);
        assert!(report.round_trip_ok);

        let report = evaluate(&Huffman, b"").unwrap();
        assert_eq!(report.compressed_size, 0);
        assert_eq!(report.ratio, 0.0);
        assert!(report.round_trip_ok);
    }

    #[test]
    fn test_report_display() {
        let report = evaluate(&Rle::default(), b"aaaa").unwrap();
        assert_eq!(
            report.to_string(),
            "rle: 4 -> 2 bytes, ratio 2.000, entropy 0.000 -> 1.000 bits/byte, round trip ok"
        );
    }
}
