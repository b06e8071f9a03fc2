//! Burrows-Wheeler Transform implementation.
//!
//! The Burrows-Wheeler Transform (BWT) is a reversible transformation that rearranges
//! bytes so that equal contexts end up next to each other. It does not shrink data on its
//! own; it prepares it for Move-To-Front, run-length and entropy coding.
//!
//! Input is split into blocks of at most `block_size` bytes. Each block is written as
//!
//! ```text
//! [u32 block length][u32 primary index][block length transformed bytes]
//! ```
//!
//! and the records are concatenated.

use log::{debug, trace};

use super::fields::{put_u32, FieldReader};
use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "bwt";

/// Burrows-Wheeler codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bwt {
    /// `None` transforms the whole input as a single block.
    block_size: Option<usize>,
}

impl Bwt {
    /// Creates a codec that transforms the whole input as one block.
    pub fn new() -> Self {
        Bwt { block_size: None }
    }

    /// Creates a codec that splits input into blocks of at most `block_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when `block_size` is zero or does not fit the
    /// 4-byte block length field.
    pub fn with_block_size(block_size: usize) -> Result<Self> {
        if block_size == 0 || u32::try_from(block_size).is_err() {
            return Err(Error::invalid_parameter(
                NAME,
                format!("block_size must be in 1..={}, got {}", u32::MAX, block_size),
            ));
        }
        Ok(Bwt {
            block_size: Some(block_size),
        })
    }

    pub fn block_size(&self) -> Option<usize> {
        self.block_size
    }
}

/// Builds the sorted order of all cyclic rotations of `block`.
///
/// Uses prefix doubling: ranks start as byte values, and each round sorts rotations by
/// the pair `(rank[i], rank[(i + k) % n])`, which ranks prefixes of length `2k`. Rounds
/// stop once every rank is distinct or the compared prefix covers the whole block.
/// Identical rotations (periodic blocks) keep a stable relative order.
pub fn cyclic_suffix_array(block: &[u8]) -> Vec<usize> {
    let n = block.len();
    let mut sa: Vec<usize> = (0..n).collect();
    let mut rank: Vec<usize> = block.iter().map(|&b| b as usize).collect();
    let mut next_rank = vec![0usize; n];

    let mut k = 1;
    while k < n {
        {
            let key = |i: usize| (rank[i], rank[(i + k) % n]);
            sa.sort_by_key(|&i| key(i));

            next_rank[sa[0]] = 0;
            for j in 1..n {
                let bump = usize::from(key(sa[j]) != key(sa[j - 1]));
                next_rank[sa[j]] = next_rank[sa[j - 1]] + bump;
            }
        }
        std::mem::swap(&mut rank, &mut next_rank);
        if rank[sa[n - 1]] == n - 1 {
            break;
        }
        k <<= 1;
    }
    sa
}

/// Applies the Burrows-Wheeler Transform to one block.
///
/// # Returns
///
/// A tuple containing:
/// - The transformed data (the last column of the sorted rotation matrix)
/// - The primary index: the position of the unrotated block in that order
///
/// # Examples
///
/// ```
/// use compkit::compression::bwt::bwt_transform;
///
/// let (transformed, index) = bwt_transform(b"banana");
/// assert_eq!(transformed, b"nnbaaa");
/// assert_eq!(index, 3);
/// ```
pub fn bwt_transform(block: &[u8]) -> (Vec<u8>, usize) {
    if block.is_empty() {
        return (Vec::new(), 0);
    }
    let n = block.len();
    let sa = cyclic_suffix_array(block);

    // The last character of rotation i is the byte just before position i.
    let transformed = sa.iter().map(|&i| block[(i + n - 1) % n]).collect();
    let primary = sa.iter().position(|&i| i == 0).unwrap_or(0);
    (transformed, primary)
}

/// Applies the inverse Burrows-Wheeler Transform to recover one block.
///
/// # Algorithm
///
/// 1. Count each byte of the transformed block (the last column, L) and turn the counts
///    into the starting offset of each byte in the sorted first column (F).
/// 2. LF-map every position: the k-th occurrence of byte `c` in L maps to the k-th
///    occurrence of `c` in F, which is the row of its predecessor in the original.
/// 3. Starting from the primary index, read L and follow the mapping `n` times; this
///    yields the original block back to front.
///
/// # Errors
///
/// Returns [`Error::Format`] when `primary` is not a valid row for a non-empty block.
pub fn bwt_inverse(transformed: &[u8], primary: usize) -> Result<Vec<u8>> {
    let n = transformed.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if primary >= n {
        return Err(Error::format(
            NAME,
            format!("primary index {} outside block of {} bytes", primary, n),
        ));
    }

    let mut counts = [0usize; 256];
    for &byte in transformed {
        counts[byte as usize] += 1;
    }
    let mut starts = [0usize; 256];
    let mut total = 0;
    for (start, &count) in starts.iter_mut().zip(counts.iter()) {
        *start = total;
        total += count;
    }

    let mut seen = [0usize; 256];
    let lf: Vec<usize> = transformed
        .iter()
        .map(|&byte| {
            let slot = starts[byte as usize] + seen[byte as usize];
            seen[byte as usize] += 1;
            slot
        })
        .collect();

    let mut block = vec![0u8; n];
    let mut pos = primary;
    for out in block.iter_mut().rev() {
        *out = transformed[pos];
        pos = lf[pos];
    }
    Ok(block)
}

impl Compression for Bwt {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let block_size = self.block_size.unwrap_or(data.len()).max(1);
        let mut out = Vec::with_capacity(data.len() + 8 * (data.len() / block_size + 1));

        let mut blocks = 0usize;
        for block in data.chunks(block_size) {
            let (transformed, primary) = bwt_transform(block);
            put_u32(&mut out, NAME, "block length", block.len())?;
            put_u32(&mut out, NAME, "primary index", primary)?;
            out.extend_from_slice(&transformed);
            trace!(
                "bwt: block {} of {} bytes, primary index {}",
                blocks,
                block.len(),
                primary
            );
            blocks += 1;
        }

        debug!(
            "bwt: {} bytes in {} blocks -> {} bytes",
            data.len(),
            blocks,
            out.len()
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut reader = FieldReader::new(NAME, data);
        let mut out = Vec::with_capacity(data.len());

        let mut blocks = 0usize;
        while !reader.is_empty() {
            let length = reader.read_u32()? as usize;
            let primary = reader.read_u32()? as usize;
            let transformed = reader.read_bytes(length)?;
            out.extend_from_slice(&bwt_inverse(transformed, primary)?);
            blocks += 1;
        }

        debug!("bwt: {} blocks -> {} bytes restored", blocks, out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sorts explicit rotations; only usable for small blocks.
    fn naive_transform(input: &[u8]) -> (Vec<u8>, usize) {
        let n = input.len();
        let mut rotations: Vec<(Vec<u8>, usize)> = (0..n)
            .map(|i| {
                let mut rotation = input[i..].to_vec();
                rotation.extend_from_slice(&input[..i]);
                (rotation, i)
            })
            .collect();
        rotations.sort();
        let transformed = rotations.iter().map(|(rot, _)| rot[n - 1]).collect();
        let primary = rotations.iter().position(|(_, i)| *i == 0).unwrap();
        (transformed, primary)
    }

    #[test]
    fn test_bwt_transform_empty() {
        let (transformed, index) = bwt_transform(b"");
        assert_eq!(transformed, Vec::<u8>::new());
        assert_eq!(index, 0);
    }

    #[test]
    fn test_bwt_transform_single_char() {
        let (transformed, index) = bwt_transform(b"a");
        assert_eq!(transformed, b"a");
        assert_eq!(index, 0);
    }

    #[test]
    fn test_bwt_transform_banana() {
        // Sorted rotations: abanan, anaban, ananab, banana, nabana, nanaba
        let (transformed, index) = bwt_transform(b"banana");
        assert_eq!(transformed, b"nnbaaa");
        assert_eq!(index, 3);
        assert_eq!(bwt_inverse(&transformed, index).unwrap(), b"banana");
    }

    #[test]
    fn test_bwt_transform_mississippi() {
        let (transformed, index) = bwt_transform(b"mississippi");
        assert_eq!(transformed, b"pssmipissii");
        assert_eq!(index, 4);
    }

    #[test]
    fn test_matches_naive_rotation_sort() {
        let inputs: [&[u8]; 6] = [
            b"abracadabra",
            b"the quick brown fox jumps over the lazy dog",
            b"zyxwvutsrqponm",
            b"aaaaaaaab",
            b"\x00\xff\x00\xff\x01",
            b"abcabcabd",
        ];
        for input in inputs {
            let (transformed, primary) = bwt_transform(input);
            let (expected, _) = naive_transform(input);
            assert_eq!(transformed, expected, "input {:?}", input);
            assert!(primary < input.len());
            assert_eq!(bwt_inverse(&transformed, primary).unwrap(), input);
        }
    }

    #[test]
    fn test_periodic_block_round_trip() {
        let inputs: [&[u8]; 3] = [b"abababab", b"aaaa", b"xyzxyz"];
        for input in inputs {
            let (transformed, primary) = bwt_transform(input);
            assert!(primary < input.len());
            assert_eq!(bwt_inverse(&transformed, primary).unwrap(), input);
        }
    }

    #[test]
    fn test_inverse_rejects_bad_primary() {
        let err = bwt_inverse(b"nnbaaa", 6).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_record_layout() {
        let bwt = Bwt::new();
        let encoded = bwt.compress(b"banana").unwrap();
        assert_eq!(&encoded[..8], &[0, 0, 0, 6, 0, 0, 0, 3]);
        assert_eq!(&encoded[8..], b"nnbaaa");
    }

    #[test]
    fn test_blocks_round_trip() {
        let bwt = Bwt::with_block_size(4).unwrap();
        let input = b"the rain in spain stays mainly in the plain";
        let encoded = bwt.compress(input).unwrap();
        let blocks = input.len().div_ceil(4);
        assert_eq!(encoded.len(), input.len() + 8 * blocks);
        assert_eq!(bwt.decompress(&encoded).unwrap(), input);
    }

    #[test]
    fn test_empty_round_trip() {
        let bwt = Bwt::with_block_size(16).unwrap();
        assert!(bwt.compress(b"").unwrap().is_empty());
        assert!(bwt.decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn test_truncated_records() {
        let bwt = Bwt::new();
        let encoded = bwt.compress(b"banana").unwrap();
        assert!(bwt.decompress(&encoded[..5]).unwrap_err().is_format_error());
        assert!(bwt
            .decompress(&encoded[..encoded.len() - 1])
            .unwrap_err()
            .is_format_error());
    }

    #[test]
    fn test_block_size_validation() {
        assert!(Bwt::with_block_size(0).is_err());
        assert_eq!(Bwt::with_block_size(512).unwrap().block_size(), Some(512));
    }
}
