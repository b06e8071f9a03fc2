//! Huffman coding with a self-describing frequency header.
//!
//! Stream layout:
//!
//! ```text
//! [u16 distinct symbols]
//! [u8 symbol][u32 frequency]   (once per distinct symbol, in order of first appearance)
//! [u8 pad bits]
//! [packed codes, most significant bit first, zero padded to a whole byte]
//! ```
//!
//! The header stores frequencies rather than the tree, so the decoder rebuilds the tree
//! with the same procedure the encoder used. Tree construction only depends on the order
//! of the header entries and on [`BinaryHeap`] extraction order, which makes it
//! deterministic.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use bitvec::prelude::*;
use log::debug;

use super::fields::{put_u16, put_u32, FieldReader};
use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "huffman";

/// Bit string of one Huffman code, most significant (first read) bit first.
pub type Code = BitVec<u8, Msb0>;

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf node contains a symbol and its frequency.
    Leaf { symbol: u8, freq: usize },
    /// An internal node with left and right children and combined frequency.
    Internal {
        freq: usize,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> usize {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }
}

/// A helper wrapper for HuffmanNode for use in a BinaryHeap.
/// We want the node with the smallest frequency to have highest priority.
/// Equal frequencies compare equal, so ties are settled by the heap itself.
#[derive(Debug)]
struct NodeWrapper(Box<HuffmanNode>);

impl Ord for NodeWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: lower frequency should come first.
        other.0.freq().cmp(&self.0.freq())
    }
}

impl PartialOrd for NodeWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.0.freq() == other.0.freq()
    }
}

impl Eq for NodeWrapper {}

/// Symbol frequencies of one input, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(u8, usize)>,
}

impl FrequencyTable {
    /// Counts every byte of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0usize; 256];
        let mut order = Vec::new();
        for &byte in data {
            if counts[byte as usize] == 0 {
                order.push(byte);
            }
            counts[byte as usize] += 1;
        }
        FrequencyTable {
            entries: order
                .into_iter()
                .map(|symbol| (symbol, counts[symbol as usize]))
                .collect(),
        }
    }

    /// Frequency of `symbol`, zero if it never occurs.
    pub fn get(&self, symbol: u8) -> usize {
        self.entries
            .iter()
            .find(|(s, _)| *s == symbol)
            .map_or(0, |&(_, f)| f)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all frequencies, i.e. the length of the counted input.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|&(_, f)| f).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.entries.iter().copied()
    }
}

/// Build the Huffman tree given a frequency table.
/// Returns `None` if the frequency table is empty.
///
/// The two lowest-frequency nodes are merged repeatedly, the first one extracted
/// becoming the left child.
pub fn build_huffman_tree(freq_table: &FrequencyTable) -> Option<Box<HuffmanNode>> {
    let mut heap = BinaryHeap::with_capacity(freq_table.len());
    // Create a leaf node for each symbol and push it into the heap.
    for (symbol, freq) in freq_table.iter() {
        heap.push(NodeWrapper(Box::new(HuffmanNode::Leaf { symbol, freq })));
    }
    // Combine nodes until only one tree remains.
    loop {
        let NodeWrapper(left) = heap.pop()?;
        let Some(NodeWrapper(right)) = heap.pop() else {
            return Some(left);
        };
        let combined_freq = left.freq() + right.freq();
        heap.push(NodeWrapper(Box::new(HuffmanNode::Internal {
            freq: combined_freq,
            left,
            right,
        })));
    }
}

/// Recursively build the code table mapping symbols to their Huffman codes.
///
/// If the tree consists of a single leaf (i.e. one unique symbol), the code "0" is assigned.
pub fn build_code_table(node: &HuffmanNode) -> BTreeMap<u8, Code> {
    let mut table = BTreeMap::new();
    build_code_table_helper(node, Code::new(), &mut table);
    table
}

fn build_code_table_helper(node: &HuffmanNode, prefix: Code, table: &mut BTreeMap<u8, Code>) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            let code = if prefix.is_empty() {
                bitvec![u8, Msb0; 0]
            } else {
                prefix
            };
            table.insert(*symbol, code);
        }
        HuffmanNode::Internal { left, right, .. } => {
            let mut left_prefix = prefix.clone();
            left_prefix.push(false);
            build_code_table_helper(left, left_prefix, table);
            let mut right_prefix = prefix;
            right_prefix.push(true);
            build_code_table_helper(right, right_prefix, table);
        }
    }
}

/// Code length of every symbol in the tree.
pub fn code_lengths(node: &HuffmanNode) -> BTreeMap<u8, usize> {
    build_code_table(node)
        .into_iter()
        .map(|(symbol, code)| (symbol, code.len()))
        .collect()
}

/// Encode the input using the provided code table.
/// Each byte is replaced with its Huffman code.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if a byte of `data` has no code.
pub fn encode(data: &[u8], code_table: &BTreeMap<u8, Code>) -> Result<Code> {
    let mut lookup: Vec<Option<&Code>> = vec![None; 256];
    for (&symbol, code) in code_table {
        lookup[symbol as usize] = Some(code);
    }
    let mut bits = Code::with_capacity(data.len() * 2);
    for &byte in data {
        let code = lookup[byte as usize].ok_or_else(|| {
            Error::invalid_parameter(NAME, format!("no code for byte {}", byte))
        })?;
        bits.extend_from_bitslice(code.as_bitslice());
    }
    Ok(bits)
}

/// Decode a bit string using the Huffman tree.
/// Traverses the tree according to each bit until a leaf is reached.
///
/// # Errors
///
/// Returns [`Error::Format`] when the bits end in the middle of a code, or when a
/// single-leaf tree meets a bit other than the `0` placeholder code.
pub fn decode(bits: &BitSlice<u8, Msb0>, tree: &HuffmanNode) -> Result<Vec<u8>> {
    // Special case: if tree is a leaf, each '0' represents one occurrence
    if let HuffmanNode::Leaf { symbol, .. } = tree {
        if bits.any() {
            return Err(Error::format(NAME, "single-symbol stream contains a 1 bit"));
        }
        return Ok(vec![*symbol; bits.len()]);
    }

    let mut result = Vec::with_capacity(bits.len() / 2);
    let mut current = tree;
    for bit in bits.iter().by_vals() {
        if let HuffmanNode::Internal { left, right, .. } = current {
            current = if bit { &**right } else { &**left };
        }
        if let HuffmanNode::Leaf { symbol, .. } = current {
            result.push(*symbol);
            current = tree;
        }
    }
    if !std::ptr::eq(current, tree) {
        return Err(Error::format(NAME, "bit stream ends in the middle of a code"));
    }
    Ok(result)
}

fn write_header(out: &mut Vec<u8>, freq_table: &FrequencyTable, pad: usize) -> Result<()> {
    put_u16(out, NAME, "symbol count", freq_table.len())?;
    for (symbol, freq) in freq_table.iter() {
        out.push(symbol);
        put_u32(out, NAME, "frequency", freq)?;
    }
    out.push(pad as u8);
    Ok(())
}

fn read_header(reader: &mut FieldReader<'_>) -> Result<(FrequencyTable, usize)> {
    let count = reader.read_u16()? as usize;
    if count == 0 {
        return Err(Error::format(NAME, "header declares no symbols"));
    }

    let mut seen = [false; 256];
    let mut entries = Vec::with_capacity(count.min(256));
    for _ in 0..count {
        let symbol = reader.read_u8()?;
        let freq = reader.read_u32()? as usize;
        if seen[symbol as usize] {
            return Err(Error::format(
                NAME,
                format!("symbol {} listed twice in header", symbol),
            ));
        }
        if freq == 0 {
            return Err(Error::format(
                NAME,
                format!("symbol {} has zero frequency", symbol),
            ));
        }
        seen[symbol as usize] = true;
        entries.push((symbol, freq));
    }

    let pad = reader.read_u8()? as usize;
    if pad > 7 {
        return Err(Error::format(NAME, format!("pad length {} exceeds 7", pad)));
    }
    Ok((FrequencyTable { entries }, pad))
}

/// Huffman entropy coder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Huffman;

impl Compression for Huffman {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let freq_table = FrequencyTable::from_bytes(data);
        let Some(tree) = build_huffman_tree(&freq_table) else {
            return Ok(Vec::new());
        };
        let code_table = build_code_table(&tree);

        let mut bits = encode(data, &code_table)?;
        let pad = (8 - bits.len() % 8) % 8;
        bits.resize(bits.len() + pad, false);

        let mut out = Vec::with_capacity(3 + 5 * freq_table.len() + bits.len() / 8);
        write_header(&mut out, &freq_table, pad)?;
        out.extend_from_slice(&bits.into_vec());

        debug!(
            "huffman: {} bytes, {} symbols -> {} bytes",
            data.len(),
            freq_table.len(),
            out.len()
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let mut reader = FieldReader::new(NAME, data);
        let (freq_table, pad) = read_header(&mut reader)?;
        let payload = reader.rest();

        let bits = payload.view_bits::<Msb0>();
        if pad > bits.len() {
            return Err(Error::format(
                NAME,
                format!("pad length {} exceeds {} payload bits", pad, bits.len()),
            ));
        }
        let bits = &bits[..bits.len() - pad];

        let tree = build_huffman_tree(&freq_table)
            .ok_or_else(|| Error::format(NAME, "header declares no symbols"))?;
        let out = decode(bits, &tree)?;

        let expected = freq_table.total();
        if out.len() != expected {
            return Err(Error::format(
                NAME,
                format!(
                    "decoded {} symbols but header frequencies sum to {}",
                    out.len(),
                    expected
                ),
            ));
        }

        debug!(
            "huffman: {} bytes, {} symbols -> {} bytes restored",
            data.len(),
            freq_table.len(),
            out.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_table() {
        let freq = FrequencyTable::from_bytes(b"aabccc");
        assert_eq!(freq.get(b'a'), 2);
        assert_eq!(freq.get(b'b'), 1);
        assert_eq!(freq.get(b'c'), 3);
        assert_eq!(freq.get(b'z'), 0);
        assert_eq!(freq.total(), 6);
        // Order of first appearance
        let symbols: Vec<u8> = freq.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, b"abc");
    }

    #[test]
    fn test_huffman_tree_and_code_table() {
        let input = b"this is an example for huffman encoding";
        let freq = FrequencyTable::from_bytes(input);
        let tree = build_huffman_tree(&freq).expect("Tree should be built");
        assert_eq!(tree.freq(), input.len());
        let code_table = build_code_table(&tree);
        // Each byte in input must have a code.
        for byte in input {
            assert!(code_table.contains_key(byte), "Missing code for '{}'", byte);
        }
        // No code is a prefix of another.
        for (a, code_a) in &code_table {
            for (b, code_b) in &code_table {
                if a != b && code_a.len() <= code_b.len() {
                    assert_ne!(code_a.as_bitslice(), &code_b[..code_a.len()]);
                }
            }
        }
    }

    #[test]
    fn test_empty_table_has_no_tree() {
        assert!(build_huffman_tree(&FrequencyTable::default()).is_none());
    }

    #[test]
    fn test_frequent_symbols_get_shorter_codes() {
        let freq = FrequencyTable::from_bytes(b"aaaaaaaabbbc");
        let tree = build_huffman_tree(&freq).unwrap();
        let lengths = code_lengths(&tree);
        assert_eq!(lengths[&b'a'], 1);
        assert_eq!(lengths[&b'b'], 2);
        assert_eq!(lengths[&b'c'], 2);
    }

    #[test]
    fn test_encode_decode() {
        let input = b"huffman coding in rust is fun!";
        let freq = FrequencyTable::from_bytes(input);
        let tree = build_huffman_tree(&freq).unwrap();
        let bits = encode(input, &build_code_table(&tree)).unwrap();
        assert_eq!(decode(&bits, &tree).unwrap(), input);
    }

    #[test]
    fn test_single_character() {
        let input = b"aaaaaaa";
        let huffman = Huffman;
        let encoded = huffman.compress(input).unwrap();
        // 1 symbol: count, one entry, pad byte, then seven '0' bits in one byte.
        assert_eq!(encoded, [0, 1, b'a', 0, 0, 0, 7, 1, 0x00]);
        assert_eq!(huffman.decompress(&encoded).unwrap(), input);
    }

    #[test]
    fn test_header_layout() {
        let encoded = Huffman.compress(b"abb").unwrap();
        // a: 1, b: 2 -> heap pops a (1) then b (2); a = 0, b = 1; bits 011 + 5 pad.
        assert_eq!(
            encoded,
            [0, 2, b'a', 0, 0, 0, 1, b'b', 0, 0, 0, 2, 5, 0b0110_0000]
        );
    }

    #[test]
    fn test_header_rebuilds_same_tree() {
        let inputs: [&[u8]; 4] = [
            b"abracadabra",
            b"aabbccddeeff",
            b"\x00\x01\x02\x03\x04\x05\x06\x07",
            b"mississippi river banks",
        ];
        for input in inputs {
            let freq = FrequencyTable::from_bytes(input);
            let tree = build_huffman_tree(&freq).unwrap();

            let mut header = Vec::new();
            write_header(&mut header, &freq, 3).unwrap();
            let mut reader = FieldReader::new(NAME, &header);
            let (decoded, pad) = read_header(&mut reader).unwrap();
            assert_eq!(pad, 3);
            assert_eq!(decoded, freq);

            let rebuilt = build_huffman_tree(&decoded).unwrap();
            assert_eq!(code_lengths(&rebuilt), code_lengths(&tree));
            assert_eq!(rebuilt, tree);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(Huffman.compress(b"").unwrap().is_empty());
        assert!(Huffman.decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn test_all_byte_values() {
        let input: Vec<u8> = (0..=255u8).flat_map(|b| vec![b; b as usize % 7 + 1]).collect();
        let encoded = Huffman.compress(&input).unwrap();
        assert_eq!(Huffman.decompress(&encoded).unwrap(), input);
    }

    #[test]
    fn test_truncated_header() {
        let encoded = Huffman.compress(b"hello").unwrap();
        assert!(Huffman.decompress(&encoded[..4]).unwrap_err().is_format_error());
    }

    #[test]
    fn test_truncated_payload() {
        let input = b"hello huffman, hello again";
        let encoded = Huffman.compress(input).unwrap();
        let err = Huffman
            .decompress(&encoded[..encoded.len() - 2])
            .unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_corrupt_header_values() {
        // Zero symbols
        assert!(Huffman.decompress(&[0, 0, 0]).is_err());
        // Duplicate symbol
        assert!(Huffman
            .decompress(&[0, 2, b'a', 0, 0, 0, 1, b'a', 0, 0, 0, 1, 6, 0x40])
            .is_err());
        // Pad length above 7
        assert!(Huffman.decompress(&[0, 1, b'a', 0, 0, 0, 1, 9, 0]).is_err());
    }
}
