//! Compression algorithms implementation.
//!
//! This module provides implementations of the lossless codecs in this crate:
//! - Transforms that reorder or re-rank bytes (Burrows-Wheeler, Move-To-Front)
//! - Run-length encoding (control-byte and legacy pair variants)
//! - Entropy coding (Huffman)
//! - Window-based compression (LZ77, LZSS)
//! - Dictionary-based compression (LZ78, LZW)
//! - Pipelines that chain any of the above
//!
//! Every codec implements [`Compression`] and works on fully materialized buffers.
//! Multi-byte fields in every stream are big-endian.
//!
//! # Examples
//!
//! ```rust
//! use compkit::compression::{Bwt, Compression, Huffman, Mtf, Pipeline, Rle};
//!
//! let pipeline = Pipeline::new(vec![
//!     Box::new(Bwt::with_block_size(512).unwrap()),
//!     Box::new(Mtf::default()),
//!     Box::new(Rle::default()),
//!     Box::new(Huffman),
//! ]);
//!
//! let data = b"banana banana banana banana";
//! let packed = pipeline.compress(data).unwrap();
//! assert_eq!(pipeline.decompress(&packed).unwrap(), data);
//! ```

pub use crate::error::Result;

/// Trait for compression algorithms
///
/// Implementations hold only read-only construction parameters, so a single
/// instance can serve concurrent calls.
pub trait Compression: Send + Sync {
    /// Short lowercase name of the codec, as used in codec descriptions.
    fn name(&self) -> &'static str;

    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

impl<C: Compression + ?Sized> Compression for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).compress(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).decompress(data)
    }
}

mod fields;
mod window;

pub mod bwt;
pub mod huffman;
pub mod lz77;
pub mod lz78;
pub mod lzss;
pub mod lzw;
pub mod mtf;
pub mod pipeline;
pub mod rle;
pub mod rle_pair;

pub use bwt::Bwt;
pub use huffman::{FrequencyTable, Huffman, HuffmanNode};
pub use lz77::Lz77;
pub use lz78::Lz78;
pub use lzss::Lzss;
pub use lzw::Lzw;
pub use mtf::Mtf;
pub use pipeline::Pipeline;
pub use rle::Rle;
pub use rle_pair::RlePair;
