//! Lossless compression codecs sharing one [`Compression`] contract, and pipelines that
//! chain them.

pub mod compression;
pub mod config;
pub mod error;
pub mod metrics;

pub use compression::Compression;
pub use error::{Error, Result};
