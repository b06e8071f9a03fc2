//! Textual codec and pipeline descriptions.
//!
//! A codec is described as `name[:key=value[,key=value...]]`, for example
//! `lzss:window_size=4096,min_match_length=3`. A pipeline joins codec descriptions
//! with `+`: `bwt:block_size=512+mtf+rle+huffman`. Names are case-insensitive and
//! missing parameters take the codec defaults.
//!
//! ```
//! use compkit::config::PipelineSpec;
//! use compkit::Compression;
//!
//! let spec: PipelineSpec = "bwt:block_size=512+mtf+rle+huffman".parse().unwrap();
//! let pipeline = spec.build().unwrap();
//! let packed = pipeline.compress(b"mississippi").unwrap();
//! assert_eq!(pipeline.decompress(&packed).unwrap(), b"mississippi");
//! ```

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::compression::{
    Bwt, Compression, Huffman, Lz77, Lz78, Lzss, Lzw, Mtf, Pipeline, Rle, RlePair,
};
use crate::error::{Error, Result};

/// One codec with its construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecSpec {
    Rle {
        min_run_length: usize,
    },
    RlePair {
        min_run_length: usize,
    },
    Mtf {
        alphabet_length: usize,
    },
    /// `None` transforms the whole input as one block.
    Bwt {
        block_size: Option<usize>,
    },
    Huffman,
    Lz77 {
        window_size: usize,
        lookahead_buffer_size: usize,
    },
    Lzss {
        window_size: usize,
        lookahead_buffer_size: usize,
        min_match_length: usize,
    },
    Lz78,
    Lzw,
}

impl CodecSpec {
    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            CodecSpec::Rle { .. } => "rle",
            CodecSpec::RlePair { .. } => "rle-pair",
            CodecSpec::Mtf { .. } => "mtf",
            CodecSpec::Bwt { .. } => "bwt",
            CodecSpec::Huffman => "huffman",
            CodecSpec::Lz77 { .. } => "lz77",
            CodecSpec::Lzss { .. } => "lzss",
            CodecSpec::Lz78 => "lz78",
            CodecSpec::Lzw => "lzw",
        }
    }

    /// Constructs the codec, applying its parameter validation.
    pub fn build(&self) -> Result<Box<dyn Compression>> {
        let codec: Box<dyn Compression> = match *self {
            CodecSpec::Rle { min_run_length } => Box::new(Rle::new(min_run_length)),
            CodecSpec::RlePair { min_run_length } => Box::new(RlePair::new(min_run_length)),
            CodecSpec::Mtf { alphabet_length } => Box::new(Mtf::new(alphabet_length)?),
            CodecSpec::Bwt { block_size: None } => Box::new(Bwt::new()),
            CodecSpec::Bwt {
                block_size: Some(size),
            } => Box::new(Bwt::with_block_size(size)?),
            CodecSpec::Huffman => Box::new(Huffman),
            CodecSpec::Lz77 {
                window_size,
                lookahead_buffer_size,
            } => Box::new(Lz77::new(window_size, lookahead_buffer_size)?),
            CodecSpec::Lzss {
                window_size,
                lookahead_buffer_size,
                min_match_length,
            } => Box::new(Lzss::new(
                window_size,
                lookahead_buffer_size,
                min_match_length,
            )?),
            CodecSpec::Lz78 => Box::new(Lz78),
            CodecSpec::Lzw => Box::new(Lzw),
        };
        Ok(codec)
    }
}

/// `key=value` pairs of one codec description, consumed as the codec claims them.
struct Params<'a> {
    codec: &'a str,
    entries: Vec<(&'a str, usize)>,
}

impl<'a> Params<'a> {
    fn parse(codec: &'a str, text: &'a str) -> Result<Self> {
        let mut entries: Vec<(&'a str, usize)> = Vec::new();
        for item in text.split(',') {
            let (key, value) = item.split_once('=').ok_or_else(|| {
                Error::Config(format!("{}: expected key=value, got {:?}", codec, item))
            })?;
            let key = key.trim();
            let value = value.trim();
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(Error::Config(format!(
                    "{}: parameter {} given twice",
                    codec, key
                )));
            }
            let value = value.parse::<usize>().map_err(|e| {
                Error::Config(format!(
                    "{}: {}={:?} is not a non-negative integer: {}",
                    codec, key, value, e
                ))
            })?;
            entries.push((key, value));
        }
        Ok(Params { codec, entries })
    }

    fn none(codec: &'a str) -> Self {
        Params {
            codec,
            entries: Vec::new(),
        }
    }

    fn take(&mut self, key: &str) -> Option<usize> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    fn take_or(&mut self, key: &str, default: usize) -> usize {
        self.take(key).unwrap_or(default)
    }

    /// Fails on any parameter the codec did not claim.
    fn finish(self) -> Result<()> {
        match self.entries.first() {
            None => Ok(()),
            Some((key, _)) => Err(Error::Config(format!(
                "{}: unknown parameter {}",
                self.codec, key
            ))),
        }
    }
}

impl FromStr for CodecSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, mut params) = match s.split_once(':') {
            Some((name, params)) => (name.trim(), Params::parse(name.trim(), params)?),
            None => (s, Params::none(s)),
        };

        let spec = match name.to_ascii_lowercase().as_str() {
            "rle" => {
                let defaults = Rle::default();
                CodecSpec::Rle {
                    min_run_length: params.take_or("min_run_length", defaults.min_run_length()),
                }
            }
            "rle-pair" => {
                let defaults = RlePair::default();
                CodecSpec::RlePair {
                    min_run_length: params.take_or("min_run_length", defaults.min_run_length()),
                }
            }
            "mtf" => {
                let defaults = Mtf::default();
                CodecSpec::Mtf {
                    alphabet_length: params
                        .take_or("alphabet_length", defaults.alphabet_length()),
                }
            }
            "bwt" => CodecSpec::Bwt {
                block_size: params.take("block_size"),
            },
            "huffman" | "ha" => CodecSpec::Huffman,
            "lz77" => {
                let defaults = Lz77::default();
                CodecSpec::Lz77 {
                    window_size: params.take_or("window_size", defaults.window_size()),
                    lookahead_buffer_size: params.take_or(
                        "lookahead_buffer_size",
                        defaults.lookahead_buffer_size(),
                    ),
                }
            }
            "lzss" => {
                let defaults = Lzss::default();
                CodecSpec::Lzss {
                    window_size: params.take_or("window_size", defaults.window_size()),
                    lookahead_buffer_size: params.take_or(
                        "lookahead_buffer_size",
                        defaults.lookahead_buffer_size(),
                    ),
                    min_match_length: params
                        .take_or("min_match_length", defaults.min_match_length()),
                }
            }
            "lz78" => CodecSpec::Lz78,
            "lzw" => CodecSpec::Lzw,
            "" => return Err(Error::Config("empty codec name".to_string())),
            other => return Err(Error::Config(format!("unknown codec {:?}", other))),
        };
        params.finish()?;
        Ok(spec)
    }
}

impl Display for CodecSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        match *self {
            CodecSpec::Rle { min_run_length } | CodecSpec::RlePair { min_run_length } => {
                write!(f, ":min_run_length={}", min_run_length)
            }
            CodecSpec::Mtf { alphabet_length } => {
                write!(f, ":alphabet_length={}", alphabet_length)
            }
            CodecSpec::Bwt {
                block_size: Some(size),
            } => write!(f, ":block_size={}", size),
            CodecSpec::Lz77 {
                window_size,
                lookahead_buffer_size,
            } => write!(
                f,
                ":window_size={},lookahead_buffer_size={}",
                window_size, lookahead_buffer_size
            ),
            CodecSpec::Lzss {
                window_size,
                lookahead_buffer_size,
                min_match_length,
            } => write!(
                f,
                ":window_size={},lookahead_buffer_size={},min_match_length={}",
                window_size, lookahead_buffer_size, min_match_length
            ),
            CodecSpec::Bwt { block_size: None }
            | CodecSpec::Huffman
            | CodecSpec::Lz78
            | CodecSpec::Lzw => Ok(()),
        }
    }
}

/// An ordered list of codec descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    pub stages: Vec<CodecSpec>,
}

impl PipelineSpec {
    /// Builds every stage; the first invalid parameter aborts the build.
    pub fn build(&self) -> Result<Pipeline> {
        let stages = self
            .stages
            .iter()
            .map(CodecSpec::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(Pipeline::new(stages))
    }
}

impl FromStr for PipelineSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::Config("empty pipeline".to_string()));
        }
        let stages = s
            .split('+')
            .map(str::parse)
            .collect::<Result<Vec<CodecSpec>>>()?;
        Ok(PipelineSpec { stages })
    }
}

impl Display for PipelineSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}
