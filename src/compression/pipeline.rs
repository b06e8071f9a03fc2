//! Chains codecs: compress runs stages first to last, decompress runs them last to first.

use log::debug;

use super::{Compression, Result};
use crate::error::Error;

const NAME: &str = "pipeline";

/// An ordered list of codecs applied as one.
///
/// A pipeline is itself a [`Compression`], so pipelines nest. Stage failures are wrapped in
/// [`Error::Stage`] naming the index and codec of the stage that failed; no partial output
/// is returned.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Compression>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Compression>>) -> Self {
        Pipeline { stages }
    }

    /// Appends a stage, builder style.
    ///
    /// ```
    /// use compkit::compression::{Huffman, Mtf, Pipeline};
    ///
    /// let pipeline = Pipeline::default().then(Mtf::default()).then(Huffman);
    /// assert_eq!(pipeline.len(), 2);
    /// ```
    pub fn then<C: Compression + 'static>(mut self, codec: C) -> Self {
        self.push(Box::new(codec));
        self
    }

    pub fn push(&mut self, codec: Box<dyn Compression>) {
        self.stages.push(codec);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Box<dyn Compression>] {
        &self.stages
    }

    fn stage_error(index: usize, stage: &dyn Compression, source: Error) -> Error {
        Error::Stage {
            index,
            codec: stage.name(),
            source: Box::new(source),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|stage| stage.name()))
            .finish()
    }
}

impl Compression for Pipeline {
    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut buf = data.to_vec();
        for (index, stage) in self.stages.iter().enumerate() {
            let before = buf.len();
            buf = stage
                .compress(&buf)
                .map_err(|e| Self::stage_error(index, &**stage, e))?;
            debug!(
                "pipeline: stage {} ({}) {} -> {} bytes",
                index,
                stage.name(),
                before,
                buf.len()
            );
        }
        Ok(buf)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut buf = data.to_vec();
        for (index, stage) in self.stages.iter().enumerate().rev() {
            let before = buf.len();
            buf = stage
                .decompress(&buf)
                .map_err(|e| Self::stage_error(index, &**stage, e))?;
            debug!(
                "pipeline: stage {} ({}) {} -> {} bytes restored",
                index,
                stage.name(),
                before,
                buf.len()
            );
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{Bwt, Huffman, Lz77, Lzw, Mtf, Rle, RlePair};

    fn bzip_like() -> Pipeline {
        Pipeline::new(vec![
            Box::new(Bwt::with_block_size(64).unwrap()),
            Box::new(Mtf::default()),
            Box::new(Rle::default()),
            Box::new(Huffman),
        ])
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = Pipeline::default();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.compress(b"abc").unwrap(), b"abc");
        assert_eq!(pipeline.decompress(b"abc").unwrap(), b"abc");
    }

    #[test]
    fn test_round_trip() {
        let pipeline = bzip_like();
        let input = b"how much wood would a woodchuck chuck if a woodchuck could chuck wood"
            .repeat(8);
        let packed = pipeline.compress(&input).unwrap();
        assert_eq!(pipeline.decompress(&packed).unwrap(), input);
    }

    #[test]
    fn test_empty_input() {
        let pipeline = bzip_like();
        assert!(pipeline.compress(b"").unwrap().is_empty());
        assert!(pipeline.decompress(b"").unwrap().is_empty());
    }

    #[test]
    fn test_stage_order() {
        let pipeline = Pipeline::default().then(Mtf::default()).then(RlePair::default());
        let by_hand = RlePair::default()
            .compress(&Mtf::default().compress(b"aaab").unwrap())
            .unwrap();
        assert_eq!(pipeline.compress(b"aaab").unwrap(), by_hand);
    }

    #[test]
    fn test_nested_pipelines() {
        let inner = Pipeline::default().then(Lz77::new(64, 16).unwrap()).then(Huffman);
        let outer = Pipeline::default().then(inner).then(Lzw);
        let input = b"nesting nesting nesting nests";
        let packed = outer.compress(input).unwrap();
        assert_eq!(outer.decompress(&packed).unwrap(), input);
    }

    #[test]
    fn test_failing_stage_is_named() {
        let pipeline = Pipeline::default().then(Mtf::default()).then(RlePair::default());
        // Odd length fails in the last stage, which decompress runs first.
        let err = pipeline.decompress(&[1, 2, 3]).unwrap_err();
        match &err {
            Error::Stage { index, codec, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(*codec, "rle-pair");
            }
            other => panic!("expected stage error, got {:?}", other),
        }
        assert!(err.is_format_error());
    }

    #[test]
    fn test_debug_lists_stage_names() {
        assert_eq!(
            format!("{:?}", bzip_like()),
            r#"["bwt", "mtf", "rle", "huffman"]"#
        );
    }
}
