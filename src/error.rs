//! Error types shared by every codec, the pipeline and the configuration layer.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building, compressing or decompressing.
#[derive(Debug, Error)]
pub enum Error {
    /// A codec was constructed with parameters it cannot honour.
    #[error("{codec}: invalid parameter: {reason}")]
    InvalidParameter { codec: &'static str, reason: String },

    /// The compressed stream is malformed.
    #[error("{codec}: malformed stream: {reason}")]
    Format { codec: &'static str, reason: String },

    /// The compressed stream ended inside a token or header.
    #[error("{codec}: truncated stream: needed {needed} bytes, {available} available")]
    Truncated {
        codec: &'static str,
        needed: usize,
        available: usize,
    },

    /// A value produced during compression does not fit its fixed-width field.
    #[error("{codec}: {field} value {value} does not fit its field")]
    Overflow {
        codec: &'static str,
        field: &'static str,
        value: usize,
    },

    /// A pipeline stage failed; `index` is the position of the stage in the pipeline.
    #[error("pipeline stage {index} ({codec}) failed: {source}")]
    Stage {
        index: usize,
        codec: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// A codec or pipeline description could not be parsed.
    #[error("invalid codec description: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn format(codec: &'static str, reason: impl Into<String>) -> Self {
        Error::Format {
            codec,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(codec: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            codec,
            reason: reason.into(),
        }
    }

    /// Returns the innermost error, looking through pipeline stage wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True when the error describes a malformed or truncated compressed stream.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::Format { .. } | Error::Truncated { .. }
        )
    }
}
