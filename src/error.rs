//! Error type shared by all equalization entry points.
//!
//! Degenerate histograms (every sample at one level) are not errors; they
//! are handled inside the mapping table construction.

use thiserror::Error;

/// Failure modes of the equalization filters.
///
/// All of these are detected while validating input, before any
/// histogram is computed.
#[derive(Debug, Error)]
pub enum EqualizeError {
    /// The buffer or image contains no samples.
    #[error("cannot equalize an empty buffer")]
    EmptyInput,

    /// A plane does not have the same (height, width) as the reference plane.
    #[error("{plane} plane has shape {found:?}, expected {expected:?}")]
    DimensionMismatch {
        plane: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Color images must have 1, 3 or 4 channels.
    #[error("unsupported channel count {0}, expected 1, 3 or 4")]
    UnsupportedChannels(usize),

    /// A flat buffer does not match the declared image shape.
    #[error("buffer holds {found} samples, shape requires {expected}")]
    InvalidBufferLength { expected: usize, found: usize },

    #[error("unknown equalization mode '{0}'")]
    UnknownMode(String),

    #[cfg(feature = "codec")]
    #[error(transparent)]
    Codec(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, EqualizeError>;
