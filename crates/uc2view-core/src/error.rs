use thiserror::Error;

use crate::codec::CodecError;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Decompression failed ({algorithm}): {source}")]
    Decompression {
        algorithm: String,
        #[source]
        source: CodecError,
    },

    #[error("Decompressed buffer too small: need {needed} bytes ({stride} stride x {height} rows), got {actual}")]
    BufferTooSmall {
        needed: usize,
        actual: usize,
        stride: usize,
        height: usize,
    },

    #[error("Render backend unavailable: {0}")]
    RenderBackendUnavailable(String),

    #[error("Uploaded sample count {actual} does not match {width}x{height} = {expected}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ViewerError {
    /// Per-frame errors are recovered by dropping the frame; everything else
    /// changes subsystem-wide behaviour.
    pub fn is_per_frame(&self) -> bool {
        matches!(
            self,
            ViewerError::MalformedFrame(_)
                | ViewerError::Decompression { .. }
                | ViewerError::BufferTooSmall { .. }
                | ViewerError::SizeMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
