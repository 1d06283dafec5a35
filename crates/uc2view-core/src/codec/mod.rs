//! Payload decompression.
//!
//! Every algorithm implements [`Decompressor`]; [`decompressor_for`] maps a
//! declared [`Compression`] to an implementation. `Compression::Auto` sniffs
//! the payload's magic bytes first.

#[cfg(feature = "lz4")]
mod lz4;
mod raw;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, ViewerError};

#[cfg(feature = "lz4")]
pub use lz4::Lz4FrameCodec;
pub use raw::RawCodec;

/// LZ4 frame format magic (0x184D2204, little-endian).
pub const LZ4_FRAME_MAGIC: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

/// Legacy LZ4 magic (0x184C2102), not supported.
pub const LZ4_LEGACY_MAGIC: [u8; 4] = [0x02, 0x21, 0x4C, 0x18];

/// Underlying cause of a failed decompression.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unknown compression algorithm `{0}`")]
    UnknownAlgorithm(String),

    #[error("algorithm `{0}` is not compiled into this build")]
    NotAvailable(Compression),

    #[error("unsupported stream format: {0}")]
    UnsupportedFormat(&'static str),

    #[error("corrupt stream: {0}")]
    Corrupt(#[from] std::io::Error),
}

/// Declared compression of a stream's payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Detect from the payload's magic bytes.
    #[default]
    Auto,
    None,
    Lz4,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Auto => write!(f, "auto"),
            Compression::None => write!(f, "none"),
            Compression::Lz4 => write!(f, "lz4"),
        }
    }
}

impl FromStr for Compression {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Compression::Auto),
            "none" | "raw" | "binary" => Ok(Compression::None),
            "lz4" => Ok(Compression::Lz4),
            other => Err(ViewerError::Decompression {
                algorithm: other.to_string(),
                source: CodecError::UnknownAlgorithm(other.to_string()),
            }),
        }
    }
}

impl Compression {
    /// Whether this build can decode the algorithm.
    pub fn is_available(self) -> bool {
        match self {
            Compression::Auto | Compression::None => true,
            Compression::Lz4 => cfg!(feature = "lz4"),
        }
    }

    /// Resolve `Auto` against a payload. Concrete algorithms pass through.
    pub fn resolve(self, payload: &[u8]) -> std::result::Result<Compression, CodecError> {
        if self != Compression::Auto {
            return Ok(self);
        }
        match payload.get(..4) {
            Some(m) if m == LZ4_FRAME_MAGIC => Ok(Compression::Lz4),
            Some(m) if m == LZ4_LEGACY_MAGIC => Err(CodecError::UnsupportedFormat("legacy LZ4")),
            _ => Ok(Compression::None),
        }
    }
}

/// A payload decompression algorithm.
pub trait Decompressor {
    fn algorithm(&self) -> Compression;

    /// Decompress `input`. `size_hint` is the expected output length, used
    /// only to pre-size the output buffer.
    fn decompress(&self, input: &[u8], size_hint: usize)
        -> std::result::Result<Vec<u8>, CodecError>;

    fn compress(&self, input: &[u8]) -> std::result::Result<Vec<u8>, CodecError>;
}

/// Look up the implementation for a concrete algorithm.
pub fn decompressor_for(
    algorithm: Compression,
) -> std::result::Result<Box<dyn Decompressor>, CodecError> {
    match algorithm {
        Compression::None => Ok(Box::new(RawCodec)),
        #[cfg(feature = "lz4")]
        Compression::Lz4 => Ok(Box::new(Lz4FrameCodec)),
        #[cfg(not(feature = "lz4"))]
        Compression::Lz4 => Err(CodecError::NotAvailable(Compression::Lz4)),
        Compression::Auto => Err(CodecError::UnsupportedFormat(
            "`auto` must be resolved against a payload first",
        )),
    }
}

/// Decompress a payload declared as `algorithm`.
pub fn decompress(algorithm: Compression, payload: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    let wrap = |algorithm: Compression, source: CodecError| ViewerError::Decompression {
        algorithm: algorithm.to_string(),
        source,
    };
    let resolved = algorithm.resolve(payload).map_err(|e| wrap(algorithm, e))?;
    let codec = decompressor_for(resolved).map_err(|e| wrap(resolved, e))?;
    codec
        .decompress(payload, size_hint)
        .map_err(|e| wrap(resolved, e))
}

/// Compress raw bytes with a concrete algorithm (`Auto` means no compression).
pub fn compress(algorithm: Compression, raw: &[u8]) -> Result<Vec<u8>> {
    let concrete = match algorithm {
        Compression::Auto => Compression::None,
        other => other,
    };
    let wrap = |source| ViewerError::Decompression {
        algorithm: concrete.to_string(),
        source,
    };
    decompressor_for(concrete)
        .map_err(wrap)?
        .compress(raw)
        .map_err(wrap)
}
