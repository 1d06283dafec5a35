use std::io::{Read, Write};

use lz4_flex::frame::{FrameDecoder, FrameEncoder};

use crate::consts::LZ4_MAX_EXPANSION;

use super::{CodecError, Compression, Decompressor};

/// LZ4 frame format (the `lz4.frame` container, not raw blocks).
pub struct Lz4FrameCodec;

impl Decompressor for Lz4FrameCodec {
    fn algorithm(&self) -> Compression {
        Compression::Lz4
    }

    fn decompress(&self, input: &[u8], size_hint: usize) -> Result<Vec<u8>, CodecError> {
        let capacity = size_hint.min(input.len().saturating_mul(LZ4_MAX_EXPANSION));
        let mut out = Vec::with_capacity(capacity);
        FrameDecoder::new(input).read_to_end(&mut out)?;
        Ok(out)
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut encoder = FrameEncoder::new(Vec::with_capacity(input.len() / 2));
        encoder.write_all(input)?;
        encoder
            .finish()
            .map_err(|e| CodecError::Corrupt(std::io::Error::other(e)))
    }
}
