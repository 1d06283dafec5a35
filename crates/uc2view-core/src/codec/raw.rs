use super::{CodecError, Compression, Decompressor};

/// Pass-through for uncompressed payloads.
pub struct RawCodec;

impl Decompressor for RawCodec {
    fn algorithm(&self) -> Compression {
        Compression::None
    }

    fn decompress(&self, input: &[u8], _size_hint: usize) -> Result<Vec<u8>, CodecError> {
        Ok(input.to_vec())
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input.to_vec())
    }
}
