use crate::codec::{self, Compression};
use crate::error::Result;
use crate::frame::{FrameHeader, FrameMetadata, PixelBuffer};
use crate::io::wire::parse_packet;
use crate::stride::normalize_stride;

/// A packet taken all the way to a dense pixel buffer.
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    pub header: FrameHeader,
    pub pixels: PixelBuffer,
    /// Payload bytes on the wire.
    pub compressed_len: usize,
    /// Bytes after decompression, padding included.
    pub decompressed_len: usize,
}

/// Parse, decompress and stride-normalize one packet.
pub fn decode_frame(
    buf: &[u8],
    metadata: Option<&FrameMetadata>,
    compression: Compression,
) -> Result<DecodedFrame> {
    let packet = parse_packet(buf, metadata)?;
    let h = &packet.header;
    let size_hint = (h.stride_bytes as usize).saturating_mul(h.height as usize);
    let raw = codec::decompress(compression, packet.payload, size_hint)?;
    let pixels = normalize_stride(&raw, h.width, h.height, h.stride_bytes, h.bit_depth)?;

    Ok(DecodedFrame {
        compressed_len: packet.payload.len(),
        decompressed_len: raw.len(),
        header: packet.header,
        pixels,
    })
}
