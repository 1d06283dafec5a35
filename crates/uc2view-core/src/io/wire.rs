use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::consts::{FRAME_FORMAT_VERSION, FRAME_HEADER_SIZE, FRAME_MAGIC};
use crate::error::{Result, ViewerError};
use crate::frame::{bytes_per_sample, FrameHeader, FrameMetadata};

/// A parsed packet: header plus a zero-copy view of the compressed payload.
#[derive(Debug)]
pub struct FramePacket<'a> {
    pub header: FrameHeader,
    pub payload: &'a [u8],
}

/// Parse a self-describing packet, trusting the header's compressed length.
pub fn parse_frame(buf: &[u8]) -> Result<FramePacket<'_>> {
    let header = parse_header(buf)?;
    let len = header.compressed_byte_count as usize;
    slice_payload(buf, header, len)
}

/// Parse a packet whose true compressed length comes from out-of-band
/// metadata. The header's own length field is ignored.
pub fn parse_frame_with_metadata<'a>(
    buf: &'a [u8],
    metadata: &FrameMetadata,
) -> Result<FramePacket<'a>> {
    let mut header = parse_header(buf)?;
    if header.compressed_byte_count != metadata.compressed_byte_count {
        tracing::debug!(
            header = header.compressed_byte_count,
            metadata = metadata.compressed_byte_count,
            "compressed length overridden by metadata"
        );
    }
    header.compressed_byte_count = metadata.compressed_byte_count;
    let len = header.compressed_byte_count as usize;
    slice_payload(buf, header, len)
}

/// Dispatch to the right entry point depending on whether metadata is present.
pub fn parse_packet<'a>(
    buf: &'a [u8],
    metadata: Option<&FrameMetadata>,
) -> Result<FramePacket<'a>> {
    match metadata {
        Some(meta) => parse_frame_with_metadata(buf, meta),
        None => parse_frame(buf),
    }
}

fn slice_payload(buf: &[u8], header: FrameHeader, len: usize) -> Result<FramePacket<'_>> {
    let end = FRAME_HEADER_SIZE
        .checked_add(len)
        .ok_or_else(|| ViewerError::MalformedFrame("compressed length overflows".into()))?;
    if buf.len() < end {
        return Err(ViewerError::MalformedFrame(format!(
            "packet truncated: header declares {len} payload bytes, only {} available",
            buf.len() - FRAME_HEADER_SIZE
        )));
    }
    Ok(FramePacket {
        header,
        payload: &buf[FRAME_HEADER_SIZE..end],
    })
}

/// Decode the fixed-size header fields and validate them.
pub fn parse_header(buf: &[u8]) -> Result<FrameHeader> {
    if buf.len() < FRAME_HEADER_SIZE {
        return Err(ViewerError::MalformedFrame(format!(
            "buffer of {} bytes is shorter than the {FRAME_HEADER_SIZE}-byte header",
            buf.len()
        )));
    }
    if &buf[0..4] != FRAME_MAGIC {
        return Err(ViewerError::MalformedFrame(format!(
            "bad magic {:02x?}",
            &buf[0..4]
        )));
    }

    let version = buf[4];
    let mut cursor = Cursor::new(&buf[8..FRAME_HEADER_SIZE]); // skip magic, version, reserved
    let width = cursor.read_u32::<LittleEndian>()?;
    let height = cursor.read_u32::<LittleEndian>()?;
    let stride_bytes = cursor.read_u32::<LittleEndian>()?;
    let bit_depth = cursor.read_u16::<LittleEndian>()?;
    let channel_count = cursor.read_u8()? as u16;
    let pixel_format_code = cursor.read_u8()? as u16;
    let timestamp = cursor.read_u64::<LittleEndian>()?;
    let compressed_byte_count = cursor.read_u32::<LittleEndian>()?;

    let header = FrameHeader {
        version,
        width,
        height,
        stride_bytes,
        bit_depth,
        channel_count,
        pixel_format_code,
        timestamp,
        compressed_byte_count,
    };
    validate(&header)?;
    Ok(header)
}

fn validate(header: &FrameHeader) -> Result<()> {
    if header.width == 0 || header.height == 0 {
        return Err(ViewerError::MalformedFrame(format!(
            "invalid dimensions {}x{}",
            header.width, header.height
        )));
    }
    if !(1..=16).contains(&header.bit_depth) {
        return Err(ViewerError::MalformedFrame(format!(
            "unsupported bit depth {}",
            header.bit_depth
        )));
    }
    if header.channel_count != 1 {
        return Err(ViewerError::MalformedFrame(format!(
            "expected a single channel, got {}",
            header.channel_count
        )));
    }
    if (header.stride_bytes as usize) < header.row_bytes() {
        return Err(ViewerError::MalformedFrame(format!(
            "stride {} is smaller than a {}-pixel row ({} bytes)",
            header.stride_bytes,
            header.width,
            header.row_bytes()
        )));
    }
    Ok(())
}

/// Fields needed to write a packet header. The compressed length is taken
/// from the payload.
#[derive(Clone, Debug)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pub stride_bytes: u32,
    pub bit_depth: u16,
    pub pixel_format_code: u16,
    pub timestamp: u64,
}

impl FrameLayout {
    /// Densely packed layout (no row padding).
    pub fn dense(width: u32, height: u32, bit_depth: u16) -> Self {
        Self {
            width,
            height,
            stride_bytes: width * bytes_per_sample(bit_depth) as u32,
            bit_depth,
            pixel_format_code: if bit_depth <= 8 { 0 } else { 1 },
            timestamp: 0,
        }
    }
}

/// Serialize a packet: header followed by the (already compressed) payload.
pub fn encode_frame(layout: &FrameLayout, payload: &[u8]) -> Result<Vec<u8>> {
    let payload_len = u32::try_from(payload.len())
        .map_err(|_| ViewerError::MalformedFrame("payload exceeds 4 GiB".into()))?;
    let channel = 1u8;
    let pixfmt = u8::try_from(layout.pixel_format_code).map_err(|_| {
        ViewerError::MalformedFrame(format!(
            "pixel format code {} does not fit the wire field",
            layout.pixel_format_code
        ))
    })?;

    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.extend_from_slice(FRAME_MAGIC);
    buf.write_u8(FRAME_FORMAT_VERSION)?;
    buf.extend_from_slice(&[0u8; 3]);
    buf.write_u32::<LittleEndian>(layout.width)?;
    buf.write_u32::<LittleEndian>(layout.height)?;
    buf.write_u32::<LittleEndian>(layout.stride_bytes)?;
    buf.write_u16::<LittleEndian>(layout.bit_depth)?;
    buf.write_u8(channel)?;
    buf.write_u8(pixfmt)?;
    buf.write_u64::<LittleEndian>(layout.timestamp)?;
    buf.write_u32::<LittleEndian>(payload_len)?;
    debug_assert_eq!(buf.len(), FRAME_HEADER_SIZE);
    buf.extend_from_slice(payload);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fields_land_at_fixed_offsets() {
        let layout = FrameLayout {
            width: 0x0102,
            height: 0x0304,
            stride_bytes: 0x0206,
            bit_depth: 12,
            pixel_format_code: 1,
            timestamp: 0x1122_3344_5566_7788,
        };
        let buf = encode_frame(&layout, &[9, 9, 9]).unwrap();
        assert_eq!(&buf[0..4], b"UC2F");
        assert_eq!(buf[4], FRAME_FORMAT_VERSION);
        assert_eq!(&buf[8..12], &0x0102u32.to_le_bytes());
        assert_eq!(&buf[12..16], &0x0304u32.to_le_bytes());
        assert_eq!(&buf[16..20], &0x0206u32.to_le_bytes());
        assert_eq!(&buf[20..22], &12u16.to_le_bytes());
        assert_eq!(buf[22], 1);
        assert_eq!(buf[23], 1);
        assert_eq!(&buf[24..32], &0x1122_3344_5566_7788u64.to_le_bytes());
        assert_eq!(&buf[32..36], &3u32.to_le_bytes());
        assert_eq!(&buf[36..], &[9, 9, 9]);
    }
}
