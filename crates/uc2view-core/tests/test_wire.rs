mod common;

use uc2view_core::codec::Compression;
use uc2view_core::error::ViewerError;
use uc2view_core::frame::{FrameMetadata, PixelFormat};
use uc2view_core::io::wire::{encode_frame, parse_frame, parse_frame_with_metadata, parse_packet, FrameLayout};

use common::{build_packet, flat_packet};

#[test]
fn test_parse_self_describing_packet() {
    let samples: Vec<u16> = (0..12).collect();
    let packet = build_packet(&samples, 4, 3, 8, Compression::None);
    let parsed = parse_frame(&packet).unwrap();

    assert_eq!(parsed.header.width, 4);
    assert_eq!(parsed.header.height, 3);
    assert_eq!(parsed.header.stride_bytes, 8);
    assert_eq!(parsed.header.bit_depth, 16);
    assert_eq!(parsed.header.channel_count, 1);
    assert_eq!(parsed.header.pixel_format(), PixelFormat::Gray16);
    assert_eq!(parsed.payload.len(), 24);
    assert_eq!(parsed.header.compressed_byte_count, 24);
}

#[test]
fn test_payload_is_a_view_into_the_buffer() {
    let packet = flat_packet(2, 2, 7);
    let parsed = parse_frame(&packet).unwrap();
    let offset = parsed.payload.as_ptr() as usize - packet.as_ptr() as usize;
    assert_eq!(offset, 36);
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let mut packet = flat_packet(2, 2, 7);
    packet.extend_from_slice(&[1, 2, 3]);
    let parsed = parse_frame(&packet).unwrap();
    assert_eq!(parsed.payload.len(), 8);
}

// ---------------------------------------------------------------------------
// Bounds enforcement
// ---------------------------------------------------------------------------

#[test]
fn test_every_truncation_is_malformed() {
    let packet = flat_packet(3, 2, 1000);
    for len in 0..packet.len() {
        let result = parse_frame(&packet[..len]);
        assert!(
            matches!(result, Err(ViewerError::MalformedFrame(_))),
            "length {len} should be rejected"
        );
    }
    assert!(parse_frame(&packet).is_ok());
}

#[test]
fn test_bad_magic_is_malformed() {
    let mut packet = flat_packet(2, 2, 0);
    packet[0] = b'X';
    assert!(matches!(parse_frame(&packet), Err(ViewerError::MalformedFrame(_))));
}

#[test]
fn test_stride_smaller_than_row_is_malformed() {
    let layout = FrameLayout {
        stride_bytes: 6,
        ..FrameLayout::dense(4, 1, 16)
    };
    let packet = encode_frame(&layout, &[0u8; 8]).unwrap();
    assert!(matches!(parse_frame(&packet), Err(ViewerError::MalformedFrame(_))));
}

#[test]
fn test_zero_dimensions_are_malformed() {
    let packet = encode_frame(&FrameLayout::dense(0, 4, 16), &[]).unwrap();
    assert!(matches!(parse_frame(&packet), Err(ViewerError::MalformedFrame(_))));
}

#[test]
fn test_multi_channel_is_malformed() {
    let mut packet = flat_packet(2, 2, 0);
    packet[22] = 3;
    assert!(matches!(parse_frame(&packet), Err(ViewerError::MalformedFrame(_))));
}

// ---------------------------------------------------------------------------
// Out-of-band metadata
// ---------------------------------------------------------------------------

#[test]
fn test_metadata_length_overrides_header() {
    let mut packet = flat_packet(2, 2, 5);
    // Corrupt the header's own length field; metadata carries the truth.
    packet[32..36].copy_from_slice(&999u32.to_le_bytes());
    assert!(parse_frame(&packet).is_err());

    let meta = FrameMetadata {
        compressed_byte_count: 8,
    };
    let parsed = parse_frame_with_metadata(&packet, &meta).unwrap();
    assert_eq!(parsed.payload.len(), 8);
    assert_eq!(parsed.header.compressed_byte_count, 8);
}

#[test]
fn test_metadata_longer_than_buffer_is_malformed() {
    let packet = flat_packet(2, 2, 5);
    let meta = FrameMetadata {
        compressed_byte_count: 64,
    };
    assert!(matches!(
        parse_packet(&packet, Some(&meta)),
        Err(ViewerError::MalformedFrame(_))
    ));
}
