mod common;

use std::io::Write;

use uc2view_core::codec::Compression;
use uc2view_core::error::ViewerError;
use uc2view_core::io::capture::{CaptureReader, CaptureWriter};
use uc2view_core::io::synthetic::{SyntheticConfig, SyntheticStream};
use uc2view_core::io::wire::parse_frame;
use uc2view_core::pipeline::decode_frame;

use common::flat_packet;

#[test]
fn test_write_then_read_packets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.uc2cap");

    let packets = vec![flat_packet(2, 2, 1), flat_packet(3, 1, 2), flat_packet(1, 1, 3)];
    let mut writer = CaptureWriter::create(&path).unwrap();
    for p in &packets {
        writer.write_packet(p).unwrap();
    }
    assert_eq!(writer.packets_written(), 3);
    assert_eq!(writer.finish().unwrap(), 3);

    let reader = CaptureReader::open(&path).unwrap();
    assert_eq!(reader.packet_count(), 3);
    assert!(!reader.is_empty());
    for (i, p) in packets.iter().enumerate() {
        assert_eq!(reader.packet(i).unwrap(), p.as_slice());
    }
    assert!(reader.packet(3).is_none());
    assert_eq!(reader.packets().count(), 3);
    let expected: usize = packets.iter().map(|p| p.len() + 4).sum();
    assert_eq!(reader.total_bytes(), expected);
}

#[test]
fn test_empty_capture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.uc2cap");
    CaptureWriter::create(&path).unwrap().finish().unwrap();
    let reader = CaptureReader::open(&path).unwrap();
    assert!(reader.is_empty());
}

#[test]
fn test_truncated_record_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.uc2cap");
    let packet = flat_packet(4, 4, 9);
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&(packet.len() as u32).to_le_bytes()).unwrap();
        f.write_all(&packet[..packet.len() - 1]).unwrap();
    }
    assert!(matches!(
        CaptureReader::open(&path),
        Err(ViewerError::MalformedFrame(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        CaptureReader::open(&dir.path().join("nope")),
        Err(ViewerError::Io(_))
    ));
}

// ---------------------------------------------------------------------------
// Synthetic source
// ---------------------------------------------------------------------------

#[test]
fn test_synthetic_packets_decode_to_their_samples() {
    for (bit_depth, compression) in [(16, Compression::Lz4), (12, Compression::None), (8, Compression::Lz4)] {
        let stream = SyntheticStream::new(SyntheticConfig {
            width: 33,
            height: 7,
            row_padding: 3,
            bit_depth,
            compression,
            drift: 5,
        })
        .unwrap();
        for index in [0u64, 1, 9] {
            let packet = stream.packet(index).unwrap();
            let header = parse_frame(&packet).unwrap().header;
            assert_eq!(header.timestamp, index);
            let decoded = decode_frame(&packet, None, Compression::Auto).unwrap();
            assert_eq!(decoded.pixels.samples(), stream.samples(index).as_slice());
        }
    }
}

#[test]
fn test_synthetic_padding_never_leaks() {
    let stream = SyntheticStream::new(SyntheticConfig {
        width: 8,
        height: 4,
        row_padding: 2,
        bit_depth: 8,
        compression: Compression::None,
        drift: 1,
    })
    .unwrap();
    let decoded = decode_frame(&stream.packet(3).unwrap(), None, Compression::None).unwrap();
    assert_eq!(decoded.pixels.samples(), stream.samples(3).as_slice());
    assert_eq!(decoded.decompressed_len, 4 * (8 + 2));
    assert_eq!(decoded.pixels.len(), 32);
}

#[test]
fn test_synthetic_rejects_bad_config() {
    assert!(SyntheticStream::new(SyntheticConfig {
        width: 0,
        ..Default::default()
    })
    .is_err());
    assert!(SyntheticStream::new(SyntheticConfig {
        bit_depth: 17,
        ..Default::default()
    })
    .is_err());
}
