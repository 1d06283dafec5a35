use uc2view_core::codec::{compress, decompress, CodecError, Compression};
use uc2view_core::error::ViewerError;

fn ramp(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_lz4_frame_round_trip() {
    let raw = ramp(10_000);
    let packed = compress(Compression::Lz4, &raw).unwrap();
    assert_eq!(&packed[..4], &[0x04, 0x22, 0x4D, 0x18]);
    assert_eq!(decompress(Compression::Lz4, &packed, raw.len()).unwrap(), raw);
}

#[test]
fn test_lz4_ignores_an_absurd_size_hint() {
    let raw = vec![7u8; 64];
    let packed = compress(Compression::Lz4, &raw).unwrap();
    assert_eq!(decompress(Compression::Lz4, &packed, usize::MAX).unwrap(), raw);
}

#[test]
fn test_auto_detects_lz4_and_raw() {
    let raw = ramp(512);
    let packed = compress(Compression::Lz4, &raw).unwrap();
    assert_eq!(decompress(Compression::Auto, &packed, 0).unwrap(), raw);
    assert_eq!(decompress(Compression::Auto, &raw, 0).unwrap(), raw);
}

#[test]
fn test_corrupt_lz4_is_an_error() {
    let raw = ramp(4096);
    let mut packed = compress(Compression::Lz4, &raw).unwrap();
    let cut = packed.len() / 2;
    packed.truncate(cut);
    let err = decompress(Compression::Lz4, &packed, raw.len()).unwrap_err();
    assert!(matches!(
        err,
        ViewerError::Decompression {
            source: CodecError::Corrupt(_),
            ..
        }
    ));
}

#[test]
fn test_legacy_lz4_is_rejected() {
    let payload = [0x02, 0x21, 0x4C, 0x18, 0, 0, 0, 0];
    let err = decompress(Compression::Auto, &payload, 0).unwrap_err();
    assert!(matches!(
        err,
        ViewerError::Decompression {
            source: CodecError::UnsupportedFormat(_),
            ..
        }
    ));
}

#[test]
fn test_algorithm_identifiers() {
    assert_eq!("lz4".parse::<Compression>().unwrap(), Compression::Lz4);
    assert_eq!("LZ4".parse::<Compression>().unwrap(), Compression::Lz4);
    assert_eq!("binary".parse::<Compression>().unwrap(), Compression::None);
    assert_eq!("raw".parse::<Compression>().unwrap(), Compression::None);
    assert_eq!("auto".parse::<Compression>().unwrap(), Compression::Auto);

    let err = "zstd".parse::<Compression>().unwrap_err();
    assert!(matches!(
        err,
        ViewerError::Decompression {
            source: CodecError::UnknownAlgorithm(_),
            ..
        }
    ));
}

#[test]
fn test_none_passes_bytes_through() {
    let raw = ramp(100);
    assert_eq!(decompress(Compression::None, &raw, 100).unwrap(), raw);
    assert_eq!(compress(Compression::None, &raw).unwrap(), raw);
}
