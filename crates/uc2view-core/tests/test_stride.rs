mod common;

use uc2view_core::codec::{decompress, Compression};
use uc2view_core::error::ViewerError;
use uc2view_core::io::wire::parse_frame;
use uc2view_core::pipeline::decode_frame;
use uc2view_core::stride::normalize_stride;

use common::{build_packet, strided_u16};

fn known_value(x: usize, y: usize) -> u16 {
    (y * 1000 + x * 7) as u16
}

#[test]
fn test_padded_rows_round_trip() {
    for &(width, height) in &[(1usize, 1usize), (3, 2), (17, 5), (64, 3)] {
        for extra in [0usize, 1, 2, 6, 31] {
            let stride = width * 2 + extra;
            let samples: Vec<u16> = (0..height)
                .flat_map(|y| (0..width).map(move |x| known_value(x, y)))
                .collect();
            let raw = strided_u16(&samples, width, stride);

            let buf =
                normalize_stride(&raw, width as u32, height as u32, stride as u32, 16).unwrap();
            assert_eq!(buf.len(), width * height);
            for y in 0..height {
                for x in 0..width {
                    assert_eq!(
                        buf.get(x as u32, y as u32),
                        Some(known_value(x, y)),
                        "{width}x{height} stride {stride} at ({x}, {y})"
                    );
                }
            }
        }
    }
}

#[test]
fn test_large_padded_frame_uses_parallel_path() {
    let (width, height) = (300usize, 300usize);
    let stride = width * 2 + 4;
    let samples: Vec<u16> = (0..height)
        .flat_map(|y| (0..width).map(move |x| known_value(x, y)))
        .collect();
    let raw = strided_u16(&samples, width, stride);
    let buf = normalize_stride(&raw, width as u32, height as u32, stride as u32, 16).unwrap();
    assert_eq!(buf.samples(), samples.as_slice());
}

#[test]
fn test_short_buffer_is_buffer_too_small() {
    let raw = vec![0u8; 10 * 2 - 1];
    let err = normalize_stride(&raw, 4, 2, 10, 16).unwrap_err();
    assert!(matches!(
        err,
        ViewerError::BufferTooSmall {
            needed: 20,
            actual: 19,
            ..
        }
    ));
}

#[test]
fn test_view_shape_is_height_by_width() {
    let raw = strided_u16(&[1, 2, 3, 4, 5, 6], 3, 6);
    let buf = normalize_stride(&raw, 3, 2, 6, 16).unwrap();
    let view = buf.view();
    assert_eq!(view.dim(), (2, 3));
    assert_eq!(view[[1, 0]], 4);
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_4x2_lz4_frame_with_one_padding_sample_per_row() {
    let original: Vec<u16> = vec![100, 200, 300, 400, 500, 600, 700, 800];
    let packet = build_packet(&original, 4, 2, 10, Compression::Lz4);

    let parsed = parse_frame(&packet).unwrap();
    assert_eq!(parsed.header.stride_bytes, 10);
    let raw = decompress(Compression::Lz4, parsed.payload, 20).unwrap();
    assert_eq!(raw.len(), 20);
    let buf = normalize_stride(&raw, 4, 2, 10, 16).unwrap();
    assert_eq!(buf.samples(), original.as_slice());

    let decoded = decode_frame(&packet, None, Compression::Auto).unwrap();
    assert_eq!(decoded.pixels.samples(), original.as_slice());
    assert_eq!(decoded.decompressed_len, 20);
}
