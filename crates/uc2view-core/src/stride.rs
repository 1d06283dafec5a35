use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{Result, ViewerError};
use crate::frame::{bytes_per_sample, PixelBuffer};

/// Reassemble a possibly padded scanline buffer into a dense `PixelBuffer`.
///
/// Row `y` starts at byte `y * stride_bytes`; only the first `width` samples
/// of each row are kept. Samples are little-endian 16-bit for bit depths
/// above 8, otherwise single bytes widened to 16 bits. The buffer must span
/// `stride_bytes * height` bytes, trailing padding of the last row included.
pub fn normalize_stride(
    raw: &[u8],
    width: u32,
    height: u32,
    stride_bytes: u32,
    bit_depth: u16,
) -> Result<PixelBuffer> {
    let w = width as usize;
    let h = height as usize;
    let stride = stride_bytes as usize;
    let bps = bytes_per_sample(bit_depth);
    let row_bytes = w * bps;

    if stride < row_bytes {
        return Err(ViewerError::MalformedFrame(format!(
            "stride {stride} is smaller than a {w}-pixel row"
        )));
    }
    let needed = stride.checked_mul(h).ok_or_else(|| {
        ViewerError::MalformedFrame(format!("{h} rows of {stride} bytes overflow the address space"))
    })?;
    if raw.len() < needed {
        return Err(ViewerError::BufferTooSmall {
            needed,
            actual: raw.len(),
            stride,
            height: h,
        });
    }

    let mut samples = vec![0u16; w * h];
    if w == 0 {
        return PixelBuffer::new(width, height, samples);
    }

    if bps == 2 && stride == row_bytes {
        // Already dense: no per-row slicing needed.
        decode_row_u16(&raw[..needed], &mut samples);
        return PixelBuffer::new(width, height, samples);
    }

    let copy_row = |(y, out): (usize, &mut [u16])| {
        let src = &raw[y * stride..y * stride + row_bytes];
        if bps == 2 {
            decode_row_u16(src, out);
        } else {
            for (dst, &b) in out.iter_mut().zip(src) {
                *dst = b as u16;
            }
        }
    };

    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        samples.par_chunks_mut(w).enumerate().for_each(copy_row);
    } else {
        samples.chunks_mut(w).enumerate().for_each(copy_row);
    }

    PixelBuffer::new(width, height, samples)
}

fn decode_row_u16(src: &[u8], out: &mut [u16]) {
    for (dst, pair) in out.iter_mut().zip(src.chunks_exact(2)) {
        *dst = u16::from_le_bytes([pair[0], pair[1]]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_16bit_is_reinterpreted() {
        let raw: Vec<u8> = [1u16, 2, 3, 4]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let buf = normalize_stride(&raw, 2, 2, 4, 16).unwrap();
        assert_eq!(buf.samples(), &[1, 2, 3, 4]);
    }

    #[test]
    fn eight_bit_rows_are_widened() {
        // 3x2, stride 4 (one padding byte per row)
        let raw = [10u8, 20, 30, 0xFF, 40, 50, 60, 0xFF];
        let buf = normalize_stride(&raw, 3, 2, 4, 8).unwrap();
        assert_eq!(buf.samples(), &[10, 20, 30, 40, 50, 60]);
    }
}
