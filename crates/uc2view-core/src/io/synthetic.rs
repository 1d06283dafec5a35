//! Deterministic moving-gradient stream for demos and tests.

use crate::codec::{compress, Compression};
use crate::error::{Result, ViewerError};
use crate::frame::bytes_per_sample;
use crate::io::wire::{encode_frame, FrameLayout};

/// Byte written into row padding, so leaked padding is easy to spot.
pub const PADDING_BYTE: u8 = 0xAB;

#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    /// Extra bytes at the end of every row.
    pub row_padding: u32,
    pub bit_depth: u16,
    pub compression: Compression,
    /// Horizontal drift per frame, in pixels.
    pub drift: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            row_padding: 0,
            bit_depth: 16,
            compression: Compression::Lz4,
            drift: 4,
        }
    }
}

/// Yields encoded packets of a diagonal gradient that scrolls to the right.
pub struct SyntheticStream {
    config: SyntheticConfig,
    frame_index: u64,
}

impl SyntheticStream {
    pub fn new(config: SyntheticConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(ViewerError::Config(
                "synthetic frames need a non-zero size".into(),
            ));
        }
        if !(1..=16).contains(&config.bit_depth) {
            return Err(ViewerError::Config(format!(
                "bit depth {} is outside 1..=16",
                config.bit_depth
            )));
        }
        Ok(Self {
            config,
            frame_index: 0,
        })
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Dense samples of frame `index`, row-major.
    pub fn samples(&self, index: u64) -> Vec<u16> {
        let c = &self.config;
        let max = ((1u32 << c.bit_depth) - 1) as f64;
        let (w, h) = (c.width as u64, c.height as u64);
        let shift = index * c.drift as u64;
        let mut out = Vec::with_capacity((w * h) as usize);
        for y in 0..h {
            for x in 0..w {
                let xs = ((x + shift) % w) as f64 / w as f64;
                let ys = y as f64 / h as f64;
                out.push(((xs * 0.75 + ys * 0.25) * max).round() as u16);
            }
        }
        out
    }

    /// Raw (uncompressed) strided bytes of frame `index`.
    pub fn raw_bytes(&self, index: u64) -> Vec<u8> {
        let c = &self.config;
        let bps = bytes_per_sample(c.bit_depth);
        let row_bytes = c.width as usize * bps;
        let stride = row_bytes + c.row_padding as usize;
        let samples = self.samples(index);

        let mut raw = Vec::with_capacity(stride * c.height as usize);
        for row in samples.chunks(c.width as usize) {
            for &s in row {
                if bps == 2 {
                    raw.extend_from_slice(&s.to_le_bytes());
                } else {
                    raw.push(s as u8);
                }
            }
            raw.resize(raw.len() + c.row_padding as usize, PADDING_BYTE);
        }
        raw
    }

    /// Encoded packet for frame `index`.
    pub fn packet(&self, index: u64) -> Result<Vec<u8>> {
        let c = &self.config;
        let mut layout = FrameLayout::dense(c.width, c.height, c.bit_depth);
        layout.stride_bytes += c.row_padding;
        layout.timestamp = index;
        let payload = compress(c.compression, &self.raw_bytes(index))?;
        encode_frame(&layout, &payload)
    }

    /// Encoded packet for the next frame.
    pub fn next_packet(&mut self) -> Result<Vec<u8>> {
        let packet = self.packet(self.frame_index)?;
        self.frame_index += 1;
        Ok(packet)
    }
}
