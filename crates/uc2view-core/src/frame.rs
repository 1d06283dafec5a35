use std::sync::Arc;

use ndarray::ArrayView2;

use crate::error::{Result, ViewerError};

/// Decoded fixed-size packet header describing one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub width: u32,
    pub height: u32,
    pub stride_bytes: u32,
    pub bit_depth: u16,
    pub channel_count: u16,
    pub pixel_format_code: u16,
    pub timestamp: u64,
    pub compressed_byte_count: u32,
}

impl FrameHeader {
    /// Bytes per sample (1 for <= 8 bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        bytes_per_sample(self.bit_depth)
    }

    /// Bytes of real pixel data in one row, excluding padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_sample()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::from_code(self.pixel_format_code)
    }
}

pub fn bytes_per_sample(bit_depth: u16) -> usize {
    if bit_depth <= 8 { 1 } else { 2 }
}

/// Pixel format codes carried in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Gray16,
    Other(u16),
}

impl PixelFormat {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => PixelFormat::Gray8,
            1 => PixelFormat::Gray16,
            other => PixelFormat::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            PixelFormat::Gray8 => 0,
            PixelFormat::Gray16 => 1,
            PixelFormat::Other(code) => code,
        }
    }
}

/// Dense row-major 16-bit frame, exactly `width * height` samples.
///
/// Samples are shared behind an `Arc` so deferred work (histograms) can hold
/// on to a frame after the pipeline has moved on to the next one.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Arc<[u16]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, samples: Vec<u16>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(ViewerError::SizeMismatch {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples: samples.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// 2-D view, shape = (height, width).
    pub fn view(&self) -> ArrayView2<'_, u16> {
        ArrayView2::from_shape((self.height as usize, self.width as usize), &self.samples)
            .expect("PixelBuffer length is checked at construction")
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Minimum and maximum sample, or `None` for an empty buffer.
    pub fn min_max(&self) -> Option<(u16, u16)> {
        let first = *self.samples.first()?;
        Some(
            self.samples
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

/// Out-of-band description delivered next to a packet by the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameMetadata {
    pub compressed_byte_count: u32,
}

/// One frame-delivery notification from the transport.
#[derive(Clone, Debug)]
pub struct FrameEvent {
    pub buffer: Vec<u8>,
    pub metadata: Option<FrameMetadata>,
}

impl FrameEvent {
    pub fn new(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            metadata: None,
        }
    }

    pub fn with_metadata(buffer: Vec<u8>, metadata: FrameMetadata) -> Self {
        Self {
            buffer,
            metadata: Some(metadata),
        }
    }
}
