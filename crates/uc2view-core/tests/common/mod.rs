#![allow(dead_code)]

use std::time::Duration;

use uc2view_core::codec::{compress, Compression};
use uc2view_core::histogram::HistogramResult;
use uc2view_core::io::wire::{encode_frame, FrameLayout};
use uc2view_core::pipeline::{HudState, ViewerHost};
use uc2view_core::render::WindowLevel;
use uc2view_core::telemetry::TelemetrySample;

/// Lay out 16-bit `samples` (row-major, `width` per row) with `stride`
/// bytes per row, filling padding with 0xEE.
pub fn strided_u16(samples: &[u16], width: usize, stride: usize) -> Vec<u8> {
    let mut raw = Vec::new();
    for row in samples.chunks(width) {
        for s in row {
            raw.extend_from_slice(&s.to_le_bytes());
        }
        raw.resize(raw.len() + (stride - width * 2), 0xEE);
    }
    raw
}

/// Encode a 16-bit frame with the given stride and compression.
pub fn build_packet(
    samples: &[u16],
    width: u32,
    height: u32,
    stride: u32,
    compression: Compression,
) -> Vec<u8> {
    let raw = strided_u16(samples, width as usize, stride as usize);
    let payload = compress(compression, &raw).unwrap();
    let mut layout = FrameLayout::dense(width, height, 16);
    layout.stride_bytes = stride;
    encode_frame(&layout, &payload).unwrap()
}

/// Dense uncompressed 16-bit packet where every sample equals `value`.
pub fn flat_packet(width: u32, height: u32, value: u16) -> Vec<u8> {
    let samples = vec![value; (width * height) as usize];
    build_packet(&samples, width, height, width * 2, Compression::None)
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Host that records every callback.
#[derive(Default)]
pub struct RecordingHost {
    pub window: WindowLevel,
    pub sizes: Vec<(u32, u32)>,
    pub histograms: Vec<HistogramResult>,
    pub telemetry: Vec<TelemetrySample>,
    pub huds: Vec<HudState>,
    pub double_clicks: Vec<(f64, f64, u32, u32)>,
}

impl ViewerHost for RecordingHost {
    fn window_level(&self) -> WindowLevel {
        self.window
    }

    fn on_image_size_changed(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }

    fn on_histogram_computed(&mut self, histogram: HistogramResult) {
        self.histograms.push(histogram);
    }

    fn on_telemetry_updated(&mut self, sample: TelemetrySample) {
        self.telemetry.push(sample);
    }

    fn on_hud_update(&mut self, hud: &HudState) {
        self.huds.push(hud.clone());
    }

    fn on_double_click(&mut self, x: f64, y: f64, image_width: u32, image_height: u32) {
        self.double_clicks.push((x, y, image_width, image_height));
    }
}
