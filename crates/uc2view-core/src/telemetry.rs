use std::time::{Duration, Instant};

use serde::Serialize;

use crate::consts::DEFAULT_TELEMETRY_INTERVAL_MS;

/// Streaming rates over one telemetry interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub fps: f64,
    pub bits_per_second: f64,
    /// Compressed bytes over decompressed bytes; 0 when nothing arrived.
    pub compression_ratio: f64,
    /// Frames processed since start.
    pub total_frames: u64,
    /// Frames rejected since start.
    pub dropped_frames: u64,
}

/// Accumulates per-frame byte counts into periodic [`TelemetrySample`]s.
#[derive(Clone, Debug)]
pub struct TelemetryTracker {
    interval: Duration,
    window_start: Option<Instant>,
    frames: u64,
    bytes_received: u64,
    compressed_bytes: u64,
    total_frames: u64,
    dropped_frames: u64,
}

impl TelemetryTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_start: None,
            frames: 0,
            bytes_received: 0,
            compressed_bytes: 0,
            total_frames: 0,
            dropped_frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Account one processed frame. Returns a sample when the interval since
    /// the last emission has elapsed; the window counters then reset.
    pub fn record(
        &mut self,
        compressed_bytes: usize,
        decompressed_bytes: usize,
        now: Instant,
    ) -> Option<TelemetrySample> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        self.total_frames += 1;
        self.bytes_received += decompressed_bytes as u64;
        self.compressed_bytes += compressed_bytes as u64;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }
        let sample = self.sample(elapsed);
        self.frames = 0;
        self.bytes_received = 0;
        self.compressed_bytes = 0;
        self.window_start = Some(now);
        Some(sample)
    }

    /// Count a frame the pipeline rejected.
    pub fn record_dropped(&mut self, now: Instant) {
        self.window_start.get_or_insert(now);
        self.dropped_frames += 1;
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Forget the current window, e.g. after a stream restart.
    pub fn reset_window(&mut self) {
        self.window_start = None;
        self.frames = 0;
        self.bytes_received = 0;
        self.compressed_bytes = 0;
    }

    fn sample(&self, elapsed: Duration) -> TelemetrySample {
        let ms = elapsed.as_secs_f64() * 1000.0;
        let compression_ratio = if self.bytes_received > 0 {
            self.compressed_bytes as f64 / self.bytes_received as f64
        } else {
            0.0
        };
        TelemetrySample {
            fps: self.frames as f64 * 1000.0 / ms,
            bits_per_second: self.bytes_received as f64 * 8.0 * 1000.0 / ms,
            compression_ratio,
            total_frames: self.total_frames,
            dropped_frames: self.dropped_frames,
        }
    }
}

impl Default for TelemetryTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TELEMETRY_INTERVAL_MS))
    }
}
