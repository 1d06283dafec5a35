use rayon::prelude::*;

use crate::consts::{DEFAULT_HISTOGRAM_BINS, DEFAULT_HISTOGRAM_STRIDE, PARALLEL_PIXEL_THRESHOLD, SAMPLE_MAX};
use crate::frame::PixelBuffer;
use crate::render::WindowLevel;
use crate::schedule::IdleQueue;

/// Coarse intensity histogram over the full 16-bit range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistogramResult {
    /// Lower edge of each bin, `round(i * bin_width)`.
    pub bin_edges: Vec<u32>,
    pub counts: Vec<u32>,
}

impl HistogramResult {
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Lower bin edge below which `fraction` (0..=1) of the samples fall.
    pub fn percentile(&self, fraction: f64) -> Option<u32> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let target = (total as f64 * fraction.clamp(0.0, 1.0)).ceil().max(1.0) as u64;
        let mut seen = 0u64;
        for (edge, &count) in self.bin_edges.iter().zip(&self.counts) {
            seen += count as u64;
            if seen >= target {
                return Some(*edge);
            }
        }
        self.bin_edges.last().copied()
    }

    /// Window spanning the `low`..`high` percentiles, keeping `gamma`.
    ///
    /// The upper bound is the end of its bin, so a single-valued image still
    /// gets a non-degenerate window.
    pub fn percentile_window(&self, low: f64, high: f64, gamma: f64) -> Option<WindowLevel> {
        let lo = self.percentile(low)?;
        let hi_edge = self.percentile(high)?;
        let bin_width = SAMPLE_MAX as f64 / self.bin_count() as f64;
        let hi = (hi_edge as f64 + bin_width).min(SAMPLE_MAX as f64);
        Some(WindowLevel::new(lo as f64, hi.max(lo as f64 + 1.0), gamma))
    }
}

/// Bin every sample of `samples` into `bins` equal-width bins over 0..=65535.
pub fn compute_histogram(samples: &[u16], bins: usize) -> HistogramResult {
    let bins = bins.max(1);
    let bin_width = SAMPLE_MAX as f64 / bins as f64;
    let bin_edges = (0..bins).map(|i| (i as f64 * bin_width).round() as u32).collect();
    let index = |s: u16| ((s as f64 / bin_width).floor() as usize).min(bins - 1);

    let counts = if samples.len() >= PARALLEL_PIXEL_THRESHOLD {
        samples
            .par_chunks(PARALLEL_PIXEL_THRESHOLD / 4)
            .fold(
                || vec![0u32; bins],
                |mut acc, chunk| {
                    for &s in chunk {
                        acc[index(s)] += 1;
                    }
                    acc
                },
            )
            .reduce(
                || vec![0u32; bins],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b) {
                        *x += y;
                    }
                    a
                },
            )
    } else {
        let mut acc = vec![0u32; bins];
        for &s in samples {
            acc[index(s)] += 1;
        }
        acc
    };

    HistogramResult { bin_edges, counts }
}

/// Throttles histogram work to every `stride`-th frame and defers it to idle.
#[derive(Clone, Debug)]
pub struct HistogramEngine {
    frame_counter: u64,
    stride: u64,
    bins: usize,
}

impl HistogramEngine {
    pub fn new(bins: usize, stride: u64) -> Self {
        Self {
            frame_counter: 0,
            stride: stride.max(1),
            bins: bins.max(1),
        }
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Count a frame and, on every `stride`-th one, post a histogram task.
    /// Returns `true` when a task was posted.
    pub fn maybe_compute(
        &mut self,
        pixels: &PixelBuffer,
        queue: &mut dyn IdleQueue<HistogramResult>,
    ) -> bool {
        self.frame_counter += 1;
        if self.frame_counter % self.stride != 0 {
            return false;
        }
        let pixels = pixels.clone();
        let bins = self.bins;
        queue.post(Box::new(move || compute_histogram(pixels.samples(), bins)));
        true
    }
}

impl Default for HistogramEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HISTOGRAM_BINS, DEFAULT_HISTOGRAM_STRIDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_land_in_first_and_last_bins() {
        let h = compute_histogram(&[0, 65535], 4096);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[4095], 1);
        assert_eq!(h.bin_edges[0], 0);
        assert_eq!(h.bin_edges[1], 16);
    }

    #[test]
    fn percentile_window_of_flat_image_is_not_degenerate() {
        let h = compute_histogram(&[1000; 64], 4096);
        let w = h.percentile_window(0.01, 0.99, 1.0).unwrap();
        assert!(w.max > w.min);
        assert!(w.min <= 1000.0 && w.max >= 1000.0);
    }
}
