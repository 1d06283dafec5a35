use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GAMMA, DISPLAY_MAX, SAMPLE_MAX};

/// Window/level/gamma mapping from raw intensity to display intensity.
///
/// `windowed = clamp((sample - min) / (max - min), 0, 1)`,
/// `display = windowed^(1/gamma)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowLevel {
    pub min: f64,
    pub max: f64,
    pub gamma: f64,
}

impl Default for WindowLevel {
    fn default() -> Self {
        Self::full_range()
    }
}

impl WindowLevel {
    pub fn new(min: f64, max: f64, gamma: f64) -> Self {
        Self { min, max, gamma }
    }

    pub fn full_range() -> Self {
        Self {
            min: 0.0,
            max: SAMPLE_MAX as f64,
            gamma: DEFAULT_GAMMA,
        }
    }

    /// Copy that is safe to evaluate: a degenerate or non-finite window falls
    /// back to the full 16-bit range, a non-positive gamma to 1.0.
    pub fn sanitized(&self) -> Self {
        let window_ok = self.min.is_finite() && self.max.is_finite() && self.max > self.min;
        let (min, max) = if window_ok {
            (self.min, self.max)
        } else {
            (0.0, SAMPLE_MAX as f64)
        };
        let gamma = if self.gamma.is_finite() && self.gamma > 0.0 {
            self.gamma
        } else {
            DEFAULT_GAMMA
        };
        Self { min, max, gamma }
    }

    /// Display intensity in [0, 1]. Call on a sanitized window.
    #[inline]
    pub fn display(&self, sample: u16) -> f64 {
        let windowed = ((sample as f64 - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        windowed.powf(1.0 / self.gamma)
    }

    #[inline]
    pub fn display_u8(&self, sample: u16) -> u8 {
        (self.display(sample) * DISPLAY_MAX as f64).round() as u8
    }

    /// 8-bit display value for every possible 16-bit sample.
    pub fn lookup_table(&self) -> Vec<u8> {
        let w = self.sanitized();
        (0..=SAMPLE_MAX).map(|s| w.display_u8(s)).collect()
    }
}
