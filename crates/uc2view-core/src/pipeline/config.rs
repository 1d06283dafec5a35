use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::Compression;
use crate::consts::{
    DEFAULT_HISTOGRAM_BINS, DEFAULT_HISTOGRAM_STRIDE, DEFAULT_IDLE_BUDGET_MS,
    DEFAULT_REDRAW_DELAY_MS, DEFAULT_TELEMETRY_INTERVAL_MS,
};
use crate::error::{Result, ViewerError};
use crate::render::{BackendPreference, WindowLevel};
use crate::view::ViewLimits;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub view: ViewLimits,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub window_level: WindowLevel,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ViewerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ViewerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let v = &self.view;
        if !(v.min_scale > 0.0 && v.max_scale >= v.min_scale) {
            return Err(ViewerError::Config(format!(
                "view scale range [{}, {}] is invalid",
                v.min_scale, v.max_scale
            )));
        }
        if !(v.zoom_step > 0.0 && v.zoom_step < 1.0) {
            return Err(ViewerError::Config(format!(
                "zoom_step {} must be in (0, 1)",
                v.zoom_step
            )));
        }
        if self.ingest.histogram_bins == 0 || self.ingest.histogram_stride == 0 {
            return Err(ViewerError::Config(
                "histogram_bins and histogram_stride must be positive".into(),
            ));
        }
        if self.ingest.telemetry_interval_ms == 0 {
            return Err(ViewerError::Config(
                "telemetry_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub compression: Compression,
    pub histogram_bins: usize,
    /// Only every Nth frame is histogrammed.
    pub histogram_stride: u64,
    pub telemetry_interval_ms: u64,
    pub redraw_delay_ms: u64,
    pub idle_budget_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Auto,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            histogram_stride: DEFAULT_HISTOGRAM_STRIDE,
            telemetry_interval_ms: DEFAULT_TELEMETRY_INTERVAL_MS,
            redraw_delay_ms: DEFAULT_REDRAW_DELAY_MS,
            idle_budget_ms: DEFAULT_IDLE_BUDGET_MS,
        }
    }
}

impl IngestConfig {
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }

    pub fn redraw_delay(&self) -> Duration {
        Duration::from_millis(self.redraw_delay_ms)
    }

    pub fn idle_budget(&self) -> Duration {
        Duration::from_millis(self.idle_budget_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub backend: BackendPreference,
    /// Draw a known pattern once at startup before trusting the GPU path.
    pub gpu_self_test: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            gpu_self_test: true,
        }
    }
}
