use std::path::PathBuf;

use uc2view_core::histogram::HistogramResult;
use uc2view_core::io::synthetic::SyntheticConfig;
use uc2view_core::pipeline::{HudState, ViewerHost};
use uc2view_core::render::WindowLevel;
use uc2view_core::telemetry::TelemetrySample;

/// Percentiles the auto window tracks.
pub const AUTO_LOW: f64 = 0.005;
pub const AUTO_HIGH: f64 = 0.995;

const MAX_LOG_LINES: usize = 500;

/// Image position of the last double click.
#[derive(Clone, Copy, Debug)]
pub struct ClickInfo {
    pub x: f64,
    pub y: f64,
    pub image_width: u32,
    pub image_height: u32,
}

/// Application state the ingest pipeline reports into.
pub struct ViewerState {
    pub window: WindowLevel,
    /// Follow the latest histogram instead of the sliders.
    pub auto_window: bool,
    pub histogram: Option<HistogramResult>,
    pub stats: Option<TelemetrySample>,
    pub hud: Option<HudState>,
    pub image_size: Option<(u32, u32)>,
    pub last_click: Option<ClickInfo>,
    pub log_messages: Vec<String>,
}

impl ViewerState {
    pub fn new(window: WindowLevel) -> Self {
        Self {
            window,
            auto_window: false,
            histogram: None,
            stats: None,
            hud: None,
            image_size: None,
            last_click: None,
            log_messages: Vec::new(),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_LINES {
            let excess = self.log_messages.len() - MAX_LOG_LINES;
            self.log_messages.drain(..excess);
        }
    }

    /// Set the window from the current histogram. Returns `false` if there
    /// is none yet.
    pub fn fit_window_to_histogram(&mut self) -> bool {
        let fitted = self
            .histogram
            .as_ref()
            .and_then(|h| h.percentile_window(AUTO_LOW, AUTO_HIGH, self.window.gamma));
        match fitted {
            Some(w) => {
                self.window = w;
                true
            }
            None => false,
        }
    }
}

impl ViewerHost for ViewerState {
    fn window_level(&self) -> WindowLevel {
        self.window
    }

    fn on_image_size_changed(&mut self, width: u32, height: u32) {
        self.image_size = Some((width, height));
        self.add_log(format!("Image size {width}x{height}"));
    }

    fn on_histogram_computed(&mut self, histogram: HistogramResult) {
        self.histogram = Some(histogram);
        if self.auto_window {
            self.fit_window_to_histogram();
        }
    }

    fn on_telemetry_updated(&mut self, sample: TelemetrySample) {
        self.stats = Some(sample);
    }

    fn on_hud_update(&mut self, hud: &HudState) {
        self.hud = Some(hud.clone());
    }

    fn on_double_click(&mut self, x: f64, y: f64, image_width: u32, image_height: u32) {
        self.last_click = Some(ClickInfo {
            x,
            y,
            image_width,
            image_height,
        });
        self.add_log(format!("Clicked pixel ({x:.0}, {y:.0})"));
    }
}

/// Source selection in the controls panel.
pub struct SourceState {
    pub label: Option<String>,
    pub frames: Option<usize>,
    pub streaming: bool,
    pub capture_path: Option<PathBuf>,
    pub fps: f64,
    pub looped: bool,
    pub synthetic: SyntheticConfig,
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            label: None,
            frames: None,
            streaming: false,
            capture_path: None,
            fps: 30.0,
            looped: true,
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Texture registered with egui for the GPU target.
#[derive(Clone, Copy, Debug)]
pub struct NativeTexture {
    pub id: egui::TextureId,
    pub generation: u64,
}

/// What the viewport currently shows.
#[derive(Default)]
pub struct ViewportState {
    /// Software path: image-sized texture, shown 1:1.
    pub texture: Option<egui::TextureHandle>,
    /// GPU path: viewport-sized texture rendered by the pipeline.
    pub native: Option<NativeTexture>,
    /// Draw count the software texture was last uploaded at.
    pub uploaded_draw: u64,
}
