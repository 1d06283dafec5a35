use serde::Serialize;

use crate::capabilities::Capabilities;
use crate::histogram::HistogramResult;
use crate::render::{BackendKind, WindowLevel};
use crate::telemetry::TelemetrySample;
use crate::view::ViewTransform;

/// Everything the heads-up display shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HudState {
    pub stats: TelemetrySample,
    pub capabilities: Capabilities,
    pub backend: BackendKind,
    pub image_size: Option<(u32, u32)>,
    pub view: ViewTransform,
}

/// The application side of the pipeline: owns window/level and receives
/// every result the pipeline produces.
pub trait ViewerHost {
    /// Read once per draw.
    fn window_level(&self) -> WindowLevel;

    fn on_image_size_changed(&mut self, _width: u32, _height: u32) {}

    fn on_histogram_computed(&mut self, _histogram: HistogramResult) {}

    fn on_telemetry_updated(&mut self, _sample: TelemetrySample) {}

    /// Only called when some field differs from the previous notification.
    fn on_hud_update(&mut self, _hud: &HudState) {}

    /// Image-space position of a double click, in pixels.
    fn on_double_click(&mut self, _x: f64, _y: f64, _image_width: u32, _image_height: u32) {}
}

/// Host with a fixed window and no listeners.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticHost {
    pub window: WindowLevel,
}

impl ViewerHost for StaticHost {
    fn window_level(&self) -> WindowLevel {
        self.window
    }
}
