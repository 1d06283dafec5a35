mod software;
mod window;
#[cfg(feature = "gpu")]
pub mod gpu;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::{Result, ViewerError};
use crate::frame::PixelBuffer;
use crate::view::ViewTransform;

pub use software::SoftwareRenderer;
pub use window::WindowLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    Gpu,
    Software,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Gpu => write!(f, "GPU"),
            BackendKind::Software => write!(f, "Software"),
        }
    }
}

/// Which backend the host would like; the capability probe has the final say.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    #[default]
    Auto,
    Gpu,
    Software,
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendPreference::Auto => write!(f, "Auto"),
            BackendPreference::Gpu => write!(f, "GPU"),
            BackendPreference::Software => write!(f, "Software"),
        }
    }
}

/// What a backend has to show after its last draw.
pub enum Presentation<'a> {
    /// Nothing uploaded yet.
    Empty,
    /// Image-sized RGBA8 pixels, presented 1:1.
    Pixels {
        width: u32,
        height: u32,
        rgba: &'a [u8],
    },
    /// Viewport-sized GPU texture; `generation` changes whenever the texture
    /// is re-allocated.
    #[cfg(feature = "gpu")]
    Texture {
        view: &'a wgpu::TextureView,
        width: u32,
        height: u32,
        generation: u64,
    },
}

/// Outcome of an upload. A mismatch means the sample count differed from the
/// configured dimensions and the data was truncated or zero-padded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadReport {
    pub width: u32,
    pub height: u32,
    pub expected: usize,
    pub received: usize,
}

impl UploadReport {
    pub fn is_mismatch(&self) -> bool {
        self.expected != self.received
    }

    pub fn mismatch_error(&self) -> Option<ViewerError> {
        self.is_mismatch().then_some(ViewerError::SizeMismatch {
            width: self.width,
            height: self.height,
            expected: self.expected,
            actual: self.received,
        })
    }
}

/// Shared capability of both render paths.
pub trait RenderBackend {
    fn kind(&self) -> BackendKind;

    /// Human-readable backend name (adapter name for the GPU path).
    fn name(&self) -> &str;

    /// Re-allocate backing storage when the image dimensions change.
    fn configure(&mut self, width: u32, height: u32) -> Result<()>;

    fn upload_frame(&mut self, pixels: &PixelBuffer) -> Result<UploadReport>;

    fn draw(&mut self, window: &WindowLevel, view: &ViewTransform) -> Result<()>;

    /// Output size in physical pixels. Backends without a view transform
    /// ignore it.
    fn set_viewport(&mut self, _width: u32, _height: u32) {}

    /// Configured image dimensions, if any.
    fn dimensions(&self) -> Option<(u32, u32)>;

    fn presentation(&self) -> Presentation<'_>;

    /// Number of completed draws since creation.
    fn draw_count(&self) -> u64;
}

/// Fit `samples` to exactly `expected` entries: excess is ignored, a shortfall
/// is zero-filled. Logs when the counts disagree.
pub(crate) fn fit_samples<'a>(
    samples: &'a [u16],
    width: u32,
    height: u32,
) -> (Cow<'a, [u16]>, UploadReport) {
    let expected = width as usize * height as usize;
    let report = UploadReport {
        width,
        height,
        expected,
        received: samples.len(),
    };
    if let Some(err) = report.mismatch_error() {
        tracing::warn!("{err}; truncating/zero-filling upload");
    }
    let fitted = if samples.len() == expected {
        Cow::Borrowed(samples)
    } else if samples.len() > expected {
        Cow::Borrowed(&samples[..expected])
    } else {
        let mut padded = samples.to_vec();
        padded.resize(expected, 0);
        Cow::Owned(padded)
    };
    (fitted, report)
}

/// Pick the render backend once, at startup.
///
/// The GPU path is tried when preferred (or on `Auto`) and the probe reports
/// integer-texture support. A failed creation or self-test is a
/// `RenderBackendUnavailable` and falls back to the software path for the
/// rest of the session.
pub fn create_renderer(
    preference: BackendPreference,
    capabilities: &Capabilities,
    self_test: bool,
) -> Box<dyn RenderBackend> {
    if !wants_gpu(preference, capabilities) {
        tracing::info!("Render backend: software");
        return Box::new(SoftwareRenderer::new());
    }

    #[cfg(feature = "gpu")]
    {
        match gpu::GpuRenderer::new().and_then(|r| checked(r, self_test)) {
            Ok(renderer) => return renderer,
            Err(e) => tracing::warn!("{e}; falling back to software rendering"),
        }
    }
    #[cfg(not(feature = "gpu"))]
    let _ = self_test;

    Box::new(SoftwareRenderer::new())
}

/// Same selection as [`create_renderer`], but the GPU path shares a device
/// owned by the host (e.g. the UI's own wgpu context).
#[cfg(feature = "gpu")]
pub fn create_renderer_on_device(
    preference: BackendPreference,
    capabilities: &Capabilities,
    self_test: bool,
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,
) -> Box<dyn RenderBackend> {
    if !wants_gpu(preference, capabilities) {
        tracing::info!("Render backend: software");
        return Box::new(SoftwareRenderer::new());
    }
    match gpu::GpuRenderer::from_device(device, queue, adapter_name)
        .and_then(|r| checked(r, self_test))
    {
        Ok(renderer) => renderer,
        Err(e) => {
            tracing::warn!("{e}; falling back to software rendering");
            Box::new(SoftwareRenderer::new())
        }
    }
}

#[cfg(feature = "gpu")]
fn checked(mut renderer: gpu::GpuRenderer, self_test: bool) -> Result<Box<dyn RenderBackend>> {
    if self_test {
        renderer.self_test()?;
    }
    tracing::info!("Render backend: GPU ({})", renderer.name());
    Ok(Box::new(renderer))
}

fn wants_gpu(preference: BackendPreference, capabilities: &Capabilities) -> bool {
    match preference {
        BackendPreference::Software => false,
        BackendPreference::Auto | BackendPreference::Gpu => {
            if !capabilities.gpu_integer_texture_supported && preference == BackendPreference::Gpu {
                tracing::warn!("GPU backend requested but integer textures are unsupported");
            }
            capabilities.gpu_integer_texture_supported
        }
    }
}
