//! CPU fallback: window/level/gamma through a 64K lookup table into RGBA8.

use rayon::prelude::*;

use super::{fit_samples, BackendKind, Presentation, RenderBackend, UploadReport, WindowLevel};
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::Result;
use crate::frame::PixelBuffer;
use crate::view::ViewTransform;

/// Renders the latest frame into an image-sized RGBA buffer.
///
/// The view transform is not applied; the host presents the buffer 1:1.
pub struct SoftwareRenderer {
    width: u32,
    height: u32,
    samples: Vec<u16>,
    rgba: Vec<u8>,
    lut: Vec<u8>,
    lut_window: Option<WindowLevel>,
    has_frame: bool,
    draws: u64,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            samples: Vec::new(),
            rgba: Vec::new(),
            lut: Vec::new(),
            lut_window: None,
            has_frame: false,
            draws: 0,
        }
    }

    /// Last rendered RGBA8 pixels (empty before the first draw).
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    fn refresh_lut(&mut self, window: &WindowLevel) {
        let w = window.sanitized();
        if self.lut_window != Some(w) {
            self.lut = w.lookup_table();
            self.lut_window = Some(w);
        }
    }
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for SoftwareRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Software
    }

    fn name(&self) -> &str {
        "CPU"
    }

    fn configure(&mut self, width: u32, height: u32) -> Result<()> {
        let n = width as usize * height as usize;
        if (width, height) == (self.width, self.height) && self.samples.len() == n {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.samples = vec![0; n];
        self.rgba = vec![0; n * 4];
        self.has_frame = false;
        tracing::debug!("Software target resized to {width}x{height}");
        Ok(())
    }

    fn upload_frame(&mut self, pixels: &PixelBuffer) -> Result<UploadReport> {
        let (fitted, report) = fit_samples(pixels.samples(), self.width, self.height);
        self.samples.copy_from_slice(&fitted);
        self.has_frame = true;
        Ok(report)
    }

    fn draw(&mut self, window: &WindowLevel, _view: &ViewTransform) -> Result<()> {
        if !self.has_frame {
            return Ok(());
        }
        self.refresh_lut(window);
        let lut = &self.lut;
        let shade = |(px, &s): (&mut [u8], &u16)| {
            let d = lut[s as usize];
            px.copy_from_slice(&[d, d, d, 255]);
        };
        if self.samples.len() >= PARALLEL_PIXEL_THRESHOLD {
            self.rgba
                .par_chunks_exact_mut(4)
                .zip(self.samples.par_iter())
                .for_each(shade);
        } else {
            self.rgba
                .chunks_exact_mut(4)
                .zip(self.samples.iter())
                .for_each(shade);
        }
        self.draws += 1;
        Ok(())
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        (self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }

    fn presentation(&self) -> Presentation<'_> {
        if self.draws == 0 || !self.has_frame {
            return Presentation::Empty;
        }
        Presentation::Pixels {
            width: self.width,
            height: self.height,
            rgba: &self.rgba,
        }
    }

    fn draw_count(&self) -> u64 {
        self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(w: u32, h: u32, samples: Vec<u16>) -> PixelBuffer {
        PixelBuffer::new(w, h, samples).unwrap()
    }

    #[test]
    fn draws_grayscale_opaque() {
        let mut r = SoftwareRenderer::new();
        r.configure(2, 1).unwrap();
        r.upload_frame(&frame(2, 1, vec![0, 65535])).unwrap();
        r.draw(&WindowLevel::default(), &ViewTransform::IDENTITY)
            .unwrap();
        assert_eq!(r.rgba(), &[0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn short_upload_is_zero_filled_and_flagged() {
        let mut r = SoftwareRenderer::new();
        r.configure(2, 2).unwrap();
        let report = r.upload_frame(&frame(3, 1, vec![65535; 3])).unwrap();
        assert!(report.is_mismatch());
        r.draw(&WindowLevel::default(), &ViewTransform::IDENTITY)
            .unwrap();
        assert_eq!(&r.rgba()[12..16], &[0, 0, 0, 255]);
    }

    #[test]
    fn nothing_to_present_before_first_draw() {
        let mut r = SoftwareRenderer::new();
        r.configure(1, 1).unwrap();
        assert!(matches!(r.presentation(), Presentation::Empty));
    }
}
