//! Pan/zoom state and screen <-> image coordinate mapping.
//!
//! Image space is normalized to [-1, 1]² with +Y up; device space is the
//! same range over the viewport. A [`ViewTransform`] maps image to device as
//! `device = scale * image + translate`.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_ZOOM_STEP};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// 3x3 affine matrix in column-major order, ready for a uniform buffer.
    pub fn matrix(&self) -> [[f32; 3]; 3] {
        let s = self.scale as f32;
        [
            [s, 0.0, 0.0],
            [0.0, s, 0.0],
            [self.translate_x as f32, self.translate_y as f32, 1.0],
        ]
    }

    pub fn image_to_device(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }

    pub fn device_to_image(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.translate_x) / self.scale,
            (y - self.translate_y) / self.scale,
        )
    }
}

/// Zoom limits and wheel step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            zoom_step: DEFAULT_ZOOM_STEP,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState {
    Idle,
    Panning { last_x: f64, last_y: f64 },
}

/// Converts pointer and wheel gestures into a [`ViewTransform`].
#[derive(Clone, Debug)]
pub struct ViewTransformController {
    transform: ViewTransform,
    limits: ViewLimits,
    element_width: f64,
    element_height: f64,
    image_size: Option<(u32, u32)>,
    drag: DragState,
}

impl ViewTransformController {
    pub fn new(limits: ViewLimits) -> Self {
        Self {
            transform: ViewTransform::IDENTITY,
            limits,
            element_width: 0.0,
            element_height: 0.0,
            image_size: None,
            drag: DragState::Idle,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn limits(&self) -> ViewLimits {
        self.limits
    }

    /// Size of the on-screen element, in the same units as pointer positions.
    pub fn set_element_size(&mut self, width: f64, height: f64) {
        self.element_width = width;
        self.element_height = height;
    }

    pub fn element_size(&self) -> (f64, f64) {
        (self.element_width, self.element_height)
    }

    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_size = Some((width, height));
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.drag, DragState::Panning { .. })
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.drag = DragState::Panning {
            last_x: x,
            last_y: y,
        };
    }

    /// Returns `true` when the transform changed.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let DragState::Panning { last_x, last_y } = self.drag else {
            return false;
        };
        if !self.has_element() {
            return false;
        }
        let dx = (x - last_x) / self.element_width * 2.0;
        let dy = -(y - last_y) / self.element_height * 2.0;
        self.transform.translate_x += dx / self.transform.scale;
        self.transform.translate_y += dy / self.transform.scale;
        self.drag = DragState::Panning {
            last_x: x,
            last_y: y,
        };
        dx != 0.0 || dy != 0.0
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Zoom by one step per notch, anchored at the cursor. Negative `delta_y`
    /// (wheel away from the user) zooms in. Returns `true` when the
    /// transform changed.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        if delta_y == 0.0 || !self.has_element() {
            return false;
        }
        let factor = if delta_y < 0.0 {
            1.0 + self.limits.zoom_step
        } else {
            1.0 - self.limits.zoom_step
        };
        let old_scale = self.transform.scale;
        let new_scale = (old_scale * factor).clamp(self.limits.min_scale, self.limits.max_scale);
        if new_scale == old_scale {
            return false;
        }
        let effective = new_scale / old_scale;
        let (mx, my) = self.screen_to_device(x, y);
        // Keep the image point under the cursor fixed.
        self.transform.translate_x = mx - (mx - self.transform.translate_x) * effective;
        self.transform.translate_y = my - (my - self.transform.translate_y) * effective;
        self.transform.scale = new_scale;
        true
    }

    pub fn reset_view(&mut self) {
        self.transform = ViewTransform::IDENTITY;
        self.drag = DragState::Idle;
    }

    pub fn screen_to_device(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x / self.element_width * 2.0 - 1.0,
            1.0 - y / self.element_height * 2.0,
        )
    }

    pub fn device_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x + 1.0) / 2.0 * self.element_width,
            (1.0 - y) / 2.0 * self.element_height,
        )
    }

    /// Pixel coordinates in the current frame under a screen position.
    pub fn screen_to_image(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (w, h) = self.image_size?;
        if !self.has_element() {
            return None;
        }
        let (dx, dy) = self.screen_to_device(x, y);
        let (ix, iy) = self.transform.device_to_image(dx, dy);
        Some(((ix + 1.0) / 2.0 * w as f64, (1.0 - iy) / 2.0 * h as f64))
    }

    /// Screen position of a pixel coordinate in the current frame.
    pub fn image_to_screen(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let (w, h) = self.image_size?;
        if !self.has_element() || w == 0 || h == 0 {
            return None;
        }
        let ix = px / w as f64 * 2.0 - 1.0;
        let iy = 1.0 - py / h as f64 * 2.0;
        let (dx, dy) = self.transform.image_to_device(ix, iy);
        Some(self.device_to_screen(dx, dy))
    }

    fn has_element(&self) -> bool {
        self.element_width > 0.0 && self.element_height > 0.0
    }
}

impl Default for ViewTransformController {
    fn default() -> Self {
        Self::new(ViewLimits::default())
    }
}
