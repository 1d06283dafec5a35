use approx::assert_abs_diff_eq;

use uc2view_core::view::{ViewLimits, ViewTransform, ViewTransformController};

fn controller(width: f64, height: f64, image: (u32, u32)) -> ViewTransformController {
    let mut c = ViewTransformController::default();
    c.set_element_size(width, height);
    c.set_image_size(image.0, image.1);
    c
}

#[test]
fn test_identity_maps_corners_to_corners() {
    let c = controller(800.0, 600.0, (1024, 768));
    let (x, y) = c.screen_to_image(0.0, 0.0).unwrap();
    assert_abs_diff_eq!(x, 0.0);
    assert_abs_diff_eq!(y, 0.0);
    let (x, y) = c.screen_to_image(800.0, 600.0).unwrap();
    assert_abs_diff_eq!(x, 1024.0);
    assert_abs_diff_eq!(y, 768.0);
    let (x, y) = c.screen_to_image(400.0, 300.0).unwrap();
    assert_abs_diff_eq!(x, 512.0);
    assert_abs_diff_eq!(y, 384.0);
}

#[test]
fn test_inverse_consistency_across_transforms() {
    let limits = ViewLimits::default();
    for &scale in &[0.1, 0.37, 1.0, 2.5, 10.0] {
        for &(tx, ty) in &[(0.0, 0.0), (0.4, -0.9), (-3.0, 2.0)] {
            let t = ViewTransform {
                scale,
                translate_x: tx,
                translate_y: ty,
            };
            for &(px, py) in &[(0.0, 0.0), (13.5, 700.25), (1023.0, 1.0)] {
                let (dx, dy) = t.image_to_device(px, py);
                let (bx, by) = t.device_to_image(dx, dy);
                assert_abs_diff_eq!(bx, px, epsilon = 1e-9);
                assert_abs_diff_eq!(by, py, epsilon = 1e-9);
            }
        }
        assert!(scale >= limits.min_scale && scale <= limits.max_scale);
    }
}

#[test]
fn test_pixel_to_screen_and_back() {
    let mut c = controller(640.0, 480.0, (320, 240));
    c.wheel(100.0, 50.0, -1.0);
    c.wheel(100.0, 50.0, -1.0);
    c.pointer_down(10.0, 10.0);
    c.pointer_move(55.0, -20.0);
    c.pointer_up();

    for &(px, py) in &[(0.0, 0.0), (160.0, 120.0), (319.5, 3.25)] {
        let (sx, sy) = c.image_to_screen(px, py).unwrap();
        let (bx, by) = c.screen_to_image(sx, sy).unwrap();
        assert_abs_diff_eq!(bx, px, epsilon = 1e-9);
        assert_abs_diff_eq!(by, py, epsilon = 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Drag-pan
// ---------------------------------------------------------------------------

#[test]
fn test_drag_translates_by_normalized_delta() {
    let mut c = controller(200.0, 100.0, (10, 10));
    c.pointer_down(50.0, 50.0);
    assert!(c.is_panning());
    assert!(c.pointer_move(100.0, 75.0));
    let t = c.transform();
    // 50 px of 200 -> 0.5 device units; 25 px down of 100 -> -0.5.
    assert_abs_diff_eq!(t.translate_x, 0.5);
    assert_abs_diff_eq!(t.translate_y, -0.5);
    c.pointer_up();
    assert!(!c.is_panning());
    assert!(!c.pointer_move(0.0, 0.0));
    assert_eq!(c.transform(), t);
}

#[test]
fn test_drag_is_divided_by_scale() {
    let mut c = controller(200.0, 200.0, (10, 10));
    for _ in 0..7 {
        c.wheel(100.0, 100.0, -1.0);
    }
    let scale = c.transform().scale;
    let before = c.transform().translate_x;
    c.pointer_down(0.0, 0.0);
    c.pointer_move(100.0, 0.0);
    assert_abs_diff_eq!(c.transform().translate_x - before, 1.0 / scale, epsilon = 1e-12);
}

// ---------------------------------------------------------------------------
// Wheel-zoom
// ---------------------------------------------------------------------------

#[test]
fn test_wheel_zoom_keeps_cursor_point_fixed() {
    let mut c = controller(800.0, 600.0, (1000, 500));
    let cursor = (620.0, 145.0);
    let before = c.screen_to_image(cursor.0, cursor.1).unwrap();
    assert!(c.wheel(cursor.0, cursor.1, -120.0));
    assert_abs_diff_eq!(c.transform().scale, 1.1, epsilon = 1e-12);
    let after = c.screen_to_image(cursor.0, cursor.1).unwrap();
    assert_abs_diff_eq!(after.0, before.0, epsilon = 1e-9);
    assert_abs_diff_eq!(after.1, before.1, epsilon = 1e-9);

    assert!(c.wheel(cursor.0, cursor.1, 120.0));
    assert_abs_diff_eq!(c.transform().scale, 1.1 * 0.9, epsilon = 1e-12);
    let again = c.screen_to_image(cursor.0, cursor.1).unwrap();
    assert_abs_diff_eq!(again.0, before.0, epsilon = 1e-9);
}

#[test]
fn test_wheel_zoom_is_clamped() {
    let mut c = controller(100.0, 100.0, (10, 10));
    for _ in 0..200 {
        c.wheel(30.0, 30.0, -1.0);
    }
    assert_abs_diff_eq!(c.transform().scale, 10.0);
    assert!(!c.wheel(30.0, 30.0, -1.0));

    for _ in 0..400 {
        c.wheel(30.0, 30.0, 1.0);
    }
    assert_abs_diff_eq!(c.transform().scale, 0.1);
}

#[test]
fn test_reset_view_restores_identity() {
    let mut c = controller(100.0, 100.0, (10, 10));
    c.wheel(10.0, 10.0, -1.0);
    c.pointer_down(0.0, 0.0);
    c.pointer_move(30.0, 30.0);
    c.reset_view();
    assert_eq!(c.transform(), ViewTransform::IDENTITY);
    assert!(!c.is_panning());
}

#[test]
fn test_no_mapping_without_frame() {
    let mut c = ViewTransformController::default();
    c.set_element_size(100.0, 100.0);
    assert!(c.screen_to_image(1.0, 1.0).is_none());
}

#[test]
fn test_matrix_is_column_major_affine() {
    let t = ViewTransform {
        scale: 2.0,
        translate_x: 0.25,
        translate_y: -0.5,
    };
    let m = t.matrix();
    let (x, y) = (0.3f32, -0.7f32);
    let px = m[0][0] * x + m[1][0] * y + m[2][0];
    let py = m[0][1] * x + m[1][1] * y + m[2][1];
    let (ex, ey) = t.image_to_device(x as f64, y as f64);
    assert_abs_diff_eq!(px as f64, ex, epsilon = 1e-6);
    assert_abs_diff_eq!(py as f64, ey, epsilon = 1e-6);
}
