use approx::assert_abs_diff_eq;

use uc2view_core::render::{RenderBackend, SoftwareRenderer, WindowLevel};
use uc2view_core::frame::PixelBuffer;
use uc2view_core::view::ViewTransform;

#[test]
fn test_display_is_monotonic_over_full_range() {
    for window in [
        WindowLevel::new(0.0, 65535.0, 1.0),
        WindowLevel::new(1000.0, 3000.0, 0.45),
        WindowLevel::new(20000.0, 20001.0, 2.2),
    ] {
        let lut = window.lookup_table();
        assert!(
            lut.windows(2).all(|w| w[0] <= w[1]),
            "{window:?} is not monotonic"
        );
    }
}

#[test]
fn test_window_endpoints_map_to_black_and_white() {
    let w = WindowLevel::new(1000.0, 3000.0, 1.7).sanitized();
    assert_eq!(w.display_u8(1000), 0);
    assert_eq!(w.display_u8(3000), 255);
    assert_eq!(w.display_u8(0), 0);
    assert_eq!(w.display_u8(65535), 255);
    assert_abs_diff_eq!(w.display(2000), 0.5f64.powf(1.0 / 1.7), epsilon = 1e-12);
}

#[test]
fn test_degenerate_window_is_finite() {
    for w in [
        WindowLevel::new(500.0, 500.0, 1.0),
        WindowLevel::new(800.0, 100.0, 1.0),
        WindowLevel::new(f64::NAN, 100.0, 1.0),
        WindowLevel::new(0.0, f64::INFINITY, 1.0),
        WindowLevel::new(0.0, 100.0, 0.0),
        WindowLevel::new(0.0, 100.0, -3.0),
    ] {
        let s = w.sanitized();
        for sample in [0u16, 1, 100, 500, 800, 65535] {
            let d = s.display(sample);
            assert!(d.is_finite() && (0.0..=1.0).contains(&d), "{w:?} -> {d}");
        }
    }
}

#[test]
fn test_degenerate_window_falls_back_to_full_range() {
    let s = WindowLevel::new(7.0, 7.0, 1.0).sanitized();
    assert_eq!(s, WindowLevel::full_range());
}

#[test]
fn test_software_renderer_matches_lookup_table() {
    let samples: Vec<u16> = (0..64).map(|i| i * 1000).collect();
    let frame = PixelBuffer::new(8, 8, samples.clone()).unwrap();
    let window = WindowLevel::new(5000.0, 40000.0, 0.8);
    let lut = window.lookup_table();

    let mut r = SoftwareRenderer::new();
    r.configure(8, 8).unwrap();
    r.upload_frame(&frame).unwrap();
    r.draw(&window, &ViewTransform::IDENTITY).unwrap();

    for (px, &s) in r.rgba().chunks_exact(4).zip(&samples) {
        let d = lut[s as usize];
        assert_eq!(px, &[d, d, d, 255]);
    }
    assert_eq!(r.draw_count(), 1);
}

#[test]
fn test_software_renderer_ignores_excess_samples() {
    let frame = PixelBuffer::new(3, 2, vec![65535; 6]).unwrap();
    let mut r = SoftwareRenderer::new();
    r.configure(2, 2).unwrap();
    let report = r.upload_frame(&frame).unwrap();
    assert!(report.is_mismatch());
    assert!(report.mismatch_error().is_some());
    r.draw(&WindowLevel::default(), &ViewTransform::IDENTITY)
        .unwrap();
    assert_eq!(r.rgba().len(), 16);
    assert!(r.rgba().iter().all(|&b| b == 255));
}
