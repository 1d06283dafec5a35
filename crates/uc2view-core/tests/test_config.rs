use uc2view_core::codec::Compression;
use uc2view_core::error::ViewerError;
use uc2view_core::pipeline::ViewerConfig;
use uc2view_core::render::{BackendPreference, WindowLevel};

#[test]
fn test_defaults() {
    let c = ViewerConfig::default();
    assert_eq!(c.ingest.compression, Compression::Auto);
    assert_eq!(c.ingest.histogram_bins, 4096);
    assert_eq!(c.ingest.histogram_stride, 5);
    assert_eq!(c.ingest.telemetry_interval_ms, 1000);
    assert_eq!(c.ingest.redraw_delay_ms, 10);
    assert_eq!(c.view.min_scale, 0.1);
    assert_eq!(c.view.max_scale, 10.0);
    assert_eq!(c.render.backend, BackendPreference::Auto);
    assert!(c.render.gpu_self_test);
    assert_eq!(c.window_level, WindowLevel::new(0.0, 65535.0, 1.0));
}

#[test]
fn test_toml_round_trip() {
    let c = ViewerConfig::default();
    let text = c.to_toml_string().unwrap();
    assert!(text.contains("[ingest]"));
    assert!(text.contains("compression = \"auto\""));
    assert_eq!(ViewerConfig::from_toml_str(&text).unwrap(), c);
}

#[test]
fn test_partial_file_fills_defaults() {
    let c = ViewerConfig::from_toml_str(
        r#"
        [ingest]
        compression = "lz4"
        histogram_stride = 2

        [render]
        backend = "software"

        [window_level]
        max = 4095.0
        "#,
    )
    .unwrap();
    assert_eq!(c.ingest.compression, Compression::Lz4);
    assert_eq!(c.ingest.histogram_stride, 2);
    assert_eq!(c.ingest.histogram_bins, 4096);
    assert_eq!(c.render.backend, BackendPreference::Software);
    assert_eq!(c.window_level.max, 4095.0);
    assert_eq!(c.window_level.gamma, 1.0);
}

#[test]
fn test_invalid_values_are_config_errors() {
    for text in [
        "[view]\nmin_scale = 0.0",
        "[view]\nmin_scale = 5.0\nmax_scale = 1.0",
        "[view]\nzoom_step = 1.5",
        "[ingest]\nhistogram_stride = 0",
        "[ingest]\ncompression = \"zstd\"",
        "not toml at all [",
    ] {
        assert!(
            matches!(ViewerConfig::from_toml_str(text), Err(ViewerError::Config(_))),
            "{text:?} should be rejected"
        );
    }
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("viewer.toml");
    std::fs::write(&path, "[render]\ngpu_self_test = false\n").unwrap();
    let c = ViewerConfig::load(&path).unwrap();
    assert!(!c.render.gpu_self_test);
}
