use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use uc2view_core::capabilities::Capabilities;
use uc2view_core::frame::FrameEvent;
use uc2view_core::histogram::HistogramResult;
use uc2view_core::io::capture::CaptureReader;
use uc2view_core::pipeline::{FrameIngestPipeline, ViewerConfig, ViewerHost};
use uc2view_core::render::{create_renderer, WindowLevel};
use uc2view_core::schedule::DeferredQueue;
use uc2view_core::telemetry::TelemetrySample;

use crate::summary::{print_replay_summary, ReplaySummary};

use super::{BackendArg, CompressionArg};

#[derive(Args)]
pub struct ReplayArgs {
    /// Input capture file
    pub file: PathBuf,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the configured payload compression
    #[arg(long, value_enum)]
    pub compression: Option<CompressionArg>,

    /// Override the configured render backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Simulated arrival rate in frames per second
    #[arg(long, default_value = "30")]
    pub fps: f64,

    /// Track the window to the latest histogram, like the viewer's auto mode
    #[arg(long)]
    pub auto_window: bool,
}

/// Collects what the pipeline reports during a replay.
struct ReplayHost {
    window: WindowLevel,
    auto_window: bool,
    histogram: Option<HistogramResult>,
    histograms: usize,
    telemetry: Vec<TelemetrySample>,
    size_changes: Vec<(u32, u32)>,
}

impl ViewerHost for ReplayHost {
    fn window_level(&self) -> WindowLevel {
        self.window
    }

    fn on_image_size_changed(&mut self, width: u32, height: u32) {
        self.size_changes.push((width, height));
    }

    fn on_histogram_computed(&mut self, histogram: HistogramResult) {
        if self.auto_window {
            if let Some(w) = histogram.percentile_window(0.005, 0.995, self.window.gamma) {
                self.window = w;
            }
        }
        self.histograms += 1;
        self.histogram = Some(histogram);
    }

    fn on_telemetry_updated(&mut self, sample: TelemetrySample) {
        self.telemetry.push(sample);
    }
}

/// Slowest simulated stream rate accepted by `--fps`.
const MIN_FPS: f64 = 0.01;

/// Time between simulated frame arrivals.
fn frame_interval(fps: f64) -> Result<Duration> {
    if !(fps.is_finite() && fps >= MIN_FPS) {
        bail!("--fps must be a number of at least {MIN_FPS}");
    }
    Ok(Duration::from_secs_f64(1.0 / fps))
}

pub fn run(args: &ReplayArgs) -> Result<()> {
    let interval = frame_interval(args.fps)?;


    let mut config = match args.config {
        Some(ref path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(c) = args.compression {
        config.ingest.compression = c.into();
    }
    if let Some(b) = args.backend {
        config.render.backend = b.into();
    }

    let reader = CaptureReader::open(&args.file)?;
    let total = reader.packet_count();

    let capabilities = Capabilities::probe();
    let renderer = create_renderer(
        config.render.backend,
        &capabilities,
        config.render.gpu_self_test,
    );
    let backend_name = renderer.name().to_string();
    // Histograms run inline so a replay is deterministic.
    let mut pipeline = FrameIngestPipeline::with_queue(
        &config,
        renderer,
        capabilities,
        Box::new(DeferredQueue::new()),
    );

    let mut host = ReplayHost {
        window: config.window_level,
        auto_window: args.auto_window,
        histogram: None,
        histograms: 0,
        telemetry: Vec::new(),
        size_changes: Vec::new(),
    };

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Replaying");

    let start = Instant::now();
    let wall = Instant::now();
    let mut presented = 0usize;

    for (i, packet) in reader.packets().enumerate() {
        let now = start + interval.mul_f64(i as f64);
        pipeline.tick(now, &mut host);
        if pipeline.handle_frame(&FrameEvent::new(packet.to_vec()), now, &mut host) {
            presented += 1;
        }
        pipeline.run_idle_default(&mut host);
        pb.inc(1);
    }

    let end = start + interval.mul_f64(total as f64) + config.ingest.redraw_delay();
    pipeline.tick(end, &mut host);
    pipeline.run_idle(Duration::MAX, &mut host);
    pb.finish_and_clear();

    print_replay_summary(&ReplaySummary {
        file: &args.file,
        backend: &backend_name,
        packets: total,
        presented,
        dropped: pipeline.telemetry().dropped_frames(),
        draws: pipeline.renderer().draw_count(),
        image_size: pipeline.image_size(),
        size_changes: &host.size_changes,
        telemetry: &host.telemetry,
        histograms: host.histograms,
        histogram: host.histogram.as_ref(),
        window: host.window,
        elapsed: wall.elapsed(),
    });

    pipeline.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval_rejects_unusable_rates() {
        for fps in [0.0, -1.0, 1e-20, f64::NAN, f64::INFINITY] {
            assert!(frame_interval(fps).is_err(), "{fps} should be rejected");
        }
    }

    #[test]
    fn test_frame_interval_spans_long_replays() {
        let interval = frame_interval(MIN_FPS).unwrap();
        assert!((interval.as_secs_f64() - 100.0).abs() < 1e-9);
        // Frame indices past u32::MAX keep advancing the clock.
        let index = u32::MAX as u64 + 1;
        assert!(interval.mul_f64(index as f64) > interval * u32::MAX);
    }
}
