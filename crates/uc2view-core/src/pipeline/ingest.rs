use std::time::{Duration, Instant};

use crate::capabilities::Capabilities;
use crate::error::{Result, ViewerError};
use crate::frame::{FrameEvent, PixelBuffer};
use crate::histogram::{HistogramEngine, HistogramResult};
use crate::io::wire::parse_header;
use crate::render::{
    create_renderer, BackendKind, RenderBackend, SoftwareRenderer, UploadReport,
};
use crate::schedule::{IdleQueue, PooledQueue, RedrawTimer};
use crate::telemetry::{TelemetrySample, TelemetryTracker};
use crate::view::ViewTransformController;

use super::config::{IngestConfig, ViewerConfig};
use super::decode::decode_frame;
use super::host::{HudState, ViewerHost};

/// Drives every frame from raw packet to screen and reports results to a
/// [`ViewerHost`].
///
/// Frames, input and timers are all handled on the caller's thread. Only
/// histogram work leaves it, through the idle queue.
pub struct FrameIngestPipeline {
    config: IngestConfig,
    renderer: Box<dyn RenderBackend>,
    capabilities: Capabilities,
    view: ViewTransformController,
    histogram: HistogramEngine,
    histogram_queue: Box<dyn IdleQueue<HistogramResult>>,
    telemetry: TelemetryTracker,
    redraw: RedrawTimer,
    image_size: Option<(u32, u32)>,
    last_stats: TelemetrySample,
    last_hud: Option<HudState>,
    last_upload: Option<UploadReport>,
    // Re-presented if the renderer is swapped between frames.
    last_frame: Option<PixelBuffer>,
    shut_down: bool,
}

impl FrameIngestPipeline {
    /// Probe capabilities and pick a renderer as configured.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let capabilities = Capabilities::probe();
        let renderer = create_renderer(
            config.render.backend,
            &capabilities,
            config.render.gpu_self_test,
        );
        Self::new(config, renderer, capabilities)
    }

    /// Use an already selected renderer; histograms run on the rayon pool.
    pub fn new(
        config: &ViewerConfig,
        renderer: Box<dyn RenderBackend>,
        capabilities: Capabilities,
    ) -> Self {
        Self::with_queue(
            config,
            renderer,
            capabilities,
            Box::new(PooledQueue::new()),
        )
    }

    pub fn with_queue(
        config: &ViewerConfig,
        renderer: Box<dyn RenderBackend>,
        capabilities: Capabilities,
        histogram_queue: Box<dyn IdleQueue<HistogramResult>>,
    ) -> Self {
        let ingest = config.ingest.clone();
        Self {
            histogram: HistogramEngine::new(ingest.histogram_bins, ingest.histogram_stride),
            telemetry: TelemetryTracker::new(ingest.telemetry_interval()),
            view: ViewTransformController::new(config.view),
            config: ingest,
            renderer,
            capabilities,
            histogram_queue,
            redraw: RedrawTimer::default(),
            image_size: None,
            last_stats: TelemetrySample::default(),
            last_hud: None,
            last_upload: None,
            last_frame: None,
            shut_down: false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn renderer(&self) -> &dyn RenderBackend {
        self.renderer.as_ref()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.renderer.kind()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn view(&self) -> &ViewTransformController {
        &self.view
    }

    pub fn telemetry(&self) -> &TelemetryTracker {
        &self.telemetry
    }

    pub fn last_stats(&self) -> TelemetrySample {
        self.last_stats
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn last_upload(&self) -> Option<UploadReport> {
        self.last_upload
    }

    pub fn pending_histograms(&self) -> usize {
        self.histogram_queue.pending()
    }

    /// When the host should call [`tick`](Self::tick) next, if at all.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.redraw.deadline()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    /// Process one frame event. Failures are logged and the frame is
    /// dropped; returns whether the frame reached the screen.
    pub fn handle_frame(
        &mut self,
        event: &FrameEvent,
        now: Instant,
        host: &mut dyn ViewerHost,
    ) -> bool {
        if self.shut_down {
            return false;
        }
        match self.process_frame(event, now, host) {
            Ok(()) => true,
            Err(e) => {
                match parse_header(&event.buffer) {
                    Ok(h) => tracing::warn!(
                        width = h.width,
                        height = h.height,
                        stride = h.stride_bytes,
                        bit_depth = h.bit_depth,
                        compressed = h.compressed_byte_count,
                        buffer_len = event.buffer.len(),
                        metadata = ?event.metadata,
                        "Dropped frame: {e}"
                    ),
                    Err(_) => tracing::warn!(
                        buffer_len = event.buffer.len(),
                        metadata = ?event.metadata,
                        "Dropped frame: {e}"
                    ),
                }
                self.telemetry.record_dropped(now);
                false
            }
        }
    }

    /// Process one frame event, propagating the first failure. Renderer
    /// state is only touched once the frame has fully decoded.
    pub fn process_frame(
        &mut self,
        event: &FrameEvent,
        now: Instant,
        host: &mut dyn ViewerHost,
    ) -> Result<()> {
        let decoded = decode_frame(
            &event.buffer,
            event.metadata.as_ref(),
            self.config.compression,
        )?;
        tracing::debug!(
            width = decoded.header.width,
            height = decoded.header.height,
            timestamp = decoded.header.timestamp,
            compressed = decoded.compressed_len,
            "Frame decoded"
        );

        let size = (decoded.pixels.width(), decoded.pixels.height());
        let report = self.present(&decoded.pixels, host)?;
        self.last_upload = Some(report);

        if self.image_size != Some(size) {
            self.image_size = Some(size);
            self.view.set_image_size(size.0, size.1);
            host.on_image_size_changed(size.0, size.1);
        }

        // Picks up window/level changes that land between upload and draw.
        self.redraw.arm(now, self.config.redraw_delay());

        self.histogram
            .maybe_compute(&decoded.pixels, self.histogram_queue.as_mut());

        if let Some(sample) =
            self.telemetry
                .record(decoded.compressed_len, decoded.decompressed_len, now)
        {
            self.last_stats = sample;
            host.on_telemetry_updated(sample);
        }

        self.last_frame = Some(decoded.pixels);
        self.emit_hud(host);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Timers and idle work
    // -----------------------------------------------------------------------

    /// Fire the follow-up redraw if it is due. Returns `true` if it fired.
    pub fn tick(&mut self, now: Instant, host: &mut dyn ViewerHost) -> bool {
        if self.shut_down || !self.redraw.fire_if_due(now) {
            return false;
        }
        self.redraw_now(host);
        true
    }

    /// Collect finished histograms. Only the newest one is reported.
    pub fn run_idle(&mut self, budget: Duration, host: &mut dyn ViewerHost) -> usize {
        if self.shut_down {
            return 0;
        }
        let results = self.histogram_queue.drain(budget);
        let n = results.len();
        if let Some(latest) = results.into_iter().last() {
            host.on_histogram_computed(latest);
        }
        n
    }

    /// Idle work with the configured budget.
    pub fn run_idle_default(&mut self, host: &mut dyn ViewerHost) -> usize {
        let budget = self.config.idle_budget();
        self.run_idle(budget, host)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// `logical` is the element size in pointer units, `physical` the
    /// output size in device pixels.
    pub fn set_viewport(
        &mut self,
        logical: (f64, f64),
        physical: (u32, u32),
        host: &mut dyn ViewerHost,
    ) {
        let changed = self.view.element_size() != logical;
        self.view.set_element_size(logical.0, logical.1);
        self.renderer.set_viewport(physical.0, physical.1);
        if changed {
            self.redraw_now(host);
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.view.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, host: &mut dyn ViewerHost) -> bool {
        let changed = self.view.pointer_move(x, y);
        if changed {
            self.after_view_change(host);
        }
        changed
    }

    pub fn pointer_up(&mut self) {
        self.view.pointer_up();
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64, host: &mut dyn ViewerHost) -> bool {
        let changed = self.view.wheel(x, y, delta_y);
        if changed {
            self.after_view_change(host);
        }
        changed
    }

    pub fn reset_view(&mut self, host: &mut dyn ViewerHost) {
        self.view.reset_view();
        self.after_view_change(host);
    }

    /// Report the image position under a double click. Returns the pixel
    /// coordinates, or `None` before the first frame.
    pub fn double_click(&mut self, x: f64, y: f64, host: &mut dyn ViewerHost) -> Option<(f64, f64)> {
        let (w, h) = self.image_size?;
        let (px, py) = self.view.screen_to_image(x, y)?;
        tracing::debug!("Double click at image ({px:.1}, {py:.1})");
        host.on_double_click(px, py, w, h);
        Some((px, py))
    }

    /// Redraw with the host's current window/level and the current view.
    /// A lost GPU switches to software and re-presents the last frame.
    pub fn redraw_now(&mut self, host: &mut dyn ViewerHost) {
        let window = host.window_level();
        let view = self.view.transform();
        match self.renderer.draw(&window, &view) {
            Ok(()) => {}
            Err(e @ ViewerError::RenderBackendUnavailable(_))
                if self.renderer.kind() == BackendKind::Gpu =>
            {
                self.fall_back_to_software(&e);
                if let Some(pixels) = self.last_frame.take() {
                    if let Err(e) = self.try_present(&pixels, &*host) {
                        tracing::warn!("Redraw failed: {e}");
                    }
                    self.last_frame = Some(pixels);
                }
                self.emit_hud(host);
            }
            Err(e) => tracing::warn!("Redraw failed: {e}"),
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Cancel the pending redraw and outstanding histogram work. Later
    /// frames and ticks are ignored.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.redraw.cancel();
        self.histogram_queue.cancel_all();
        self.view.pointer_up();
        self.shut_down = true;
        tracing::debug!("Ingest pipeline shut down");
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn present(&mut self, pixels: &PixelBuffer, host: &dyn ViewerHost) -> Result<UploadReport> {
        match self.try_present(pixels, host) {
            Err(e @ ViewerError::RenderBackendUnavailable(_))
                if self.renderer.kind() == BackendKind::Gpu =>
            {
                self.fall_back_to_software(&e);
                self.try_present(pixels, host)
            }
            other => other,
        }
    }

    /// One-way switch for the rest of the session.
    fn fall_back_to_software(&mut self, cause: &ViewerError) {
        tracing::warn!("{cause}; switching to software rendering for this session");
        self.renderer = Box::new(SoftwareRenderer::new());
    }

    fn try_present(&mut self, pixels: &PixelBuffer, host: &dyn ViewerHost) -> Result<UploadReport> {
        self.renderer.configure(pixels.width(), pixels.height())?;
        let report = self.renderer.upload_frame(pixels)?;
        self.renderer
            .draw(&host.window_level(), &self.view.transform())?;
        Ok(report)
    }

    fn after_view_change(&mut self, host: &mut dyn ViewerHost) {
        self.redraw_now(host);
        self.emit_hud(host);
    }

    fn emit_hud(&mut self, host: &mut dyn ViewerHost) {
        let hud = HudState {
            stats: self.last_stats,
            capabilities: self.capabilities.clone(),
            backend: self.renderer.kind(),
            image_size: self.image_size,
            view: self.view.transform(),
        };
        if self.last_hud.as_ref() != Some(&hud) {
            host.on_hud_update(&hud);
            self.last_hud = Some(hud);
        }
    }
}

impl Drop for FrameIngestPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
