use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use uc2view_core::capabilities::Capabilities;
use uc2view_core::pipeline::{FrameIngestPipeline, ViewerConfig};
use uc2view_core::render::{create_renderer_on_device, SoftwareRenderer};

use crate::messages::{AppEvent, SourceCommand};
use crate::panels;
use crate::source;
use crate::state::{SourceState, ViewerState, ViewportState};

/// Repaint cadence while histogram work is still in flight.
const HISTOGRAM_POLL: Duration = Duration::from_millis(16);

pub struct ViewerApp {
    pub cmd_tx: mpsc::Sender<SourceCommand>,
    pub event_tx: mpsc::Sender<AppEvent>,
    pub event_rx: mpsc::Receiver<AppEvent>,
    pub pipeline: FrameIngestPipeline,
    pub state: ViewerState,
    pub source: SourceState,
    pub viewport: ViewportState,
    pub config: ViewerConfig,
    pub render_state: Option<egui_wgpu::RenderState>,
    pub show_about: bool,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial: Option<PathBuf>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let cmd_tx = source::spawn_source(event_tx.clone(), cc.egui_ctx.clone());

        let config = ViewerConfig::default();
        let render_state = cc.wgpu_render_state.clone();
        let pipeline = build_pipeline(&config, render_state.as_ref());

        let mut app = Self {
            cmd_tx,
            event_tx,
            event_rx,
            state: ViewerState::new(config.window_level),
            source: SourceState::default(),
            viewport: ViewportState::default(),
            pipeline,
            config,
            render_state,
            show_about: false,
        };
        app.state.add_log(format!(
            "Renderer: {} ({})",
            app.pipeline.backend_kind(),
            app.pipeline.renderer().name()
        ));

        if let Some(path) = initial {
            app.open_capture(path);
        }
        app
    }

    pub fn send_command(&self, cmd: SourceCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn open_capture(&mut self, path: PathBuf) {
        self.source.capture_path = Some(path.clone());
        self.send_command(SourceCommand::OpenCapture {
            path,
            fps: self.source.fps,
            looped: self.source.looped,
        });
    }

    pub fn start_synthetic(&mut self) {
        self.send_command(SourceCommand::StartSynthetic {
            config: self.source.synthetic.clone(),
            fps: self.source.fps,
        });
    }

    /// Redraw the current frame after a window/level change.
    pub fn redraw(&mut self) {
        self.pipeline.redraw_now(&mut self.state);
    }

    /// Replace the config and rebuild the pipeline around it.
    pub fn apply_config(&mut self, config: ViewerConfig) {
        self.pipeline.shutdown();
        self.pipeline = build_pipeline(&config, self.render_state.as_ref());
        self.state.window = config.window_level;
        self.state.histogram = None;
        self.state.image_size = None;
        self.viewport = ViewportState::default();
        self.config = config;
    }

    /// Config reflecting the current window settings, for export.
    pub fn current_config(&self) -> ViewerConfig {
        let mut config = self.config.clone();
        config.window_level = self.state.window;
        config
    }

    /// Drain all pending events from the source thread.
    fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::Frame(frame) => {
                    self.pipeline
                        .handle_frame(&frame, Instant::now(), &mut self.state);
                }
                AppEvent::Started { label, frames } => {
                    self.state.add_log(match frames {
                        Some(n) => format!("Streaming {label} ({n} frames)"),
                        None => format!("Streaming {label}"),
                    });
                    self.source.label = Some(label);
                    self.source.frames = frames;
                    self.source.streaming = true;
                }
                AppEvent::Finished => {
                    self.source.streaming = false;
                    self.state.add_log("Stream ended".into());
                }
                AppEvent::ConfigImported { path, config } => {
                    self.apply_config(*config);
                    self.state
                        .add_log(format!("Config loaded from {}", path.display()));
                }
                AppEvent::Error { message } => {
                    self.state.add_log(format!("ERROR: {message}"));
                }
                AppEvent::Log { message } => {
                    self.state.add_log(message);
                }
            }
        }
    }
}

/// Share eframe's wgpu device when there is one, otherwise render in
/// software.
fn build_pipeline(
    config: &ViewerConfig,
    render_state: Option<&egui_wgpu::RenderState>,
) -> FrameIngestPipeline {
    match render_state {
        Some(rs) => {
            let capabilities = Capabilities::from_adapter(&rs.adapter);
            let renderer = create_renderer_on_device(
                config.render.backend,
                &capabilities,
                config.render.gpu_self_test,
                rs.device.clone(),
                rs.queue.clone(),
                rs.adapter.get_info().name,
            );
            FrameIngestPipeline::new(config, renderer, capabilities)
        }
        None => FrameIngestPipeline::new(
            config,
            Box::new(SoftwareRenderer::new()),
            Capabilities::software_only(),
        ),
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        let now = Instant::now();
        self.pipeline.tick(now, &mut self.state);
        self.pipeline.run_idle_default(&mut self.state);

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::viewport::show(ctx, self);

        if let Some(deadline) = self.pipeline.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
        if self.pipeline.pending_histograms() > 0 {
            ctx.request_repaint_after(HISTOGRAM_POLL);
        }

        if self.show_about {
            egui::Window::new("About uc2view")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("uc2view");
                        ui.label("Live 16-bit Stream Viewer");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}
