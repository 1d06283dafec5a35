use uc2view_core::codec::Compression;
use uc2view_core::consts::SAMPLE_MAX;

use crate::app::ViewerApp;
use crate::messages::SourceCommand;
use crate::panels::{enum_combo, histogram, menu_bar, section_header};

const LEFT_PANEL_WIDTH: f32 = 280.0;

pub fn show(ctx: &egui::Context, app: &mut ViewerApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                source_section(ui, app);
                ui.separator();
                synthetic_section(ui, app);
                ui.separator();
                display_section(ui, app);
                ui.separator();
                histogram::show(ui, app);
                ui.separator();
                capabilities_section(ui, app);
            });
        });
}

fn source_section(ui: &mut egui::Ui, app: &mut ViewerApp) {
    let status = if app.source.streaming { Some("live") } else { None };
    section_header(ui, "Source", status);
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        if ui.button("Open...").clicked() {
            menu_bar::open_capture(app);
        }
        if ui
            .add_enabled(app.source.streaming, egui::Button::new("Stop"))
            .clicked()
        {
            app.send_command(SourceCommand::Stop);
        }
        let can_restart = !app.source.streaming && app.source.capture_path.is_some();
        if ui
            .add_enabled(can_restart, egui::Button::new("Replay"))
            .clicked()
        {
            if let Some(path) = app.source.capture_path.clone() {
                app.open_capture(path);
            }
        }
    });

    if let Some(ref label) = app.source.label {
        ui.label(label);
    }
    if let Some(n) = app.source.frames {
        ui.small(format!("{n} frames"));
    }

    ui.add_space(4.0);
    let response = ui.add(
        egui::Slider::new(&mut app.source.fps, 1.0..=240.0)
            .text("FPS")
            .logarithmic(true),
    );
    if response.changed() {
        app.send_command(SourceCommand::SetFps(app.source.fps));
    }
    ui.checkbox(&mut app.source.looped, "Loop captures");
}

fn synthetic_section(ui: &mut egui::Ui, app: &mut ViewerApp) {
    section_header(ui, "Synthetic", None);
    ui.add_space(4.0);

    let synth = &mut app.source.synthetic;
    ui.add(egui::Slider::new(&mut synth.width, 1..=4096).text("Width"));
    ui.add(egui::Slider::new(&mut synth.height, 1..=4096).text("Height"));
    ui.add(egui::Slider::new(&mut synth.row_padding, 0..=64).text("Row padding"));
    ui.add(egui::Slider::new(&mut synth.bit_depth, 1..=16).text("Bit depth"));
    ui.add(egui::Slider::new(&mut synth.drift, 0..=32).text("Drift"));
    enum_combo(
        ui,
        "Compression",
        &mut synth.compression,
        &[Compression::None, Compression::Lz4],
    );

    if ui.button("Start Synthetic").clicked() {
        app.start_synthetic();
    }
}

fn display_section(ui: &mut egui::Ui, app: &mut ViewerApp) {
    section_header(ui, "Display", None);
    ui.add_space(4.0);

    let max = SAMPLE_MAX as f64;
    let mut changed = false;
    ui.add_enabled_ui(!app.state.auto_window, |ui| {
        let window = &mut app.state.window;
        changed |= ui
            .add(egui::Slider::new(&mut window.min, 0.0..=max).text("Min"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut window.max, 0.0..=max).text("Max"))
            .changed();
    });
    changed |= ui
        .add(
            egui::Slider::new(&mut app.state.window.gamma, 0.1..=5.0)
                .text("Gamma")
                .logarithmic(true),
        )
        .changed();

    if ui
        .checkbox(&mut app.state.auto_window, "Auto window")
        .changed()
        && app.state.auto_window
    {
        changed |= app.state.fit_window_to_histogram();
    }

    ui.horizontal(|ui| {
        if ui.button("Fit").clicked() {
            changed |= app.state.fit_window_to_histogram();
        }
        if ui.button("Full Range").clicked() {
            app.state.window.min = 0.0;
            app.state.window.max = max;
            changed = true;
        }
        if ui.button("Reset View").clicked() {
            app.pipeline.reset_view(&mut app.state);
        }
    });

    if changed {
        app.redraw();
    }

    if let Some(click) = app.state.last_click {
        ui.add_space(4.0);
        ui.small(format!(
            "Last click: ({:.0}, {:.0}) of {}x{}",
            click.x, click.y, click.image_width, click.image_height
        ));
    }
}

fn capabilities_section(ui: &mut egui::Ui, app: &mut ViewerApp) {
    section_header(ui, "Capabilities", None);
    ui.add_space(4.0);

    let caps = app.pipeline.capabilities();
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    ui.small(format!(
        "16-bit integer textures: {}",
        yes_no(caps.gpu_integer_texture_supported)
    ));
    ui.small(format!("LZ4: {}", yes_no(caps.lz4_available)));
    if let Some(ref name) = caps.adapter_name {
        ui.small(format!("Adapter: {name}"));
    }
    ui.small(format!(
        "Renderer: {} ({})",
        app.pipeline.backend_kind(),
        app.pipeline.renderer().name()
    ));
}
