use crate::app::ViewerApp;

pub fn show(ctx: &egui::Context, app: &mut ViewerApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        // Log area, fixed height for 4 lines, scrollable.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.state.log_messages.is_empty() {
                    // Reserve space for 4 empty lines to prevent layout jump.
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        // Status line
        ui.horizontal(|ui| {
            if let Some((w, h)) = app.state.image_size {
                ui.label(format!("{w}x{h}"));
                ui.separator();
            }
            let view = app.pipeline.view().transform();
            ui.label(format!("Zoom: {:.0}%", view.scale * 100.0));
            ui.separator();

            if let Some(ref stats) = app.state.stats {
                ui.label(format!("{:.1} fps", stats.fps));
                ui.separator();
                ui.label(format!("{:.1} Mbit/s", stats.bits_per_second / 1e6));
                ui.separator();
                ui.label(format!("{:.2}x", stats.compression_ratio));
                ui.separator();
                ui.label(format!(
                    "Frames: {} ({} dropped)",
                    stats.total_frames, stats.dropped_frames
                ));
                ui.separator();
            }

            let backend = app.pipeline.backend_kind();
            match app.state.hud.as_ref().and_then(|h| h.capabilities.adapter_name.as_deref()) {
                Some(adapter) => ui.label(format!("Renderer: {backend} ({adapter})")),
                None => ui.label(format!("Renderer: {backend}")),
            };
        });

        ui.add_space(2.0);
    });
}
