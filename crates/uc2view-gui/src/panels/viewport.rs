use uc2view_core::render::Presentation;

use crate::app::ViewerApp;
use crate::state::NativeTexture;

/// What to paint this frame.
enum Shown {
    Nothing,
    /// Image-sized pixels, drawn 1:1 in physical pixels.
    Image { id: egui::TextureId, width: u32, height: u32 },
    /// Viewport-sized target with the view transform already applied.
    Target { id: egui::TextureId },
}

pub fn show(ctx: &egui::Context, app: &mut ViewerApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        paint_background(ui, rect);
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        let ppp = ctx.pixels_per_point();
        let logical = (rect.width() as f64, rect.height() as f64);
        let physical = (
            (rect.width() * ppp).round().max(1.0) as u32,
            (rect.height() * ppp).round().max(1.0) as u32,
        );
        app.pipeline.set_viewport(logical, physical, &mut app.state);

        handle_input(ui, &response, app, rect);

        match sync_texture(ctx, app) {
            Shown::Nothing => show_placeholder(ui, rect),
            Shown::Image { id, width, height } => {
                let size = egui::vec2(width as f32, height as f32) / ppp;
                draw_image(ui, id, egui::Rect::from_center_size(rect.center(), size));
            }
            Shown::Target { id } => draw_image(ui, id, rect),
        }

        draw_hud(ui, rect, app);
    });
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter().rect_filled(rect, 0.0, egui::Color32::BLACK);
}

/// Forward pointer gestures to the pipeline, in points relative to the
/// viewport's top-left corner.
fn handle_input(ui: &egui::Ui, response: &egui::Response, app: &mut ViewerApp, rect: egui::Rect) {
    let local = |p: egui::Pos2| ((p.x - rect.min.x) as f64, (p.y - rect.min.y) as f64);

    if response.drag_started_by(egui::PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            app.pipeline.pointer_down(x, y);
        }
    }
    if response.dragged_by(egui::PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            app.pipeline.pointer_move(x, y, &mut app.state);
        }
    }
    if response.drag_stopped() {
        app.pipeline.pointer_up();
    }

    if response.hovered() {
        // One zoom step per wheel event; egui's sign is the opposite of
        // the pipeline's.
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
                let (x, y) = local(pos);
                app.pipeline.wheel(x, y, -scroll as f64, &mut app.state);
            }
        }
    }

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (x, y) = local(pos);
            app.pipeline.double_click(x, y, &mut app.state);
        }
    }
}

/// Bring the egui-side texture up to date with the renderer's output.
fn sync_texture(ctx: &egui::Context, app: &mut ViewerApp) -> Shown {
    let draws = app.pipeline.renderer().draw_count();
    match app.pipeline.renderer().presentation() {
        Presentation::Empty => Shown::Nothing,
        Presentation::Pixels {
            width,
            height,
            rgba,
        } => {
            let stale = app.viewport.uploaded_draw != draws || app.viewport.texture.is_none();
            if stale {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [width as usize, height as usize],
                    rgba,
                );
                match app.viewport.texture {
                    Some(ref mut texture) => texture.set(image, egui::TextureOptions::NEAREST),
                    None => {
                        app.viewport.texture =
                            Some(ctx.load_texture("viewport", image, egui::TextureOptions::NEAREST));
                    }
                }
                app.viewport.uploaded_draw = draws;
            }
            match app.viewport.texture {
                Some(ref texture) => Shown::Image {
                    id: texture.id(),
                    width,
                    height,
                },
                None => Shown::Nothing,
            }
        }
        Presentation::Texture {
            view, generation, ..
        } => {
            let Some(ref rs) = app.render_state else {
                return Shown::Nothing;
            };
            let mut renderer = rs.renderer.write();
            let id = match app.viewport.native {
                Some(native) if native.generation == generation => native.id,
                Some(native) => {
                    renderer.update_egui_texture_from_wgpu_texture(
                        &rs.device,
                        view,
                        wgpu::FilterMode::Nearest,
                        native.id,
                    );
                    app.viewport.native = Some(NativeTexture {
                        id: native.id,
                        generation,
                    });
                    native.id
                }
                None => {
                    let id = renderer.register_native_texture(
                        &rs.device,
                        view,
                        wgpu::FilterMode::Nearest,
                    );
                    app.viewport.native = Some(NativeTexture { id, generation });
                    id
                }
            };
            Shown::Target { id }
        }
    }
}

fn draw_image(ui: &egui::Ui, texture_id: egui::TextureId, img_rect: egui::Rect) {
    ui.painter().image(
        texture_id,
        img_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

fn draw_hud(ui: &egui::Ui, rect: egui::Rect, app: &ViewerApp) {
    let Some(ref stats) = app.state.stats else {
        return;
    };
    let text = format!(
        "{:.1} fps  {:.1} Mbit/s  {:.2}x  {}",
        stats.fps,
        stats.bits_per_second / 1e6,
        stats.compression_ratio,
        app.pipeline.backend_kind()
    );
    ui.painter().text(
        rect.left_top() + egui::vec2(8.0, 8.0),
        egui::Align2::LEFT_TOP,
        text,
        egui::FontId::monospace(13.0),
        egui::Color32::from_white_alpha(200),
    );
}

fn show_placeholder(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Open a capture or start the synthetic source",
        egui::FontId::proportional(18.0),
        egui::Color32::from_gray(100),
    );
}
