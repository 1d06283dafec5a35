use uc2view_core::pipeline::ViewerConfig;

use crate::app::ViewerApp;
use crate::messages::{AppEvent, SourceCommand};

pub fn show(ctx: &egui::Context, app: &mut ViewerApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
                if ui.add(egui::Button::new("Open Capture...").shortcut_text(ctx.format_shortcut(&open_shortcut))).clicked() {
                    ui.close();
                    open_capture(app);
                }

                if ui.button("Stop Stream").clicked() {
                    ui.close();
                    app.send_command(SourceCommand::Stop);
                }

                ui.separator();

                if ui.button("Import Config...").clicked() {
                    ui.close();
                    import_config(app);
                }

                if ui.button("Export Config...").clicked() {
                    ui.close();
                    export_config(app);
                }

                ui.separator();

                let quit_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&quit_shortcut))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Reset View").clicked() {
                    ui.close();
                    app.pipeline.reset_view(&mut app.state);
                }
                if ui.button("Reset Defaults").clicked() {
                    ui.close();
                    app.apply_config(ViewerConfig::default());
                    app.state.add_log("Config reset to defaults".into());
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
            open_capture(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q))) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

pub(crate) fn open_capture(app: &mut ViewerApp) {
    let cmd_tx = app.cmd_tx.clone();
    let fps = app.source.fps;
    let looped = app.source.looped;
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Captures", &["uc2cap"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let _ = cmd_tx.send(SourceCommand::OpenCapture { path, fps, looped });
        }
    });
}

fn import_config(app: &mut ViewerApp) {
    let event_tx = app.event_tx.clone();
    std::thread::spawn(move || {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .pick_file()
        else {
            return;
        };
        let event = match ViewerConfig::load(&path) {
            Ok(config) => AppEvent::ConfigImported {
                path,
                config: Box::new(config),
            },
            Err(e) => AppEvent::Error {
                message: format!("Failed to load config: {e}"),
            },
        };
        let _ = event_tx.send(event);
    });
}

fn export_config(app: &mut ViewerApp) {
    let config = app.current_config();
    let event_tx = app.event_tx.clone();

    std::thread::spawn(move || {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("uc2view.toml")
            .save_file()
        else {
            return;
        };
        let result = config
            .to_toml_string()
            .map_err(anyhow::Error::from)
            .and_then(|s| std::fs::write(&path, s).map_err(anyhow::Error::from));
        let event = match result {
            Ok(()) => AppEvent::Log {
                message: format!("Config saved to {}", path.display()),
            },
            Err(e) => AppEvent::Error {
                message: format!("Failed to save config: {e}"),
            },
        };
        let _ = event_tx.send(event);
    });
}
