mod app;
mod messages;
mod panels;
mod source;
mod state;

use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Optional capture file to start streaming immediately.
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("uc2view"),
        ..Default::default()
    };

    eframe::run_native(
        "uc2view",
        options,
        Box::new(|cc| Ok(Box::new(app::ViewerApp::new(cc, initial)))),
    )
}
