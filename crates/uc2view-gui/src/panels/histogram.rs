use egui_plot::{Bar, BarChart, Plot, VLine};
use uc2view_core::consts::SAMPLE_MAX;
use uc2view_core::histogram::HistogramResult;
use uc2view_core::render::WindowLevel;

use crate::app::ViewerApp;
use crate::panels::section_header;

/// Height of the histogram chart in pixels.
const CHART_HEIGHT: f32 = 120.0;

/// Bars actually drawn; finer histograms are merged down to this.
const DISPLAY_BARS: usize = 256;

pub(crate) fn show(ui: &mut egui::Ui, app: &mut ViewerApp) {
    let status = app
        .state
        .histogram
        .as_ref()
        .map(|h| format!("{} bins", h.bin_count()));
    section_header(ui, "Histogram", status.as_deref());
    ui.add_space(4.0);

    match app.state.histogram {
        Some(ref h) => histogram_chart(ui, h, &app.state.window),
        None => {
            ui.small("Waiting for frames...");
        }
    }
}

/// Log-scaled bar chart of the intensity distribution with the window
/// bounds overlaid.
fn histogram_chart(ui: &mut egui::Ui, histogram: &HistogramResult, window: &WindowLevel) {
    let group = histogram.bin_count().div_ceil(DISPLAY_BARS).max(1);
    let width = SAMPLE_MAX as f64 / histogram.bin_count().max(1) as f64 * group as f64;

    let bar_color = egui::Color32::from_rgb(128, 128, 128);
    let bars: Vec<Bar> = histogram
        .counts
        .chunks(group)
        .zip(histogram.bin_edges.iter().step_by(group))
        .map(|(counts, &edge)| {
            let total: u64 = counts.iter().map(|&c| c as u64).sum();
            Bar::new(edge as f64 + width / 2.0, (1.0 + total as f64).ln())
                .fill(bar_color)
                .width(width)
        })
        .collect();

    let chart = BarChart::new("histogram", bars);
    let window_color = egui::Color32::from_rgb(255, 160, 40);

    Plot::new("intensity_histogram")
        .height(CHART_HEIGHT)
        .include_x(0.0)
        .include_x(SAMPLE_MAX as f64)
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_grid(false)
        .show_y(false)
        .y_axis_label("log count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            plot_ui.vline(VLine::new("min", window.min).color(window_color).width(1.5));
            plot_ui.vline(VLine::new("max", window.max).color(window_color).width(1.5));
        });
}
