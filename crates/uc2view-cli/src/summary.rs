use std::path::Path;
use std::time::Duration;

use console::Style;
use uc2view_core::histogram::HistogramResult;
use uc2view_core::render::WindowLevel;
use uc2view_core::telemetry::TelemetrySample;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warn: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            warn: Style::new().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub struct ReplaySummary<'a> {
    pub file: &'a Path,
    pub backend: &'a str,
    pub packets: usize,
    pub presented: usize,
    pub dropped: u64,
    pub draws: u64,
    pub image_size: Option<(u32, u32)>,
    pub size_changes: &'a [(u32, u32)],
    pub telemetry: &'a [TelemetrySample],
    pub histograms: usize,
    pub histogram: Option<&'a HistogramResult>,
    pub window: WindowLevel,
    pub elapsed: Duration,
}

pub fn print_replay_summary(r: &ReplaySummary<'_>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("uc2view Replay"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(14)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(r.file.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Backend"),
        s.method.apply_to(r.backend)
    );
    let size = match r.image_size {
        Some((w, h)) => format!("{w}x{h}"),
        None => "-".to_string(),
    };
    println!("  {:<14}{}", s.label.apply_to("Image"), s.value.apply_to(size));
    if r.size_changes.len() > 1 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Resizes"),
            s.warn.apply_to(r.size_changes.len() - 1)
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Frames"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Packets"),
        s.value.apply_to(r.packets)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Presented"),
        s.value.apply_to(r.presented)
    );
    let dropped = if r.dropped > 0 {
        s.warn.apply_to(r.dropped.to_string())
    } else {
        s.value.apply_to(r.dropped.to_string())
    };
    println!("    {:<12}{}", s.label.apply_to("Dropped"), dropped);
    println!(
        "    {:<12}{}",
        s.label.apply_to("Draws"),
        s.value.apply_to(r.draws)
    );
    println!();

    println!("  {}", s.header.apply_to("Telemetry"));
    match r.telemetry.last() {
        Some(last) => {
            let mean_fps =
                r.telemetry.iter().map(|t| t.fps).sum::<f64>() / r.telemetry.len() as f64;
            println!(
                "    {:<12}{}",
                s.label.apply_to("Samples"),
                s.value.apply_to(r.telemetry.len())
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Mean FPS"),
                s.value.apply_to(format!("{mean_fps:.1}"))
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Bandwidth"),
                s.value
                    .apply_to(format!("{:.2} Mbit/s", last.bits_per_second / 1e6))
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Ratio"),
                s.value.apply_to(format!("{:.2}x", last.compression_ratio))
            );
        }
        None => println!(
            "    {}",
            s.label.apply_to("no sample (stream shorter than one interval)")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Histogram"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Computed"),
        s.value.apply_to(r.histograms)
    );
    if let Some(h) = r.histogram {
        let (lo, hi) = (h.percentile(0.005), h.percentile(0.995));
        if let (Some(lo), Some(hi)) = (lo, hi) {
            println!(
                "    {:<12}{}",
                s.label.apply_to("0.5-99.5%"),
                s.value.apply_to(format!("{lo}..{hi}"))
            );
        }
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(format!(
            "{:.0}..{:.0}  gamma {:.2}",
            r.window.min, r.window.max, r.window.gamma
        ))
    );
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Elapsed"),
        s.value.apply_to(format!("{:.2}s", r.elapsed.as_secs_f64()))
    );
    println!();
}
