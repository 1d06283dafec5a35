use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use image::{ImageBuffer, ImageFormat, Luma, RgbaImage};
use uc2view_core::histogram::compute_histogram;
use uc2view_core::io::capture::CaptureReader;
use uc2view_core::pipeline::{decode_frame, ViewerConfig};
use uc2view_core::render::{RenderBackend, SoftwareRenderer, WindowLevel};
use uc2view_core::view::ViewTransform;

use super::CompressionArg;

#[derive(Args)]
pub struct DecodeArgs {
    /// Input capture file
    pub file: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Packet index to decode
    #[arg(short, long, default_value = "0")]
    pub index: usize,

    /// Payload compression
    #[arg(long, value_enum, default_value = "auto")]
    pub compression: CompressionArg,

    /// Config file supplying the default window/level
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Window minimum
    #[arg(long)]
    pub min: Option<f64>,

    /// Window maximum
    #[arg(long)]
    pub max: Option<f64>,

    /// Display gamma
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Set the window from the 0.5/99.5 percentiles of the frame
    #[arg(long, conflicts_with_all = ["min", "max"])]
    pub auto: bool,

    /// Save the 16-bit samples untouched instead of the windowed view
    #[arg(long, conflicts_with_all = ["min", "max", "gamma", "auto"])]
    pub raw: bool,
}

pub fn run(args: &DecodeArgs) -> Result<()> {
    let reader = CaptureReader::open(&args.file)?;
    let Some(packet) = reader.packet(args.index) else {
        bail!(
            "Packet {} out of range ({} packets)",
            args.index,
            reader.packet_count()
        );
    };

    let decoded = decode_frame(packet, None, args.compression.into())
        .with_context(|| format!("Failed to decode packet {}", args.index))?;
    let (width, height) = (decoded.pixels.width(), decoded.pixels.height());

    if args.raw {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(width, height, decoded.pixels.samples().to_vec())
                .context("Sample count does not match frame size")?;
        img.save_with_format(&args.output, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", args.output.display()))?;
        println!(
            "Saved {}x{} 16-bit frame to {}",
            width,
            height,
            args.output.display()
        );
        return Ok(());
    }

    let base = match args.config {
        Some(ref path) => ViewerConfig::load(path)?.window_level,
        None => WindowLevel::default(),
    };
    let window = if args.auto {
        let histogram = compute_histogram(decoded.pixels.samples(), 256);
        histogram
            .percentile_window(0.005, 0.995, args.gamma.unwrap_or(base.gamma))
            .unwrap_or(base)
    } else {
        WindowLevel::new(
            args.min.unwrap_or(base.min),
            args.max.unwrap_or(base.max),
            args.gamma.unwrap_or(base.gamma),
        )
    };

    let mut renderer = SoftwareRenderer::new();
    renderer.configure(width, height)?;
    renderer.upload_frame(&decoded.pixels)?;
    renderer.draw(&window, &ViewTransform::IDENTITY)?;

    let img = RgbaImage::from_raw(width, height, renderer.rgba().to_vec())
        .context("Rendered buffer does not match frame size")?;
    img.save_with_format(&args.output, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Saved {}x{} frame (window {:.0}..{:.0}, gamma {:.2}) to {}",
        width,
        height,
        window.min,
        window.max,
        window.gamma,
        args.output.display()
    );
    Ok(())
}
