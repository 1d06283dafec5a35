use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use uc2view_core::io::capture::CaptureWriter;
use uc2view_core::io::synthetic::{SyntheticConfig, SyntheticStream};

use super::CompressionArg;

#[derive(Args)]
pub struct SynthArgs {
    /// Output capture file
    pub output: PathBuf,

    /// Number of frames to generate
    #[arg(short = 'n', long, default_value = "100")]
    pub frames: u64,

    #[arg(long, default_value = "512")]
    pub width: u32,

    #[arg(long, default_value = "512")]
    pub height: u32,

    /// Padding bytes after each row
    #[arg(long, default_value = "0")]
    pub padding: u32,

    /// Bits per sample (1-16)
    #[arg(long, default_value = "16")]
    pub bit_depth: u16,

    /// Payload compression
    #[arg(long, value_enum, default_value = "lz4")]
    pub compression: CompressionArg,

    /// Pixels the gradient moves per frame
    #[arg(long, default_value = "4")]
    pub drift: u32,
}

pub fn run(args: &SynthArgs) -> Result<()> {
    let mut stream = SyntheticStream::new(SyntheticConfig {
        width: args.width,
        height: args.height,
        row_padding: args.padding,
        bit_depth: args.bit_depth,
        compression: args.compression.into(),
        drift: args.drift,
    })?;
    let mut writer = CaptureWriter::create(&args.output)?;

    let pb = ProgressBar::new(args.frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Generating");

    for _ in 0..args.frames {
        writer.write_packet(&stream.next_packet()?)?;
        pb.inc(1);
    }
    let written = writer.finish()?;
    pb.finish_and_clear();

    println!(
        "Wrote {} frames ({}x{}, {}-bit, {}) to {}",
        written,
        args.width,
        args.height,
        args.bit_depth,
        stream.config().compression,
        args.output.display()
    );
    Ok(())
}
