use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use uc2view_core::codec::Compression;
use uc2view_core::io::capture::CaptureReader;
use uc2view_core::io::wire::parse_frame;

#[derive(Args)]
pub struct InfoArgs {
    /// Input capture file
    pub file: PathBuf,

    /// Only list the first N packets
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = CaptureReader::open(&args.file)?;

    println!("File:        {}", args.file.display());
    println!("Packets:     {}", reader.packet_count());
    println!(
        "Data size:   {:.1} MB",
        reader.total_bytes() as f64 / (1024.0 * 1024.0)
    );

    if reader.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "  {:>6}  {:>11}  {:>7}  {:>4}  {:>10}  {:>11}  {:<5}  {}",
        "#", "size", "stride", "bits", "payload", "timestamp", "codec", "status"
    );

    let limit = args.limit.unwrap_or(usize::MAX);
    let mut malformed = 0usize;
    for (i, packet) in reader.packets().enumerate() {
        match parse_frame(packet) {
            Ok(frame) => {
                if i >= limit {
                    continue;
                }
                let h = &frame.header;
                let codec = match Compression::Auto.resolve(frame.payload) {
                    Ok(c) => c.to_string(),
                    Err(_) => "?".to_string(),
                };
                println!(
                    "  {:>6}  {:>11}  {:>7}  {:>4}  {:>10}  {:>11}  {:<5}  ok",
                    i,
                    format!("{}x{}", h.width, h.height),
                    h.stride_bytes,
                    h.bit_depth,
                    frame.payload.len(),
                    h.timestamp,
                    codec,
                );
            }
            Err(e) => {
                malformed += 1;
                if i < limit {
                    println!("  {:>6}  {:>11}  {}", i, packet.len(), e);
                }
            }
        }
    }

    if malformed > 0 {
        println!();
        println!("Malformed:   {}", malformed);
    }

    Ok(())
}
