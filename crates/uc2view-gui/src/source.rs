//! Transport thread: paces packets from a capture or the synthetic
//! generator and hands them to the UI thread.

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use uc2view_core::frame::FrameEvent;
use uc2view_core::io::capture::CaptureReader;
use uc2view_core::io::synthetic::SyntheticStream;

use crate::messages::{AppEvent, SourceCommand};

const MIN_FPS: f64 = 0.1;

enum Feed {
    Idle,
    Capture {
        reader: CaptureReader,
        next: usize,
        looped: bool,
    },
    Synthetic(SyntheticStream),
}

impl Feed {
    /// Next packet, or `None` when the feed is exhausted.
    fn next_packet(&mut self) -> Option<Result<Vec<u8>, String>> {
        match self {
            Feed::Idle => None,
            Feed::Capture {
                reader,
                next,
                looped,
            } => {
                if *next >= reader.packet_count() {
                    if !*looped || reader.is_empty() {
                        return None;
                    }
                    *next = 0;
                }
                let packet = reader.packet(*next).map(<[u8]>::to_vec);
                *next += 1;
                packet.map(Ok)
            }
            Feed::Synthetic(stream) => Some(stream.next_packet().map_err(|e| e.to_string())),
        }
    }
}

pub fn spawn_source(
    event_tx: mpsc::Sender<AppEvent>,
    ctx: egui::Context,
) -> mpsc::Sender<SourceCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<SourceCommand>();

    std::thread::Builder::new()
        .name("uc2view-source".into())
        .spawn(move || {
            source_loop(cmd_rx, event_tx, ctx);
        })
        .expect("Failed to spawn source thread");

    cmd_tx
}

fn send(tx: &mpsc::Sender<AppEvent>, ctx: &egui::Context, event: AppEvent) {
    let _ = tx.send(event);
    ctx.request_repaint();
}

fn interval_for(fps: f64) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(MIN_FPS))
}

fn source_loop(
    cmd_rx: mpsc::Receiver<SourceCommand>,
    tx: mpsc::Sender<AppEvent>,
    ctx: egui::Context,
) {
    let mut feed = Feed::Idle;
    let mut interval = interval_for(30.0);
    let mut next_at = Instant::now();

    loop {
        let cmd = if matches!(feed, Feed::Idle) {
            match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => return,
            }
        } else {
            let wait = next_at.saturating_duration_since(Instant::now());
            match cmd_rx.recv_timeout(wait) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        };

        if let Some(cmd) = cmd {
            match cmd {
                SourceCommand::OpenCapture { path, fps, looped } => {
                    feed = open_capture(&path, looped, &tx, &ctx);
                    interval = interval_for(fps);
                    next_at = Instant::now();
                }
                SourceCommand::StartSynthetic { config, fps } => {
                    let label = format!(
                        "Synthetic {}x{} {}-bit {}",
                        config.width, config.height, config.bit_depth, config.compression
                    );
                    match SyntheticStream::new(config) {
                        Ok(stream) => {
                            feed = Feed::Synthetic(stream);
                            send(&tx, &ctx, AppEvent::Started { label, frames: None });
                        }
                        Err(e) => {
                            feed = Feed::Idle;
                            send(&tx, &ctx, AppEvent::Error { message: e.to_string() });
                            send(&tx, &ctx, AppEvent::Finished);
                        }
                    }
                    interval = interval_for(fps);
                    next_at = Instant::now();
                }
                SourceCommand::SetFps(fps) => {
                    interval = interval_for(fps);
                    next_at = Instant::now().min(next_at);
                }
                SourceCommand::Stop => {
                    if !matches!(feed, Feed::Idle) {
                        feed = Feed::Idle;
                        send(&tx, &ctx, AppEvent::Finished);
                    }
                }
            }
            continue;
        }

        match feed.next_packet() {
            Some(Ok(packet)) => send(&tx, &ctx, AppEvent::Frame(FrameEvent::new(packet))),
            Some(Err(message)) => {
                feed = Feed::Idle;
                send(&tx, &ctx, AppEvent::Error { message });
                send(&tx, &ctx, AppEvent::Finished);
            }
            None => {
                feed = Feed::Idle;
                send(&tx, &ctx, AppEvent::Finished);
            }
        }

        // Fall behind rather than burst when the UI stalls.
        next_at += interval;
        let now = Instant::now();
        if next_at < now {
            next_at = now;
        }
    }
}

fn open_capture(
    path: &Path,
    looped: bool,
    tx: &mpsc::Sender<AppEvent>,
    ctx: &egui::Context,
) -> Feed {
    match CaptureReader::open(path) {
        Ok(reader) => {
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            send(
                tx,
                ctx,
                AppEvent::Started {
                    label,
                    frames: Some(reader.packet_count()),
                },
            );
            Feed::Capture {
                reader,
                next: 0,
                looped,
            }
        }
        Err(e) => {
            send(
                tx,
                ctx,
                AppEvent::Error {
                    message: format!("{}: {e}", path.display()),
                },
            );
            send(tx, ctx, AppEvent::Finished);
            Feed::Idle
        }
    }
}
