use std::path::PathBuf;

use uc2view_core::frame::FrameEvent;
use uc2view_core::io::synthetic::SyntheticConfig;
use uc2view_core::pipeline::ViewerConfig;

/// Commands sent from UI thread to the transport thread.
pub enum SourceCommand {
    /// Replay a recorded capture at `fps`.
    OpenCapture {
        path: PathBuf,
        fps: f64,
        looped: bool,
    },

    /// Generate frames on the fly.
    StartSynthetic { config: SyntheticConfig, fps: f64 },

    /// Change the pacing of the running source.
    SetFps(f64),

    Stop,
}

/// Events delivered to the UI thread.
pub enum AppEvent {
    /// A source started; `frames` is known for captures.
    Started {
        label: String,
        frames: Option<usize>,
    },

    Frame(FrameEvent),

    /// The source ran out of frames or was stopped.
    Finished,

    ConfigImported {
        path: PathBuf,
        config: Box<ViewerConfig>,
    },
    Error {
        message: String,
    },
    Log {
        message: String,
    },
}
