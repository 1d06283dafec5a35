pub mod config;
pub mod decode;
pub mod host;
pub mod ingest;

pub use config::{IngestConfig, RenderConfig, ViewerConfig};
pub use decode::{decode_frame, DecodedFrame};
pub use host::{HudState, StaticHost, ViewerHost};
pub use ingest::FrameIngestPipeline;
