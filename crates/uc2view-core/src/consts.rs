/// Minimum pixel count (h*w) to use Rayon parallelism for per-sample work.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Largest 16-bit sample value.
pub const SAMPLE_MAX: u16 = u16::MAX;

/// Magic bytes opening every stream packet.
pub const FRAME_MAGIC: &[u8; 4] = b"UC2F";

/// Fixed packet header size, including the trailing compressed-length field.
pub const FRAME_HEADER_SIZE: usize = 36;

/// Wire format version written by the encoder.
pub const FRAME_FORMAT_VERSION: u8 = 1;

/// Upper bound on how far one LZ4 payload byte can expand. Caps the
/// pre-allocation taken from untrusted header sizes.
pub const LZ4_MAX_EXPANSION: usize = 255;

/// Number of histogram bins spanning the full 16-bit range.
pub const DEFAULT_HISTOGRAM_BINS: usize = 4096;

/// Only every Nth frame triggers a histogram recomputation.
pub const DEFAULT_HISTOGRAM_STRIDE: u64 = 5;

/// Wall-clock interval between telemetry emissions.
pub const DEFAULT_TELEMETRY_INTERVAL_MS: u64 = 1000;

/// Delay of the follow-up redraw scheduled after each upload.
pub const DEFAULT_REDRAW_DELAY_MS: u64 = 10;

/// Time budget granted to idle work per host tick.
pub const DEFAULT_IDLE_BUDGET_MS: u64 = 4;

/// Zoom limits for the view transform.
pub const DEFAULT_MIN_SCALE: f64 = 0.1;
pub const DEFAULT_MAX_SCALE: f64 = 10.0;

/// Relative zoom change per wheel notch (10%).
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;

/// Default gamma when the requested one is unusable.
pub const DEFAULT_GAMMA: f64 = 1.0;

/// Maximum value of an 8-bit display channel.
pub const DISPLAY_MAX: u8 = u8::MAX;
