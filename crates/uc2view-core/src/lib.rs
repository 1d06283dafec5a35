pub mod capabilities;
pub mod codec;
pub mod consts;
pub mod error;
pub mod frame;
pub mod histogram;
pub mod io;
pub mod pipeline;
pub mod render;
pub mod schedule;
pub mod stride;
pub mod telemetry;
pub mod view;
