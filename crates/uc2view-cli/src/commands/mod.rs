pub mod config;
pub mod decode;
pub mod info;
pub mod replay;
pub mod synth;

use clap::ValueEnum;
use uc2view_core::codec::Compression;
use uc2view_core::render::BackendPreference;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompressionArg {
    Auto,
    None,
    Lz4,
}

impl From<CompressionArg> for Compression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Auto => Compression::Auto,
            CompressionArg::None => Compression::None,
            CompressionArg::Lz4 => Compression::Lz4,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendArg {
    Auto,
    Gpu,
    Software,
}

impl From<BackendArg> for BackendPreference {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendPreference::Auto,
            BackendArg::Gpu => BackendPreference::Gpu,
            BackendArg::Software => BackendPreference::Software,
        }
    }
}
