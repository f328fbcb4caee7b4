//! Command-line interface.

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Normal progress output
    Info,
    /// Verbose diagnostics
    Debug,
    /// Everything
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments structure using clap derive macros
#[derive(Parser)]
#[command(name = "lumapath")]
#[command(about = "An offline Monte-Carlo path tracer for XML scene descriptions")]
pub struct Args {
    /// Scene description file (XML)
    #[arg(short = 'i', long, default_value = "demos/scene_layout.xml")]
    pub scene: String,

    /// Output file path (.png or .ppm)
    #[arg(short, long, default_value = "output.png")]
    pub output: String,

    /// Image width in pixels; height follows from the scene's aspect ratio
    #[arg(long, default_value = "400")]
    pub width: u32,

    /// Number of samples per pixel
    #[arg(long, short = 's', default_value = "400")]
    pub samples_per_pixel: u32,

    /// Maximum number of ray bounces
    #[arg(long, default_value = "50")]
    pub max_depth: u32,

    /// Rows per scheduling block
    #[arg(long, default_value = "32")]
    pub block_size: u32,

    /// Number of worker threads (defaults to the hardware parallelism)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Base RNG seed; renders with equal seeds are bit-identical
    #[arg(long)]
    pub seed: Option<u64>,

    /// Set the logging level
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,
}
