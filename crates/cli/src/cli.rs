//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// rgbd-odom - RGB-D odometry front-end driven by a simulated camera rig
#[derive(Parser, Debug)]
#[command(
    name = "rgbd-odom",
    author,
    version,
    about = "RGB-D odometry front-end",
    long_about = "Synchronizes RGB-D camera streams, assembles composite frames and feeds \n\
                  them to an odometry engine.\n\n\
                  The `run` command drives the node from a simulated rig so a \n\
                  configuration can be exercised without cameras."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RGBD_ODOM_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RGBD_ODOM_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the node against a simulated camera rig
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "odom.toml", env = "RGBD_ODOM_CONFIG")]
    pub config: PathBuf,

    /// Maximum number of frames to dispatch (0 = unlimited)
    #[arg(long, default_value = "0", env = "RGBD_ODOM_MAX_FRAMES")]
    pub max_frames: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "RGBD_ODOM_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Simulated rig frame rate
    #[arg(long, default_value = "30", env = "RGBD_ODOM_RATE_HZ")]
    pub rate_hz: f64,

    /// Simulated image width
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Simulated image height
    #[arg(long, default_value = "480")]
    pub height: u32,

    /// Stamp offset of the second rig relative to the first (milliseconds)
    #[arg(long, default_value = "2.0")]
    pub rig_skew_ms: f64,

    /// Camera frame ids, comma separated (default: leaf frames of the static transforms)
    #[arg(long, value_delimiter = ',')]
    pub camera_frames: Vec<String>,

    /// Channel buffer size between the simulated rig and the node
    #[arg(long, default_value = "64", env = "RGBD_ODOM_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RGBD_ODOM_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "odom.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "odom.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show static transforms
    #[arg(long)]
    pub transforms: bool,

    /// Show odometry parameters as handed to the engine
    #[arg(long)]
    pub params: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
