use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Target: ",
    std::env::consts::ARCH,
    "-",
    std::env::consts::OS
);

/// Dual-camera deployment browser
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Deployment directory to open on startup
    #[arg(value_name = "DIR")]
    pub deployment: Option<PathBuf>,

    /// Slider position to start at (0-based)
    #[arg(long = "frame", value_name = "N")]
    pub start_frame: Option<i64>,

    /// Start playback immediately
    #[arg(short = 'a', long = "autoplay")]
    pub autoplay: bool,

    /// Playback speed in frames per second
    #[arg(long = "fps", value_name = "FPS")]
    pub fps: Option<f32>,

    /// Discard the saved window position and settings
    #[arg(long = "reset-window")]
    pub reset_window: bool,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Enable debug logging to file
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}
