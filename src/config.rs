// Runtime configuration - command line flags and tempo limits

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_BPM: f64 = 120.0;
pub const MIN_BPM: f64 = 1.0;
pub const MAX_BPM: f64 = 300.0;

pub const DEFAULT_SONGS_DIR: &str = "songs";
pub const DEFAULT_LAUNCHPAD_PORT: &str = "LPMiniMK3 MIDI";

/// Clamp a requested tempo into the supported range
pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        DEFAULT_BPM
    } else {
        bpm.clamp(MIN_BPM, MAX_BPM)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "grid_looper",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pattern looper driven from a Launchpad Mini MK3"
)]
pub struct Cli {
    #[arg(long, default_value = DEFAULT_SONGS_DIR, help = "Directory of .json/.ron songs")]
    pub songs: PathBuf,

    #[arg(long, default_value_t = 0, help = "Index of the song to load first")]
    pub song: usize,

    #[arg(long, help = "Tempo override, clamped to 1-300")]
    pub bpm: Option<f64>,

    #[arg(long, default_value = DEFAULT_LAUNCHPAD_PORT, help = "Launchpad port name substring")]
    pub launchpad: String,

    #[arg(long, help = "Only use instrument outputs whose name contains this")]
    pub output_filter: Option<String>,

    #[arg(long, help = "List MIDI ports and exit")]
    pub list_ports: bool,

    #[arg(long, help = "Log level (error, warn, info, debug, trace)")]
    pub log_level: Option<log::LevelFilter>,
}

/// Settings the application runs with
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub songs_dir: PathBuf,
    pub initial_song: usize,
    pub bpm_override: Option<f64>,
    pub launchpad_port: String,
    pub output_filter: Option<String>,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            songs_dir: cli.songs,
            initial_song: cli.song,
            bpm_override: cli.bpm.map(clamp_bpm),
            launchpad_port: cli.launchpad,
            output_filter: cli.output_filter,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            songs_dir: PathBuf::from(DEFAULT_SONGS_DIR),
            initial_song: 0,
            bpm_override: None,
            launchpad_port: DEFAULT_LAUNCHPAD_PORT.to_string(),
            output_filter: None,
        }
    }
}
