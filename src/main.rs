// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{Result, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use clap::{Parser, Subcommand, ValueEnum};

use crate::app_config::{ColorTrack, Config};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod encoding_recovery;
mod episode_utils;
mod errors;
mod file_utils;
mod merge_engine;
mod providers;
mod subtitle_processor;
mod translation;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for ColorTrack to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliColorTrack {
    None,
    TrackA,
    TrackB,
}

impl From<CliColorTrack> for ColorTrack {
    fn from(cli_track: CliColorTrack) -> Self {
        match cli_track {
            CliColorTrack::None => ColorTrack::None,
            CliColorTrack::TrackA => ColorTrack::TrackA,
            CliColorTrack::TrackB => ColorTrack::TrackB,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge two subtitle tracks into one bilingual track
    Merge(MergeArgs),

    /// Translate a subtitle file batch by batch using a local AI server
    Translate(TranslateArgs),

    /// Fix a simple delay or progressive drift in one subtitle file
    Shift(ShiftArgs),
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Directory of paired subtitle files, or the track A file when --track-b is given
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Track B subtitle file (single-pair mode)
    #[arg(short = 'b', long)]
    track_b: Option<PathBuf>,

    /// Output directory (directory mode) or output file (single-pair mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Merge threshold in milliseconds
    #[arg(long)]
    threshold_ms: Option<i64>,

    /// Track A shift in milliseconds
    #[arg(long)]
    shift_a: Option<i64>,

    /// Track B shift in milliseconds
    #[arg(long)]
    shift_b: Option<i64>,

    /// Global shift applied after merging, in milliseconds
    #[arg(long)]
    shift_global: Option<i64>,

    /// Which track to color
    #[arg(long, value_enum)]
    color_track: Option<CliColorTrack>,

    /// Color as 6 hex digits, leading '#' optional
    #[arg(long)]
    color: Option<String>,

    /// Filename keyword identifying track B inside an episode pair
    #[arg(short = 'k', long)]
    track_b_keyword: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Subtitle file to translate
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model identifier as loaded in the serving backend
    #[arg(short, long)]
    model: Option<String>,

    /// Server endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Source language name
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language name
    #[arg(short, long)]
    target_language: Option<String>,

    /// Free-text show context to help the model
    #[arg(long)]
    context: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct ShiftArgs {
    /// Subtitle file to fix
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Linear shift in milliseconds, may be negative
    #[arg(long, default_value_t = 0)]
    shift_ms: i64,

    /// Speed factor for drift correction, e.g. 0.9590 (23.9 to 25 fps)
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subforge - bilingual subtitle merger, fixer and translator
///
/// Repairs subtitle files of uncertain encoding, merges two language
/// tracks into one bilingual track by timestamp proximity, fixes timing
/// drift, and batch-translates subtitles against a local AI server.
#[derive(Parser, Debug)]
#[command(name = "subforge")]
#[command(version = "0.1.0")]
#[command(about = "Bilingual subtitle merge, sync and translation tool")]
#[command(long_about = "subforge repairs subtitle files of uncertain encoding and merges, shifts or translates them.

EXAMPLES:
    subforge merge ./season1/                         # Merge every episode pair in a directory
    subforge merge a.srt -b b.srt -o merged.srt       # Merge a single pair
    subforge merge ./season1/ --threshold-ms 500      # Tighter matching window
    subforge translate movie.en.srt -t Spanish        # Translate using the configured server
    subforge shift movie.srt --shift-ms -2000         # Remove a 2 second delay
    subforge shift movie.srt --speed 1.0427           # Fix 25 to 23.9 fps drift

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Load the configuration file, creating a default one when absent
fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    let config = if std::path::Path::new(config_path).exists() {
        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    let mut config = config;
    if let Some(level) = log_level {
        config.log_level = level.clone().into();
    }

    let filter = match config.log_level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    };
    log::set_max_level(filter);

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Merge(args) => run_merge(args),
        Commands::Translate(args) => run_translate(args).await,
        Commands::Shift(args) => run_shift(args),
    }
}

fn run_merge(args: MergeArgs) -> Result<()> {
    let mut config = load_config(&args.config_path, args.log_level.as_ref())?;

    // Override config with CLI options if provided
    if let Some(threshold) = args.threshold_ms {
        config.merge.threshold_ms = threshold;
    }
    if let Some(shift_a) = args.shift_a {
        config.merge.shift_a_ms = shift_a;
    }
    if let Some(shift_b) = args.shift_b {
        config.merge.shift_b_ms = shift_b;
    }
    if let Some(shift_global) = args.shift_global {
        config.merge.shift_global_ms = shift_global;
    }
    if let Some(color_track) = args.color_track {
        config.merge.color_track = color_track.into();
    }
    if let Some(color) = args.color {
        config.merge.color_hex = color;
    }
    if let Some(keyword) = args.track_b_keyword {
        config.merge.track_b_keyword = keyword;
    }

    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config)?;

    match args.track_b {
        Some(track_b) => {
            let output = args.output.ok_or_else(|| {
                anyhow::anyhow!("--output is required when merging a single pair")
            })?;
            if output.exists() && !args.force_overwrite {
                warn!("Output already exists: {:?} (use -f to force overwrite)", output);
                return Ok(());
            }
            controller.run_merge_pair(&args.input_path, &track_b, &output)
        }
        None => {
            let output_dir = args.output.unwrap_or_else(|| args.input_path.clone());
            controller.run_merge_dir(&args.input_path, &output_dir, args.force_overwrite)
        }
    }
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut config = load_config(&args.config_path, args.log_level.as_ref())?;

    if let Some(model) = args.model {
        config.translation.model = model;
    }
    if let Some(endpoint) = args.endpoint {
        config.translation.endpoint = endpoint;
    }
    if let Some(source) = args.source_language {
        config.translation.source_language = source;
    }
    if let Some(target) = args.target_language {
        config.translation.target_language = target;
    }
    if let Some(context) = args.context {
        config.translation.context = context;
    }

    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config)?;

    // Ctrl-C requests a cooperative stop between batches
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Stop requested, finishing current batch");
            cancel_flag.store(true, Ordering::SeqCst);
        }
    });

    controller.run_translate(&args.input_file, args.output, cancel).await
}

fn run_shift(args: ShiftArgs) -> Result<()> {
    let config = load_config(&args.config_path, args.log_level.as_ref())?;

    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config)?;

    controller.run_shift(&args.input_file, args.shift_ms, args.speed, args.output)
}
