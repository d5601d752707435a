// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{error, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use subconv::app_config::{self, Config, DEFAULT_CONFIG_FILE};
use subconv::app_controller::Controller;
use subconv::subtitle_processor::{ConversionOptions, SubtitleFormat};

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a subtitle payload or SRT file to one or more formats
    Convert(ConvertArgs),

    /// Generate shell completions for subconv
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input JSON payload or SRT file
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Comma-separated output formats (json, srt, vtt, plain-text)
    #[arg(short = 'F', long)]
    formats: Option<String>,

    /// Output directory; rendered content goes to stdout when omitted
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Milliseconds added to every start and end time
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<i64>,

    /// Prefix text with "[Speaker N]: " when a speaker is known
    #[arg(long)]
    include_speaker: bool,

    /// Keep text exactly as given instead of normalizing whitespace
    #[arg(long, conflicts_with = "clean")]
    no_clean: bool,

    /// Normalize whitespace and drop items left empty
    #[arg(long)]
    clean: bool,

    /// Merge consecutive items separated by a small gap
    #[arg(long)]
    merge: bool,

    /// Maximum gap in milliseconds for merging
    #[arg(long, requires = "merge")]
    merge_threshold: Option<i64>,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

impl ConvertArgs {
    /// Options set explicitly on the command line
    fn option_overrides(&self) -> ConversionOptions {
        let clean_text = if self.no_clean {
            Some(false)
        } else if self.clean {
            Some(true)
        } else {
            None
        };

        ConversionOptions {
            timing_offset: self.offset,
            include_speaker: self.include_speaker.then_some(true),
            clean_text,
            merge_adjacent: self.merge.then_some(true),
            merge_threshold: self.merge_threshold,
        }
    }
}

/// subconv - subtitle transformation and multi-format rendering
///
/// Converts timed text segments (JSON payloads or SRT files) into SRT, WebVTT,
/// JSON or plain text, with optional timing shift, speaker labels and merging.
#[derive(Parser, Debug)]
#[command(name = "subconv")]
#[command(version)]
#[command(about = "Subtitle transformation and multi-format rendering")]
#[command(long_about = "subconv converts timed text segments into subtitle formats.

EXAMPLES:
    subconv convert segments.json                       # Print SRT to stdout
    subconv convert segments.json -F srt,vtt -o out/    # Write out/segments.srt and out/segments.vtt
    subconv convert movie.srt -F vtt --offset -1500     # Shift an SRT file back by 1.5s
    subconv convert talk.json --include-speaker --merge # Label speakers and merge close segments
    subconv completions bash > subconv.bash             # Generate bash completions

CONFIGURATION:
    Defaults are read from subconv.json when present. Command line flags
    override the configuration file.")]
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
        // The logger itself accepts everything; `log::set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()), now, record.level(), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subconv", &mut std::io::stdout());
            Ok(())
        }
        Commands::Convert(args) => {
            if let Err(e) = run_convert(args) {
                error!("{:#}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cli_level) = &args.log_level {
        let level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(level.into());
    }

    let mut config = Config::load_or_default(&args.config_path)?;

    if let Some(formats) = &args.formats {
        config.formats = SubtitleFormat::parse_list(formats)?
            .iter()
            .map(|f| f.to_string())
            .collect();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = Some(output_dir.clone());
    }
    match &args.log_level {
        Some(cli_level) => config.log_level = cli_level.clone().into(),
        None => log::set_max_level(config.log_level.into()),
    }

    let controller = Controller::with_config(config)?;
    let overrides = args.option_overrides();

    match controller.config().output_dir.clone() {
        Some(output_dir) => {
            let written = controller.run(&args.input_path, &output_dir, &overrides, args.force_overwrite)?;
            info!("Wrote {} file(s) to {:?}", written.len(), output_dir);
        }
        None => {
            let result = controller.convert_file(&args.input_path, &overrides)?;
            let mut stdout = std::io::stdout().lock();
            let multiple = result.results.len() > 1;
            for rendered in &result.results {
                if multiple {
                    writeln!(stdout, "==> {} <==", rendered.format)?;
                }
                writeln!(stdout, "{}", rendered.content)
                    .context("Failed to write to stdout")?;
            }
        }
    }

    Ok(())
}
