/*!
 * Application configuration.
 *
 * Configuration of the command-line front end: default conversion options,
 * output formats, output location and logging.
 */

use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::subtitle_processor::{ConversionOptions, SubtitleFormat};

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Default processing options, overridden per run by CLI flags
    #[serde(default)]
    pub options: ConversionOptions,

    /// Output formats, in the order they are written
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Output directory; stdout when absent
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

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

fn default_formats() -> Vec<String> {
    vec![SubtitleFormat::Srt.to_string()]
}

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "subconv.json";

impl Config {

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            warn!("Config file not found at '{}', using default config.", path.display());
            Ok(Self::default())
        }
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Resolved output formats
    pub fn output_formats(&self) -> Result<Vec<SubtitleFormat>> {
        let formats = SubtitleFormat::parse_list(&self.formats.join(","))?;
        if formats.is_empty() {
            return Err(anyhow!("At least one output format is required"));
        }
        Ok(formats)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.output_formats()?;

        if let Some(threshold) = self.options.merge_threshold {
            if threshold < 0 {
                return Err(anyhow!("Merge threshold must not be negative, got {}", threshold));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            options: ConversionOptions::default(),
            formats: default_formats(),
            output_dir: None,
            log_level: LogLevel::default(),
        }
    }
}
