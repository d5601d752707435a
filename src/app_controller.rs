use anyhow::{Result, Context, anyhow};
use log::{warn, info, debug};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::converter::SubtitleConverter;
use crate::file_utils::{FileManager, InputType};
use crate::subtitle_processor::{self, ConversionOptions, MultiFormatResult, SubtitleItem};

// @module: Application controller for file-based conversion

/// Keys under which a JSON object payload may carry its items
const PAYLOAD_ITEM_KEYS: [&str; 3] = ["segments", "items", "subtitles"];

/// Main application controller for the command-line front end
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read an input file into a raw item payload
    pub fn load_input<P: AsRef<Path>>(&self, input_file: P) -> Result<Value> {
        let input_file = input_file.as_ref();
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let content = FileManager::read_to_string(input_file)?;
        match FileManager::detect_input_type(input_file, &content) {
            InputType::Json => {
                let payload: Value = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON input: {:?}", input_file))?;
                Ok(Self::extract_items(payload))
            }
            InputType::Srt => {
                let items = subtitle_processor::parse_srt_string(&content)
                    .with_context(|| format!("Failed to parse SRT input: {:?}", input_file))?;
                debug!("Parsed {} subtitle entries from {:?}", items.len(), input_file);
                Ok(SubtitleItem::to_raw_array(&items))
            }
            InputType::Unknown => Err(anyhow!(
                "Unrecognized input file (expected a JSON payload or an SRT file): {:?}",
                input_file
            )),
        }
    }

    /// Unwrap `{"segments": [...]}` style payloads; anything else is passed through
    fn extract_items(payload: Value) -> Value {
        match payload {
            Value::Object(mut map) => {
                for key in PAYLOAD_ITEM_KEYS {
                    if matches!(map.get(key), Some(Value::Array(_))) {
                        return map.remove(key).unwrap_or(Value::Null);
                    }
                }
                Value::Object(map)
            }
            other => other,
        }
    }

    /// Convert an input file to every configured format.
    ///
    /// `overrides` take precedence over the configured default options.
    pub fn convert_file<P: AsRef<Path>>(&self, input_file: P, overrides: &ConversionOptions) -> Result<MultiFormatResult> {
        let payload = self.load_input(&input_file)?;
        let options = overrides.clone().or(&self.config.options);
        let formats = self.config.output_formats()?;

        let result = SubtitleConverter::convert_to_many(&payload, &formats, &options)?;
        info!("Converted {:?} to {} format(s)", input_file.as_ref(), result.results.len());
        Ok(result)
    }

    /// Write each rendered format next to the others in `output_dir`.
    ///
    /// Existing files are skipped unless `force_overwrite` is set. Returns the
    /// paths actually written.
    pub fn write_outputs<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input_file: P1,
        output_dir: P2,
        result: &MultiFormatResult,
        force_overwrite: bool,
    ) -> Result<Vec<PathBuf>> {
        FileManager::ensure_dir(&output_dir)?;

        let mut written = Vec::with_capacity(result.results.len());
        for rendered in &result.results {
            let output_path = FileManager::generate_output_path(&input_file, &output_dir, rendered.format.extension());
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {:?}, file already exists (use -f to force overwrite)", output_path);
                continue;
            }

            FileManager::write_to_file(&output_path, &rendered.content)?;
            info!("Wrote {} output to {:?}", rendered.format, output_path);
            written.push(output_path);
        }

        Ok(written)
    }

    /// Convert `input_file` and write the results into `output_dir`
    pub fn run<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input_file: P1,
        output_dir: P2,
        overrides: &ConversionOptions,
        force_overwrite: bool,
    ) -> Result<Vec<PathBuf>> {
        let result = self.convert_file(&input_file, overrides)?;
        self.write_outputs(input_file, output_dir, &result, force_overwrite)
    }
}
