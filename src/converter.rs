/*!
 * Conversion entry points.
 *
 * Combines the processing pipeline with renderer selection. Formats are
 * resolved before any processing so an unsupported format is reported even
 * when the data is also invalid.
 */

use std::str::FromStr;

use log::{debug, warn};
use serde_json::Value;

use crate::errors::ConversionError;
use crate::formats;
use crate::subtitle_processor::{
    ConversionOptions, ConversionResult, MultiFormatResult, SubtitleFormat, SubtitleItem,
};
use crate::transform::Pipeline;

/// Facade over pipeline and renderers
pub struct SubtitleConverter;

impl SubtitleConverter {
    /// Process `raw` and render it in the format named by `format`
    pub fn convert(raw: &Value, format: &str, options: &ConversionOptions) -> Result<String, ConversionError> {
        let format = SubtitleFormat::from_str(format)?;
        Self::convert_to(raw, format, options)
    }

    /// Process `raw` and render it in `format`
    pub fn convert_to(raw: &Value, format: SubtitleFormat, options: &ConversionOptions) -> Result<String, ConversionError> {
        let processed = Self::run_pipeline(raw, options)?;
        let content = formats::render(format, &processed)?;
        debug!("Rendered {} subtitle items as {}", processed.len(), format);
        Ok(content)
    }

    /// Render every requested format, in request order.
    ///
    /// The payload is processed once and rendered per format; the first failure
    /// aborts the whole call.
    pub fn convert_multiple(
        raw: &Value,
        requested: &[&str],
        options: &ConversionOptions,
    ) -> Result<MultiFormatResult, ConversionError> {
        let resolved = requested.iter()
            .map(|f| SubtitleFormat::from_str(f))
            .collect::<Result<Vec<_>, _>>()?;
        Self::convert_to_many(raw, &resolved, options)
    }

    /// Typed variant of `convert_multiple`
    pub fn convert_to_many(
        raw: &Value,
        targets: &[SubtitleFormat],
        options: &ConversionOptions,
    ) -> Result<MultiFormatResult, ConversionError> {
        let processed = Self::run_pipeline(raw, options)?;

        let results = targets.iter()
            .map(|&format| {
                formats::render(format, &processed)
                    .map(|content| ConversionResult { format, content })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Rendered {} subtitle items in {} formats", processed.len(), results.len());
        Ok(MultiFormatResult { results })
    }

    fn run_pipeline(raw: &Value, options: &ConversionOptions) -> Result<Vec<SubtitleItem>, ConversionError> {
        Pipeline::new(options.clone())
            .process(raw)
            .inspect_err(|e| warn!("Subtitle processing rejected input: {}", e))
    }
}

/// Process `raw` and render it in the format named by `format`
pub fn convert(raw: &Value, format: &str, options: &ConversionOptions) -> Result<String, ConversionError> {
    SubtitleConverter::convert(raw, format, options)
}

/// Render every requested format, in request order
pub fn convert_multiple(raw: &Value, requested: &[&str], options: &ConversionOptions) -> Result<MultiFormatResult, ConversionError> {
    SubtitleConverter::convert_multiple(raw, requested, options)
}
