/*!
 * # subconv - subtitle transformation and multi-format rendering
 *
 * A Rust library that turns timed text segments (from a transcription service
 * or an API payload) into subtitle documents.
 *
 * ## Features
 *
 * - Fail-fast validation of raw segments with index-carrying errors
 * - Fixed-order transforms: timing offset, whitespace cleaning, speaker labels
 * - Optional merging of adjacent segments
 * - Rendering to:
 *   - SRT
 *   - WebVTT
 *   - JSON
 *   - plain text
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_processor`: Item model, options, formats and time codes
 * - `validation`: Raw payload validation
 * - `transform`: Transformation pipeline:
 *   - `transform::filters`: Single-item transforms and the filter chain
 *   - `transform::pipeline`: Fixed-order processing and merging
 * - `formats`: Output renderers
 * - `converter`: Conversion entry points
 * - `app_config`: Configuration for the command-line front end
 * - `app_controller`: File-based conversion used by the binary
 * - `file_utils`: File system helpers for the binary
 * - `errors`: Custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(non_snake_case)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod converter;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod subtitle_processor;
pub mod transform;
pub mod validation;

// Re-export main types for easier usage
pub use converter::{SubtitleConverter, convert, convert_multiple};
pub use errors::{AppError, ConversionError};
pub use subtitle_processor::{
    ConversionOptions, ConversionResult, MultiFormatResult, SubtitleFormat, SubtitleItem,
};
pub use transform::{Pipeline, process};
pub use validation::validate;
