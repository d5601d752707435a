/*!
 * Error types for the subconv library.
 *
 * This module contains custom error types for the conversion core and the
 * command-line front end, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::subtitle_processor::SubtitleFormat;

/// Errors that can occur while validating, processing or rendering subtitles
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Input is missing, empty, or an item has malformed fields, empty text or a bad speaker
    #[error("Invalid subtitle data{}: {reason}", at_index(.index))]
    InvalidData {
        /// Index of the offending item, if the failure concerns one item
        index: Option<usize>,
        /// Human readable reason
        reason: String,
    },

    /// Negative timing or start not before end
    #[error("Invalid subtitle timing{}: {reason}", at_index(.index))]
    InvalidTiming {
        /// Index of the offending item
        index: Option<usize>,
        /// Human readable reason
        reason: String,
    },

    /// The requested output format is not one of the supported formats
    #[error("Unsupported format '{requested}'. Supported formats: {}", .supported.join(", "))]
    UnsupportedFormat {
        /// The value the caller asked for
        requested: String,
        /// Every format the renderer set understands
        supported: Vec<String>,
    },

    /// A renderer failed to produce output
    #[error("Conversion to {format} failed: {message}")]
    ConversionFailed {
        format: SubtitleFormat,
        message: String,
    },

    /// Any other pipeline-stage failure
    #[error("Processing failed during {step}: {message}")]
    ProcessingFailed {
        step: String,
        message: String,
    },
}

fn at_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at index {}", i),
        None => String::new(),
    }
}

impl ConversionError {
    /// Build an `InvalidData` error for the item at `index`
    pub fn invalid_data(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidData { index: Some(index), reason: reason.into() }
    }

    /// Build an `InvalidTiming` error for the item at `index`
    pub fn invalid_timing(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTiming { index: Some(index), reason: reason.into() }
    }

    /// Build an `UnsupportedFormat` error listing the supported set
    pub fn unsupported_format(requested: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            requested: requested.into(),
            supported: SubtitleFormat::ALL.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Index of the offending item, when the error concerns a single item
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::InvalidData { index, .. } | Self::InvalidTiming { index, .. } => *index,
            _ => None,
        }
    }

    /// Suggested HTTP status for an enclosing API layer
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidData { .. } | Self::InvalidTiming { .. } | Self::UnsupportedFormat { .. } => 400,
            Self::ConversionFailed { .. } => 422,
            Self::ProcessingFailed { .. } => 500,
        }
    }
}

/// Main application error type used by the command-line front end
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the conversion core
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error with the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
