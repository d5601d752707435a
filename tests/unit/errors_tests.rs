/*!
 * Tests for error types and conversions
 */

use subconv::errors::{AppError, ConversionError};
use subconv::subtitle_processor::SubtitleFormat;

#[test]
fn test_conversionError_invalidData_shouldDisplayIndex() {
    let error = ConversionError::invalid_data(3, "empty text");
    let display = format!("{}", error);
    assert!(display.contains("Invalid subtitle data at index 3"));
    assert!(display.contains("empty text"));
    assert_eq!(error.index(), Some(3));
}

#[test]
fn test_conversionError_withoutIndex_shouldOmitIt() {
    let error = ConversionError::InvalidData { index: None, reason: "subtitle data is empty".to_string() };
    assert_eq!(error.to_string(), "Invalid subtitle data: subtitle data is empty");
}

#[test]
fn test_conversionError_unsupportedFormat_shouldListFormats() {
    let error = ConversionError::unsupported_format("ass");
    let display = error.to_string();
    assert!(display.contains("'ass'"));
    assert!(display.contains("json, srt, vtt, plain-text"));
}

#[test]
fn test_conversionError_statusCodes_shouldFollowKinds() {
    assert_eq!(ConversionError::invalid_timing(0, "negative").status_code(), 400);
    assert_eq!(ConversionError::unsupported_format("x").status_code(), 400);
    assert_eq!(
        ConversionError::ConversionFailed { format: SubtitleFormat::Json, message: "boom".into() }.status_code(),
        422
    );
    assert_eq!(
        ConversionError::ProcessingFailed { step: "merge".into(), message: "boom".into() }.status_code(),
        500
    );
}

#[test]
fn test_appError_fromConversionError_shouldWrapCorrectly() {
    let app_error: AppError = ConversionError::unsupported_format("x").into();
    let display = format!("{}", app_error);
    assert!(display.contains("Conversion error"));
}

#[test]
fn test_appError_fromIoError_shouldWrapAsFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let app_error: AppError = io_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("File error"));
    assert!(display.contains("File not found"));
}
