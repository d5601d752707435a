/*!
 * Structural and timing validation for raw subtitle items.
 *
 * Raw items arrive as JSON values (an API payload or transcription output).
 * Each item is checked in a fixed order:
 * - fields present with the right shapes
 * - timing non-negative and start before end, checked on the numbers as sent
 * - timing in whole milliseconds within `MAX_TIMING_MS`
 * - text non-empty after trimming (unless empty text is allowed)
 * - speaker, when present, a non-negative integer
 *
 * The scan stops at the first violation.
 */

use std::fmt::Display;

use log::debug;
use serde_json::{Map, Value};

use crate::errors::ConversionError;
use crate::subtitle_processor::SubtitleItem;

/// Largest timing accepted, the integer range a JSON number carries exactly
pub const MAX_TIMING_MS: i64 = 9_007_199_254_740_991;

/// Validate a raw payload and convert it to typed items.
///
/// Timing is compared as sent. Fractional or out-of-range milliseconds are
/// rejected afterwards rather than rounded.
pub fn validate(items: &Value, allow_empty_text: bool) -> Result<Vec<SubtitleItem>, ConversionError> {
    let raw_items = match items {
        Value::Array(raw_items) if !raw_items.is_empty() => raw_items,
        Value::Array(_) => return Err(empty_input("subtitle data is empty")),
        Value::Null => return Err(empty_input("subtitle data is missing")),
        other => {
            return Err(empty_input(format!(
                "subtitle data must be an array of items, got {}",
                json_kind(other)
            )));
        }
    };

    let mut validated = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        validated.push(validate_raw_item(index, raw, allow_empty_text)?);
    }

    debug!("Validated {} subtitle items", validated.len());
    Ok(validated)
}

/// Validate items that are already typed.
///
/// Shapes are guaranteed by the type, so only the emptiness, timing and text
/// checks apply.
pub fn validate_items(items: &[SubtitleItem], allow_empty_text: bool) -> Result<(), ConversionError> {
    if items.is_empty() {
        return Err(empty_input("subtitle data is empty"));
    }

    items.iter()
        .enumerate()
        .try_for_each(|(index, item)| check_item(index, item, allow_empty_text))
}

/// Check timing and text of one typed item
pub fn check_item(index: usize, item: &SubtitleItem, allow_empty_text: bool) -> Result<(), ConversionError> {
    check_timing(index, item.start, item.end)?;
    if item.end > MAX_TIMING_MS {
        return Err(ConversionError::invalid_data(
            index,
            format!("malformed fields: 'end' exceeds {}ms", MAX_TIMING_MS),
        ));
    }
    check_text(index, &item.text, allow_empty_text)
}

fn validate_raw_item(index: usize, raw: &Value, allow_empty_text: bool) -> Result<SubtitleItem, ConversionError> {
    let fields = raw.as_object()
        .ok_or_else(|| ConversionError::invalid_data(index, format!("malformed fields: item is {}", json_kind(raw))))?;

    let start = millis_field(index, fields, "start")?;
    let end = millis_field(index, fields, "end")?;
    let text = fields.get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| ConversionError::invalid_data(index, "malformed fields: 'text' must be a string"))?;

    check_timing(index, start, end)?;
    let start = whole_millis(index, "start", start)?;
    let end = whole_millis(index, "end", end)?;
    check_text(index, text, allow_empty_text)?;
    let speaker = speaker_field(index, fields)?;

    Ok(SubtitleItem {
        start,
        end,
        text: text.to_string(),
        speaker,
    })
}

fn millis_field(index: usize, fields: &Map<String, Value>, name: &str) -> Result<f64, ConversionError> {
    fields.get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ConversionError::invalid_data(index, format!("malformed fields: '{}' must be a number", name))
        })
}

fn whole_millis(index: usize, name: &str, value: f64) -> Result<i64, ConversionError> {
    if value.fract() != 0.0 {
        return Err(ConversionError::invalid_data(
            index,
            format!("malformed fields: '{}' must be whole milliseconds, got {}", name, value),
        ));
    }
    if value > MAX_TIMING_MS as f64 {
        return Err(ConversionError::invalid_data(
            index,
            format!("malformed fields: '{}' exceeds {}ms", name, MAX_TIMING_MS),
        ));
    }
    Ok(value as i64)
}

fn check_timing<T: PartialOrd + Default + Display>(index: usize, start: T, end: T) -> Result<(), ConversionError> {
    let zero = T::default();
    if start < zero || end < zero {
        return Err(ConversionError::invalid_timing(
            index,
            format!("negative timing (start {}ms, end {}ms)", start, end),
        ));
    }
    if start >= end {
        return Err(ConversionError::invalid_timing(
            index,
            format!("start {}ms is not before end {}ms", start, end),
        ));
    }
    Ok(())
}

fn check_text(index: usize, text: &str, allow_empty_text: bool) -> Result<(), ConversionError> {
    if !allow_empty_text && text.trim().is_empty() {
        return Err(ConversionError::invalid_data(index, "empty text"));
    }
    Ok(())
}

fn speaker_field(index: usize, fields: &Map<String, Value>) -> Result<Option<u32>, ConversionError> {
    let invalid = || ConversionError::invalid_data(index, "invalid speaker: must be a non-negative integer");

    match fields.get("speaker") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(id) = n.as_u64() {
                return u32::try_from(id).map(Some).map_err(|_| invalid());
            }
            // 2.0 is an integer as far as the payload is concerned
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(Some(f as u32)),
                _ => Err(invalid()),
            }
        }
        Some(_) => Err(invalid()),
    }
}

fn empty_input(reason: impl Into<String>) -> ConversionError {
    ConversionError::InvalidData { index: None, reason: reason.into() }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
