use std::fmt;
use std::str::FromStr;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{warn, debug};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::errors::ConversionError;

// @module: Subtitle item model and time codes

// @const: SRT/VTT timestamp line regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @struct: Single timed text unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleItem {
    // @field: Start time in ms
    pub start: i64,

    // @field: End time in ms
    pub end: i64,

    // @field: Subtitle text
    pub text: String,

    // @field: Optional speaker id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<u32>,
}

impl SubtitleItem {
    /// Creates a new item without a speaker
    pub fn new(start: i64, end: i64, text: impl Into<String>) -> Self {
        SubtitleItem {
            start,
            end,
            text: text.into(),
            speaker: None,
        }
    }

    /// Creates a new item attributed to a speaker
    pub fn with_speaker(start: i64, end: i64, text: impl Into<String>, speaker: u32) -> Self {
        SubtitleItem {
            start,
            end,
            text: text.into(),
            speaker: Some(speaker),
        }
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Raw JSON shape of this item, as an API payload would carry it
    pub fn to_raw(&self) -> Value {
        let mut raw = json!({
            "start": self.start,
            "end": self.end,
            "text": self.text,
        });
        if let Some(speaker) = self.speaker {
            raw["speaker"] = json!(speaker);
        }
        raw
    }

    /// Raw JSON array for a slice of items
    pub fn to_raw_array(items: &[SubtitleItem]) -> Value {
        Value::Array(items.iter().map(SubtitleItem::to_raw).collect())
    }

    /// Format start time as an SRT timestamp
    pub fn format_start_time(&self) -> String {
        format_timestamp(self.start, ',')
    }

    /// Format end time as an SRT timestamp
    pub fn format_end_time(&self) -> String {
        format_timestamp(self.end, ',')
    }
}

impl fmt::Display for SubtitleItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.speaker {
            Some(speaker) => write!(
                f,
                "[{} --> {}] ({}) {}",
                self.format_start_time(), self.format_end_time(), speaker, self.text
            ),
            None => write!(f, "[{} --> {}] {}", self.format_start_time(), self.format_end_time(), self.text),
        }
    }
}

/// Format milliseconds as `HH:MM:SS{sep}mmm`.
///
/// Hours keep growing past 99 rather than wrapping. Negative values, which only
/// a pathological negative offset can produce, render as zero.
pub fn format_timestamp(ms: i64, millis_separator: char) -> String {
    let ms = ms.max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, seconds, millis_separator, millis)
}

/// Parse an `HH:MM:SS,mmm` or `HH:MM:SS.mmm` timestamp to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<i64> {
    let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let hours: i64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: i64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: i64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: i64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if hours < 0 || minutes < 0 || seconds < 0 || millis < 0
        || minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    timestamp_ms(hours, minutes, seconds, millis)
        .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
}

fn timestamp_ms(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Option<i64> {
    hours.checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
}

/// Parse SRT content into subtitle items.
///
/// Blocks with an unreadable or out-of-range time line, an empty body or
/// backwards timing are skipped. Items keep file order; sequence numbers in
/// the source are not trusted.
pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleItem>> {
    let mut items = Vec::new();
    let mut current_times: Option<(i64, i64)> = None;
    let mut current_text = String::new();

    let flush = |times: Option<(i64, i64)>, text: &mut String, items: &mut Vec<SubtitleItem>| {
        if let Some((start, end)) = times {
            if text.trim().is_empty() {
                warn!("Skipping empty subtitle block at {}", format_timestamp(start, ','));
            } else if end <= start {
                warn!("Skipping subtitle block with end {} <= start {}", end, start);
            } else {
                items.push(SubtitleItem::new(start, end, text.trim().to_string()));
            }
        }
        text.clear();
    };

    for (line_number, line) in content.lines().enumerate() {
        let trimmed = line.trim().trim_start_matches('\u{feff}');

        if trimmed.is_empty() {
            flush(current_times.take(), &mut current_text, &mut items);
            continue;
        }

        if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
            // A new time line without a separating blank line still starts a new block
            flush(current_times.take(), &mut current_text, &mut items);
            match (captured_ms(&caps, 1), captured_ms(&caps, 5)) {
                (Some(start), Some(end)) => current_times = Some((start, end)),
                _ => warn!("Skipping subtitle block with unreadable time line at line {}", line_number + 1),
            }
            continue;
        }

        if current_times.is_none() {
            if trimmed.parse::<usize>().is_err() && trimmed != "WEBVTT" {
                debug!("Ignoring text outside a subtitle block at line {}: {}", line_number + 1, trimmed);
            }
            continue;
        }

        if !current_text.is_empty() {
            current_text.push('\n');
        }
        current_text.push_str(trimmed);
    }
    flush(current_times.take(), &mut current_text, &mut items);

    if items.is_empty() {
        return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
    }

    Ok(items)
}

fn captured_ms(caps: &regex::Captures, start_idx: usize) -> Option<i64> {
    let part = |offset: usize| -> Option<i64> {
        caps.get(start_idx + offset)?.as_str().parse().ok()
    };

    timestamp_ms(part(0)?, part(1)?, part(2)?, part(3)?)
}

/// Output formats understood by the renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtitleFormat {
    Json,
    Srt,
    Vtt,
    PlainText,
}

impl SubtitleFormat {
    /// Every supported format, in canonical order
    pub const ALL: [SubtitleFormat; 4] = [
        SubtitleFormat::Json,
        SubtitleFormat::Srt,
        SubtitleFormat::Vtt,
        SubtitleFormat::PlainText,
    ];

    // @returns: Canonical lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::PlainText => "plain-text",
        }
    }

    // @returns: Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::PlainText => "txt",
        }
    }

    // @returns: MIME type for the rendered content
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Srt => "application/x-subrip",
            Self::Vtt => "text/vtt",
            Self::PlainText => "text/plain",
        }
    }

    /// Split a comma-separated, case-insensitive format list.
    ///
    /// Blank entries are ignored; the first unknown entry fails the whole list.
    pub fn parse_list(list: &str) -> Result<Vec<SubtitleFormat>, ConversionError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SubtitleFormat::from_str)
            .collect()
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubtitleFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "plain-text" => Ok(Self::PlainText),
            _ => Err(ConversionError::unsupported_format(s)),
        }
    }
}

/// Per-call processing options. Every field is optional; `None` means
/// "not specified" and each stage applies its own default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Milliseconds added to start and end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_offset: Option<i64>,

    /// Prefix text with `[Speaker N]: `
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_speaker: Option<bool>,

    /// Normalize whitespace (on unless explicitly disabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_text: Option<bool>,

    /// Merge consecutive items separated by at most `merge_threshold` ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_adjacent: Option<bool>,

    /// Maximum gap in ms for merging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_threshold: Option<i64>,
}

/// Default merge threshold in milliseconds
pub const DEFAULT_MERGE_THRESHOLD_MS: i64 = 1000;

impl ConversionOptions {
    pub fn with_timing_offset(mut self, offset_ms: i64) -> Self {
        self.timing_offset = Some(offset_ms);
        self
    }

    pub fn with_include_speaker(mut self, include: bool) -> Self {
        self.include_speaker = Some(include);
        self
    }

    pub fn with_clean_text(mut self, clean: bool) -> Self {
        self.clean_text = Some(clean);
        self
    }

    pub fn with_merge(mut self, threshold_ms: Option<i64>) -> Self {
        self.merge_adjacent = Some(true);
        self.merge_threshold = threshold_ms;
        self
    }

    /// Fill unset fields from `defaults`, keeping values set on `self`
    pub fn or(self, defaults: &ConversionOptions) -> Self {
        ConversionOptions {
            timing_offset: self.timing_offset.or(defaults.timing_offset),
            include_speaker: self.include_speaker.or(defaults.include_speaker),
            clean_text: self.clean_text.or(defaults.clean_text),
            merge_adjacent: self.merge_adjacent.or(defaults.merge_adjacent),
            merge_threshold: self.merge_threshold.or(defaults.merge_threshold),
        }
    }

    // @returns: Effective merge threshold
    pub fn effective_merge_threshold(&self) -> i64 {
        self.merge_threshold.unwrap_or(DEFAULT_MERGE_THRESHOLD_MS)
    }
}

/// Rendered output for one format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub format: SubtitleFormat,
    pub content: String,
}

/// Rendered outputs for several formats, in requested order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiFormatResult {
    pub results: Vec<ConversionResult>,
}

impl MultiFormatResult {
    /// Content rendered for `format`, if it was requested
    pub fn get(&self, format: SubtitleFormat) -> Option<&str> {
        self.results.iter()
            .find(|r| r.format == format)
            .map(|r| r.content.as_str())
    }
}
