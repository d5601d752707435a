/*!
 * Output renderers.
 *
 * Each renderer turns an already processed sequence into a complete document.
 * No validation happens here.
 */

use crate::errors::ConversionError;
use crate::subtitle_processor::{SubtitleFormat, SubtitleItem, format_timestamp};

/// Render `items` in `format`
pub fn render(format: SubtitleFormat, items: &[SubtitleItem]) -> Result<String, ConversionError> {
    match format {
        SubtitleFormat::Json => render_json(items),
        SubtitleFormat::Srt => Ok(render_srt(items)),
        SubtitleFormat::Vtt => Ok(render_vtt(items)),
        SubtitleFormat::PlainText => Ok(render_plain_text(items)),
    }
}

/// SubRip: index, time line, text, blank line per item
pub fn render_srt(items: &[SubtitleItem]) -> String {
    let mut lines = Vec::with_capacity(items.len() * 4);
    for (i, item) in items.iter().enumerate() {
        lines.push((i + 1).to_string());
        lines.push(format!("{} --> {}", srt_timestamp(item.start), srt_timestamp(item.end)));
        lines.push(item.text.clone());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// WebVTT: header, then time line, text, blank line per item
pub fn render_vtt(items: &[SubtitleItem]) -> String {
    let mut lines = Vec::with_capacity(2 + items.len() * 3);
    lines.push("WEBVTT".to_string());
    lines.push(String::new());
    for item in items {
        lines.push(format!("{} --> {}", vtt_timestamp(item.start), vtt_timestamp(item.end)));
        lines.push(item.text.clone());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Pretty JSON with two-space indentation
pub fn render_json(items: &[SubtitleItem]) -> Result<String, ConversionError> {
    serde_json::to_string_pretty(items).map_err(|e| ConversionError::ConversionFailed {
        format: SubtitleFormat::Json,
        message: e.to_string(),
    })
}

/// Texts separated by a blank line, nothing after the last one
pub fn render_plain_text(items: &[SubtitleItem]) -> String {
    items.iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `HH:MM:SS,mmm`.
///
/// The item keeps a negative `end` left by a large negative offset; only the
/// rendered time line shows it as `00:00:00,000`. JSON output carries the raw
/// value.
pub fn srt_timestamp(ms: i64) -> String {
    format_timestamp(ms, ',')
}

/// `HH:MM:SS.mmm`, negative values shown as zero like `srt_timestamp`
pub fn vtt_timestamp(ms: i64) -> String {
    format_timestamp(ms, '.')
}
