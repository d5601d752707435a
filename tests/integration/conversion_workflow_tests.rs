/*!
 * Integration tests for end-to-end conversion scenarios
 */

use serde_json::json;
use subconv::subtitle_processor::{ConversionOptions, SubtitleFormat, SubtitleItem, parse_srt_string};
use subconv::transform::filters::{self, FilterChain};
use subconv::{convert, convert_multiple, process};
use crate::common;

/// A transcript goes through every option and comes out in all formats
#[test]
fn test_conversion_workflow_withAllOptions_shouldRenderConsistently() {
    common::init_test_logging();
    let raw = common::sample_transcript();
    let options = ConversionOptions::default()
        .with_timing_offset(1000)
        .with_include_speaker(true)
        .with_merge(Some(500));

    let result = convert_multiple(&raw, &["srt", "vtt", "json", "plain-text"], &options).unwrap();

    let srt = result.get(SubtitleFormat::Srt).unwrap();
    assert_eq!(
        srt,
        "1\n00:00:01,000 --> 00:00:05,000\n[Speaker 0]: Good morning, everyone. [Speaker 0]: Thanks for joining.\n\n\
         2\n00:00:07,000 --> 00:00:10,500\n[Speaker 1]: Happy to\nbe here. [Speaker 1]: Shall we start?\n"
    );

    let vtt = result.get(SubtitleFormat::Vtt).unwrap();
    assert!(vtt.starts_with("WEBVTT\n\n00:00:01.000 --> 00:00:05.000\n"));
    assert_eq!(vtt.matches(" --> ").count(), 2);

    let json_items: Vec<SubtitleItem> = serde_json::from_str(result.get(SubtitleFormat::Json).unwrap()).unwrap();
    assert_eq!(json_items.len(), 2);
    assert_eq!(json_items[1].speaker, Some(1));

    let plain = result.get(SubtitleFormat::PlainText).unwrap();
    assert_eq!(plain.split("\n\n").count(), 2);
}

/// Re-rendering an SRT document through the parser gives the same document back
#[test]
fn test_conversion_workflow_withSrtRoundTrip_shouldBeStable() {
    common::init_test_logging();
    let raw = json!([
        {"start": 1000, "end": 4000, "text": "This is a test subtitle."},
        {"start": 5000, "end": 9000, "text": "It contains\nmultiple lines."}
    ]);

    let first = convert(&raw, "srt", &ConversionOptions::default()).unwrap();
    let parsed = parse_srt_string(&first).unwrap();
    let second = convert(&SubtitleItem::to_raw_array(&parsed), "srt", &ConversionOptions::default()).unwrap();

    assert_eq!(first, second);
}

/// Output never grows and never reorders, whatever the options
#[test]
fn test_conversion_workflow_withOptionMatrix_shouldNeverGrowOrReorder() {
    let raw = json!([
        {"start": 0, "end": 900, "text": "a", "speaker": 0},
        {"start": 950, "end": 1800, "text": " ", "speaker": 0},
        {"start": 5000, "end": 5900, "text": "c", "speaker": 1},
        {"start": 9000, "end": 9500, "text": "d"}
    ]);

    let option_sets = [
        ConversionOptions::default().with_clean_text(true),
        ConversionOptions::default().with_clean_text(true).with_merge(None),
        ConversionOptions::default().with_clean_text(true).with_timing_offset(-3000),
        ConversionOptions::default().with_clean_text(true).with_include_speaker(true).with_merge(Some(0)),
    ];

    for options in option_sets {
        let items = process(&raw, &options).unwrap();
        assert!(items.len() <= 4, "{:?}", options);
        assert!(items.iter().all(|i| i.start >= 0), "{:?}", options);
        assert!(items.windows(2).all(|w| w[0].start <= w[1].start), "{:?}", options);
    }
}

/// Custom post-processing on top of the pipeline through a filter chain
#[test]
fn test_conversion_workflow_withFilterChainPostProcessing_shouldKeepSpeakerTags() {
    let raw = common::sample_transcript();
    let processed = process(&raw, &ConversionOptions::default().with_include_speaker(true)).unwrap();

    let chain = FilterChain::new()
        .with(filters::by_speaker(1))
        .with(filters::replace("[redacted]"));
    let redacted: Vec<SubtitleItem> = chain.apply_all(processed).collect();

    assert_eq!(redacted.len(), 2);
    assert!(redacted.iter().all(|i| i.text == "[Speaker 1]: [redacted]"));
}
