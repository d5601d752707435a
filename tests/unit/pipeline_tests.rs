/*!
 * Tests for the processing pipeline and adjacency merging
 */

use serde_json::json;
use subconv::errors::ConversionError;
use subconv::subtitle_processor::{ConversionOptions, SubtitleItem};
use subconv::transform::{merge_adjacent, process, Pipeline};
use crate::common;

#[test]
fn test_process_withTimingOffset_shouldShiftItem() {
    let raw = json!([{"start": 0, "end": 5000, "text": "X"}]);
    let options = ConversionOptions::default().with_timing_offset(1000);

    let items = process(&raw, &options).unwrap();

    assert_eq!(items, vec![SubtitleItem::new(1000, 6000, "X")]);
}

#[test]
fn test_process_withNegativeOffset_shouldNeverProduceNegativeStart() {
    let raw = json!([
        {"start": 100, "end": 5000, "text": "a"},
        {"start": 6000, "end": 9000, "text": "b"}
    ]);
    let options = ConversionOptions::default().with_timing_offset(-2000);

    let items = process(&raw, &options).unwrap();

    assert!(items.iter().all(|i| i.start >= 0));
    assert_eq!(items[0], SubtitleItem::new(0, 3000, "a"));
    assert_eq!(items[1], SubtitleItem::new(4000, 7000, "b"));
}

#[test]
fn test_process_withDefaults_shouldCleanText() {
    let raw = json!([{"start": 0, "end": 1000, "text": "  spaced    out  "}]);

    let items = process(&raw, &ConversionOptions::default()).unwrap();

    assert_eq!(items[0].text, "spaced out");
}

#[test]
fn test_process_withCleanDisabled_shouldKeepTextVerbatim() {
    let raw = json!([{"start": 0, "end": 1000, "text": "  spaced    out  "}]);
    let options = ConversionOptions::default().with_clean_text(false);

    let items = process(&raw, &options).unwrap();

    assert_eq!(items[0].text, "  spaced    out  ");
}

#[test]
fn test_process_withCleanExplicitlyEnabled_shouldDropEmptyItems() {
    let raw = json!([
        {"start": 0, "end": 1000, "text": "first"},
        {"start": 1000, "end": 2000, "text": "   "},
        {"start": 2000, "end": 3000, "text": "third"}
    ]);

    let items = process(&raw, &ConversionOptions::default().with_clean_text(true)).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].text, "third");

    // Without the explicit flag, empty text is a validation error
    let err = process(&raw, &ConversionOptions::default()).unwrap_err();
    assert!(matches!(err, ConversionError::InvalidData { index: Some(1), .. }));
}

#[test]
fn test_process_withSpeakerAnnotation_shouldApplyAfterCleaning() {
    let raw = json!([{"start": 0, "end": 1000, "text": "   hi   there ", "speaker": 7}]);
    let options = ConversionOptions::default().with_include_speaker(true);

    let items = process(&raw, &options).unwrap();

    assert_eq!(items[0].text, "[Speaker 7]: hi there");
    assert_eq!(items[0].speaker, Some(7));
}

#[test]
fn test_process_withInvalidData_shouldShortCircuit() {
    let raw = json!([{"start": -1000, "end": 5000, "text": "bad"}]);

    let err = process(&raw, &ConversionOptions::default().with_timing_offset(5000)).unwrap_err();

    assert!(matches!(err, ConversionError::InvalidTiming { index: Some(0), .. }));
}

#[test]
fn test_process_withMerge_shouldCollapseTouchingItems() {
    let raw = json!([
        {"start": 0, "end": 1000, "text": "one"},
        {"start": 1000, "end": 2000, "text": "two"},
        {"start": 2000, "end": 3000, "text": "three"}
    ]);
    let options = ConversionOptions::default().with_merge(Some(1000));

    let items = process(&raw, &options).unwrap();

    assert_eq!(items, vec![SubtitleItem::new(0, 3000, "one two three")]);
}

#[test]
fn test_process_withMergeDefaultThreshold_shouldUseOneSecond() {
    let raw = json!([
        {"start": 0, "end": 1000, "text": "a"},
        {"start": 2000, "end": 3000, "text": "b"},
        {"start": 4001, "end": 5000, "text": "c"}
    ]);
    let options = ConversionOptions::default().with_merge(None);

    let items = process(&raw, &options).unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0], SubtitleItem::new(0, 3000, "a b"));
    assert_eq!(items[1], SubtitleItem::new(4001, 5000, "c"));
}

#[test]
fn test_process_withSampleTranscript_shouldPreserveOrderAndShrinkOnlyByMerge() {
    let raw = common::sample_transcript();
    let plain = process(&raw, &ConversionOptions::default()).unwrap();
    let merged = process(&raw, &ConversionOptions::default().with_merge(Some(500))).unwrap();

    assert_eq!(plain.len(), 4);
    assert!(plain.windows(2).all(|w| w[0].start <= w[1].start));
    assert_eq!(plain[2].text, "Happy to\nbe here.");

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].text, "Good morning, everyone. Thanks for joining.");
    assert_eq!(merged[0].speaker, Some(0));
    assert_eq!(merged[1].speaker, Some(1));
}

#[test]
fn test_mergeAdjacent_withDifferentSpeakers_shouldClearSpeaker() {
    let items = vec![
        SubtitleItem::with_speaker(0, 1000, "hello", 1),
        SubtitleItem::with_speaker(1200, 2000, "there", 2),
    ];

    let merged = merge_adjacent(items, 1000);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].speaker, None);
    assert_eq!(merged[0].text, "hello there");
}

#[test]
fn test_mergeAdjacent_withLargeGap_shouldKeepSeparate() {
    let items = vec![
        SubtitleItem::new(0, 1000, "a"),
        SubtitleItem::new(2001, 3000, "b"),
    ];

    let merged = merge_adjacent(items.clone(), 1000);

    assert_eq!(merged, items);
}

#[test]
fn test_mergeAdjacent_withShortInputs_shouldPassThrough() {
    assert!(merge_adjacent(Vec::new(), 1000).is_empty());

    let single = vec![SubtitleItem::new(0, 1000, "solo")];
    assert_eq!(merge_adjacent(single.clone(), 1000), single);
}

#[test]
fn test_pipelineStream_shouldBeLazyAndOrdered() {
    let pipeline = Pipeline::new(ConversionOptions::default().with_timing_offset(10));
    let items = vec![
        SubtitleItem::new(0, 100, " a "),
        SubtitleItem::new(100, 200, " b "),
        SubtitleItem::new(200, 300, " c "),
    ];

    let mut stream = pipeline.stream(items);

    assert_eq!(stream.next(), Some(SubtitleItem::new(10, 110, "a")));
    let rest: Vec<String> = stream.map(|i| i.text).collect();
    assert_eq!(rest, vec!["b", "c"]);
}

#[test]
fn test_pipeline_processItems_withTypedItems_shouldMatchRawProcessing() {
    let items = vec![
        SubtitleItem::with_speaker(0, 1000, "x", 1),
        SubtitleItem::with_speaker(1000, 2000, "y", 1),
    ];
    let pipeline = Pipeline::new(ConversionOptions::default().with_merge(None));

    let typed = pipeline.process_items(items.clone()).unwrap();
    let raw = pipeline.process(&SubtitleItem::to_raw_array(&items)).unwrap();

    assert_eq!(typed, raw);
    assert_eq!(typed, vec![SubtitleItem::with_speaker(0, 2000, "x y", 1)]);
}

#[test]
fn test_process_withOverflowingOffset_shouldFailWithoutPanicking() {
    let raw = json!([{"start": 0, "end": 1000, "text": "X"}]);

    for delta in [i64::MAX, i64::MAX - 500] {
        let err = process(&raw, &ConversionOptions::default().with_timing_offset(delta)).unwrap_err();
        assert!(
            matches!(err, ConversionError::ProcessingFailed { ref step, .. } if step == "timing offset"),
            "{:?}",
            err
        );
        assert_eq!(err.status_code(), 500);
    }
}

#[test]
fn test_pipelineStream_withOverflowingOffset_shouldSaturate() {
    let pipeline = Pipeline::new(ConversionOptions::default().with_timing_offset(i64::MAX));

    let items: Vec<SubtitleItem> = pipeline.stream(vec![SubtitleItem::new(10, 1000, "X")]).collect();

    assert_eq!(items[0].start, i64::MAX);
    assert_eq!(items[0].end, i64::MAX);
}

#[test]
fn test_mergeAdjacent_withExtremeTimings_shouldNotOverflow() {
    let items = vec![
        SubtitleItem::new(0, i64::MIN, "a"),
        SubtitleItem::new(i64::MAX - 1, i64::MAX, "b"),
    ];

    let merged = merge_adjacent(items, 1000);

    assert_eq!(merged.len(), 2);
}
