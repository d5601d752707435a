/*!
 * Processing pipeline: validation, the fixed per-item transform order, and
 * adjacency merging.
 *
 * Per-item stage order is part of the output contract:
 * 1. timing offset
 * 2. whitespace cleaning
 * 3. speaker annotation
 *
 * The per-item stage is available as a lazy iterator. Merging looks back at
 * the previously accumulated item, so it always runs as a separate eager pass.
 */

use log::debug;
use serde_json::Value;

use crate::errors::ConversionError;
use crate::subtitle_processor::{ConversionOptions, SubtitleItem};
use crate::validation;

use super::filters::{self, FilterChain};

/// Pipeline configured from one set of conversion options
pub struct Pipeline {
    options: ConversionOptions,
    chain: FilterChain,
}

impl Pipeline {
    /// Build the per-item filter chain for `options`
    pub fn new(options: ConversionOptions) -> Self {
        let clean = options.clean_text != Some(false);
        let drop_empty = options.clean_text == Some(true);
        let include_speaker = options.include_speaker == Some(true);

        let mut chain = FilterChain::new();
        if let Some(delta) = options.timing_offset {
            chain = chain.with(filters::offset(delta));
        }
        let chain = chain
            .with_if(clean, filters::clean())
            .with_if(include_speaker, filters::speaker_annotation(true))
            .with_if(drop_empty, filters::non_empty());

        Self { options, chain }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Empty text passes validation only when cleaning was explicitly requested
    pub fn allows_empty_text(&self) -> bool {
        self.options.clean_text == Some(true)
    }

    /// Validate, transform and optionally merge a raw payload
    pub fn process(&self, raw: &Value) -> Result<Vec<SubtitleItem>, ConversionError> {
        let validated = validation::validate(raw, self.allows_empty_text())?;
        self.process_validated(validated)
    }

    /// Same as `process` for items that are already typed
    pub fn process_items(&self, items: Vec<SubtitleItem>) -> Result<Vec<SubtitleItem>, ConversionError> {
        validation::validate_items(&items, self.allows_empty_text())?;
        self.process_validated(items)
    }

    fn process_validated(&self, validated: Vec<SubtitleItem>) -> Result<Vec<SubtitleItem>, ConversionError> {
        self.check_offset(&validated)?;

        let input_count = validated.len();
        let transformed: Vec<SubtitleItem> = self.stream(validated).collect();
        debug!("Transformed {} of {} subtitle items", transformed.len(), input_count);

        if self.options.merge_adjacent == Some(true) {
            let threshold = self.options.effective_merge_threshold();
            let merged = merge_adjacent(transformed, threshold);
            debug!("Merged into {} subtitle items (threshold {}ms)", merged.len(), threshold);
            Ok(merged)
        } else {
            Ok(transformed)
        }
    }

    fn check_offset(&self, items: &[SubtitleItem]) -> Result<(), ConversionError> {
        let Some(delta) = self.options.timing_offset else {
            return Ok(());
        };

        let overflowing = items.iter().position(|item| {
            item.start.checked_add(delta).is_none() || item.end.checked_add(delta).is_none()
        });
        match overflowing {
            Some(index) => Err(ConversionError::ProcessingFailed {
                step: "timing offset".to_string(),
                message: format!("offset of {}ms overflows the timing of item {}", delta, index),
            }),
            None => Ok(()),
        }
    }

    /// Lazily apply the per-item stage to validated items.
    ///
    /// The iterator is finite, preserves input order and is consumed once.
    /// Merging is not part of it.
    pub fn stream<'a, I>(&'a self, items: I) -> impl Iterator<Item = SubtitleItem> + 'a
    where
        I: IntoIterator<Item = SubtitleItem>,
        I::IntoIter: 'a,
    {
        self.chain.apply_all(items)
    }
}

/// Validate, transform and optionally merge `raw` under `options`
pub fn process(raw: &Value, options: &ConversionOptions) -> Result<Vec<SubtitleItem>, ConversionError> {
    Pipeline::new(options.clone()).process(raw)
}

/// Merge consecutive items whose gap is at most `threshold_ms`.
///
/// Single left-to-right sweep: a merged group is only ever compared with its
/// immediate successor. Speaker survives a merge only when both sides agree.
pub fn merge_adjacent(items: Vec<SubtitleItem>, threshold_ms: i64) -> Vec<SubtitleItem> {
    if items.len() <= 1 {
        return items;
    }

    let mut merged = Vec::with_capacity(items.len());
    let mut iter = items.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };

    for next in iter {
        let gap = next.start.saturating_sub(current.end);
        if gap <= threshold_ms {
            current.end = next.end;
            current.text.push(' ');
            current.text.push_str(&next.text);
            if current.speaker != next.speaker {
                current.speaker = None;
            }
        } else {
            merged.push(std::mem::replace(&mut current, next));
        }
    }
    merged.push(current);

    merged
}
