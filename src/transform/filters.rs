/*!
 * Single-item subtitle transforms and predicates.
 *
 * Every transform consumes an item and returns a new one. Predicates return a
 * `FilterOutcome` so a chain can drop items without overloading `Option`
 * semantics in the middle of a pipeline.
 *
 * Filters compose through `FilterChain`, which applies them in insertion order
 * and drops the item at the first rejection.
 */

use regex::Regex;
use once_cell::sync::Lazy;

use crate::subtitle_processor::SubtitleItem;
use crate::validation::items::check_item;

/// Leading speaker tag added by `annotate_speaker`
static SPEAKER_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[Speaker \d+\]: ").unwrap()
});

/// Runs of whitespace other than line breaks
static INLINE_WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\S\n]+").unwrap()
});

/// Spaces hugging a line break
static SPACED_NEWLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" ?\n ?").unwrap()
});

/// Result of applying a filter to one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Keep the (possibly transformed) item
    Keep(SubtitleItem),
    /// Remove the item from the output sequence
    Drop,
}

impl FilterOutcome {
    /// Keep `item` when `keep` holds, drop it otherwise
    pub fn keep_if(item: SubtitleItem, keep: bool) -> Self {
        if keep { Self::Keep(item) } else { Self::Drop }
    }

    pub fn into_option(self) -> Option<SubtitleItem> {
        match self {
            Self::Keep(item) => Some(item),
            Self::Drop => None,
        }
    }

    pub fn is_kept(&self) -> bool {
        matches!(self, Self::Keep(_))
    }
}

/// A composable single-item filter
pub trait SubtitleFilter: Send + Sync {
    /// Transform or reject one item
    fn apply(&self, item: SubtitleItem) -> FilterOutcome;
}

impl<F> SubtitleFilter for F
where
    F: Fn(SubtitleItem) -> FilterOutcome + Send + Sync,
{
    fn apply(&self, item: SubtitleItem) -> FilterOutcome {
        self(item)
    }
}

/// Ordered list of filters applied to each item
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn SubtitleFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter; filters run in the order they were added
    pub fn with<F: SubtitleFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Append a filter only when `enabled` holds
    pub fn with_if<F: SubtitleFilter + 'static>(self, enabled: bool, filter: F) -> Self {
        if enabled { self.with(filter) } else { self }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter over `item`; `None` when any filter drops it
    pub fn apply(&self, item: SubtitleItem) -> Option<SubtitleItem> {
        let mut current = item;
        for filter in &self.filters {
            match filter.apply(current) {
                FilterOutcome::Keep(next) => current = next,
                FilterOutcome::Drop => return None,
            }
        }
        Some(current)
    }

    /// Lazily apply the chain to a sequence, keeping input order
    pub fn apply_all<'a, I>(&'a self, items: I) -> impl Iterator<Item = SubtitleItem> + 'a
    where
        I: IntoIterator<Item = SubtitleItem>,
        I::IntoIter: 'a,
    {
        items.into_iter().filter_map(move |item| self.apply(item))
    }
}

// Plain transforms

/// Shift timing by `delta_ms`. Start is clamped at zero, end is not.
///
/// Sums saturate at the `i64` bounds.
pub fn offset_timing(item: SubtitleItem, delta_ms: i64) -> SubtitleItem {
    SubtitleItem {
        start: item.start.saturating_add(delta_ms).max(0),
        end: item.end.saturating_add(delta_ms),
        ..item
    }
}

/// Normalize whitespace in the item text
pub fn clean_text(item: SubtitleItem) -> SubtitleItem {
    let text = normalize_whitespace(&item.text);
    SubtitleItem { text, ..item }
}

/// Collapse inline whitespace runs, strip spaces around line breaks, trim
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = INLINE_WHITESPACE_REGEX.replace_all(text.trim(), " ");
    SPACED_NEWLINE_REGEX.replace_all(&collapsed, "\n").into_owned()
}

/// Prefix the text with `[Speaker N]: ` when enabled and a speaker is known
pub fn annotate_speaker(item: SubtitleItem, enabled: bool) -> SubtitleItem {
    match (enabled, item.speaker) {
        (true, Some(speaker)) => {
            let text = format!("[Speaker {}]: {}", speaker, item.text);
            SubtitleItem { text, ..item }
        }
        _ => item,
    }
}

/// Split `text` into its speaker tag (if any) and the body after it
pub fn split_speaker_tag(text: &str) -> (&str, &str) {
    match SPEAKER_TAG_REGEX.find(text) {
        Some(tag) => text.split_at(tag.end()),
        None => ("", text),
    }
}

/// Rewrite the body of the text, leaving a speaker tag untouched
fn map_body(item: SubtitleItem, f: impl FnOnce(&str) -> String) -> SubtitleItem {
    let (tag, body) = split_speaker_tag(&item.text);
    let text = format!("{}{}", tag, f(body));
    SubtitleItem { text, ..item }
}

/// Replace the text, keeping an existing speaker tag
pub fn replace_text(item: SubtitleItem, new_text: &str) -> SubtitleItem {
    map_body(item, |_| new_text.to_string())
}

/// Prepend `prefix` and a space to the body
pub fn add_prefix(item: SubtitleItem, prefix: &str) -> SubtitleItem {
    map_body(item, |body| format!("{} {}", prefix, body))
}

/// Append a space and `suffix` to the text
pub fn add_suffix(item: SubtitleItem, suffix: &str) -> SubtitleItem {
    let text = format!("{} {}", item.text, suffix);
    SubtitleItem { text, ..item }
}

/// Letter case applied by `change_case`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Upper,
    Lower,
}

/// Change the case of the body, keeping a speaker tag verbatim
pub fn change_case(item: SubtitleItem, case: TextCase) -> SubtitleItem {
    map_body(item, |body| match case {
        TextCase::Upper => body.to_uppercase(),
        TextCase::Lower => body.to_lowercase(),
    })
}

// Predicates

pub fn filter_by_speaker(item: SubtitleItem, speaker: u32) -> FilterOutcome {
    let keep = item.speaker == Some(speaker);
    FilterOutcome::keep_if(item, keep)
}

pub fn filter_by_speakers(item: SubtitleItem, speakers: &[u32]) -> FilterOutcome {
    let keep = item.speaker.is_some_and(|s| speakers.contains(&s));
    FilterOutcome::keep_if(item, keep)
}

/// Keep items whose duration lies in `[min_ms, max_ms]`
pub fn filter_by_duration(item: SubtitleItem, min_ms: i64, max_ms: i64) -> FilterOutcome {
    let duration = item.duration_ms();
    let keep = duration >= min_ms && duration <= max_ms;
    FilterOutcome::keep_if(item, keep)
}

/// Keep items overlapping `[range_start, range_end)`
pub fn filter_by_time_range(item: SubtitleItem, range_start: i64, range_end: i64) -> FilterOutcome {
    let keep = item.start < range_end && item.end > range_start;
    FilterOutcome::keep_if(item, keep)
}

pub fn remove_empty(item: SubtitleItem) -> FilterOutcome {
    let keep = !item.text.trim().is_empty();
    FilterOutcome::keep_if(item, keep)
}

/// Per-item form of the validator rules (empty text rejected)
pub fn validate_subtitle(item: SubtitleItem) -> FilterOutcome {
    let keep = check_item(0, &item, false).is_ok();
    FilterOutcome::keep_if(item, keep)
}

// Chainable constructors

pub fn offset(delta_ms: i64) -> impl SubtitleFilter {
    move |item: SubtitleItem| FilterOutcome::Keep(offset_timing(item, delta_ms))
}

pub fn clean() -> impl SubtitleFilter {
    |item: SubtitleItem| FilterOutcome::Keep(clean_text(item))
}

pub fn speaker_annotation(enabled: bool) -> impl SubtitleFilter {
    move |item: SubtitleItem| FilterOutcome::Keep(annotate_speaker(item, enabled))
}

pub fn replace(new_text: impl Into<String>) -> impl SubtitleFilter {
    let new_text = new_text.into();
    move |item: SubtitleItem| FilterOutcome::Keep(replace_text(item, &new_text))
}

pub fn prefix(prefix: impl Into<String>) -> impl SubtitleFilter {
    let prefix = prefix.into();
    move |item: SubtitleItem| FilterOutcome::Keep(add_prefix(item, &prefix))
}

pub fn suffix(suffix: impl Into<String>) -> impl SubtitleFilter {
    let suffix = suffix.into();
    move |item: SubtitleItem| FilterOutcome::Keep(add_suffix(item, &suffix))
}

pub fn case(case: TextCase) -> impl SubtitleFilter {
    move |item: SubtitleItem| FilterOutcome::Keep(change_case(item, case))
}

pub fn by_speaker(speaker: u32) -> impl SubtitleFilter {
    move |item: SubtitleItem| filter_by_speaker(item, speaker)
}

pub fn by_speakers(speakers: Vec<u32>) -> impl SubtitleFilter {
    move |item: SubtitleItem| filter_by_speakers(item, &speakers)
}

pub fn by_duration(min_ms: i64, max_ms: i64) -> impl SubtitleFilter {
    move |item: SubtitleItem| filter_by_duration(item, min_ms, max_ms)
}

pub fn by_time_range(range_start: i64, range_end: i64) -> impl SubtitleFilter {
    move |item: SubtitleItem| filter_by_time_range(item, range_start, range_end)
}

pub fn non_empty() -> impl SubtitleFilter {
    remove_empty
}

pub fn valid() -> impl SubtitleFilter {
    validate_subtitle
}
