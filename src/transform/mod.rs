/*!
 * Subtitle transformation.
 *
 * - `filters`: pure single-item transforms, predicates and the filter chain
 * - `pipeline`: validation plus the fixed transform order and merging
 */

pub mod filters;
pub mod pipeline;

pub use filters::{FilterChain, FilterOutcome, SubtitleFilter, TextCase};
pub use pipeline::{Pipeline, merge_adjacent, process};
