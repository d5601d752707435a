/*!
 * Validation module for incoming subtitle data.
 *
 * - `items`: fail-fast structural and timing validation of raw items
 */

pub mod items;

// Re-export main functions
pub use items::{validate, validate_items, MAX_TIMING_MS};
