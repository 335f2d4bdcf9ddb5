//! Feed core: pure calendar feed normalization and filtering.
//!
//! Everything here is a function of its input text. No I/O, no clocks.
mod error;
mod filter;
mod marker;
mod parse;
mod text;
mod types;

pub use error::StructuralError;
pub use filter::FilterRule;
pub use marker::{CALENDAR_BEGIN, CALENDAR_END, ENTRY_BEGIN, ENTRY_END};
pub use parse::{parse_feed, split_entries, SplitEntries};
pub use text::{normalize_line_endings, unfold, unfolded_lines, OUTPUT_LINE_ENDING};
pub use types::{CalendarWrapper, CleanedFeed, Entry, ExcludedEntry, FilterReport, ParsedFeed};

/// Parse `raw`, drop every entry matched by `rules` and return the cleaned feed.
///
/// Fails only when the calendar envelope itself is missing or misordered;
/// corrupt entries are dropped and counted in the report instead.
pub fn normalize_and_filter(raw: &str, rules: &FilterRule) -> Result<CleanedFeed, StructuralError> {
    let parsed = parse_feed(raw)?;
    Ok(parsed.filter(rules))
}
