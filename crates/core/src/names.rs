//! Parsing of the comma-separated name field submitted by the web form.

use crate::error::CoreError;

/// Split a raw form value into an ordered list of names.
///
/// Entries are trimmed; empty or whitespace-only entries are dropped.
/// Input order is preserved and determines slide order in the deck.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate that a parsed name list can drive a generation run.
///
/// A list that came out empty after trimming would produce a zero-slide
/// deck, so it is rejected up front instead of being handed to the pipeline.
pub fn validate_name_list(names: &[String]) -> Result<(), CoreError> {
    if names.is_empty() {
        return Err(CoreError::Validation(
            "Name list must contain at least one non-empty name".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
