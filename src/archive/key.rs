//! Identity keys used for archive deduplication.

/// Separator between key components. Not expected in subjects or headlines.
pub const KEY_SEPARATOR: &str = "__";

/// Number of leading timestamp characters that make up the calendar day
/// (`YYYY-MM-DD` of an ISO-8601 timestamp).
const DAY_PREFIX_CHARS: usize = 10;

/// Calendar-day prefix of an ISO-8601 timestamp. Shorter strings are
/// returned whole.
pub fn day_of(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(DAY_PREFIX_CHARS) {
        Some((end, _)) => &timestamp[..end],
        None => timestamp,
    }
}

/// Derive the case-insensitive identity key for an item.
///
/// Two items are the same archive entry iff their keys are equal. The
/// timestamp is coarsened to the day so repeated generations for the same
/// subject and headline on one day collapse into one entry.
pub fn derive_key(subject: &str, created_at: &str, headline: &str) -> String {
    format!(
        "{subject}{KEY_SEPARATOR}{day}{KEY_SEPARATOR}{headline}",
        day = day_of(created_at)
    )
    .to_lowercase()
}
