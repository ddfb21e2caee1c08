//! Free-text faculty name normalization.
//!
//! The dashboard accepts names as `"First Last, First Last"` while the
//! document store keys faculty by `"Last,First"`. Entries that do not split
//! into exactly two tokens cannot be mapped and are rejected individually;
//! the rest of the batch still goes through.

/// A name entry that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedName {
    /// The trimmed entry as typed.
    pub input: String,
    /// Number of whitespace-separated tokens found (anything but 2 is rejected).
    pub tokens: usize,
}

/// Outcome of normalizing a comma-separated list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameBatch {
    /// Canonical `"Last,First"` keys, in input order.
    pub accepted: Vec<String>,
    pub rejected: Vec<RejectedName>,
}

impl NameBatch {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Build the stored key for a faculty member.
pub fn canonical_name(first: &str, last: &str) -> String {
    format!("{last},{first}")
}

/// Split `input` on commas and normalize each `"First Last"` entry.
///
/// Blank entries (e.g. a trailing comma) are skipped without being reported.
pub fn parse_faculty_names(input: &str) -> NameBatch {
    let mut batch = NameBatch::default();

    for entry in input.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = entry.split_whitespace().collect();
        match tokens.as_slice() {
            [first, last] => batch.accepted.push(canonical_name(first, last)),
            _ => batch.rejected.push(RejectedName {
                input: entry.to_string(),
                tokens: tokens.len(),
            }),
        }
    }

    batch
}
