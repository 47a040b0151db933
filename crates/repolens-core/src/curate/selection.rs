//! Pre-selection of curated entries.

use crate::pattern::FullMatch;
use crate::types::ResultEntry;

/// Resolved pre-selection rule
#[derive(Debug, Clone, Default)]
pub enum Selection {
    #[default]
    None,
    First,
    Last,
    /// Entries whose key or value fully match
    Matching(FullMatch),
}

/// Mark entries as selected in place.
///
/// `Matching` stops after the first hit unless `multi` is set. Entries are
/// only ever marked, never unmarked.
pub fn mark(entries: &mut [ResultEntry], selection: &Selection, multi: bool) {
    match selection {
        Selection::None => {}
        Selection::First => {
            if let Some(entry) = entries.first_mut() {
                entry.set_selected(true);
            }
        }
        Selection::Last => {
            if let Some(entry) = entries.last_mut() {
                entry.set_selected(true);
            }
        }
        Selection::Matching(pattern) => {
            for entry in entries.iter_mut() {
                if pattern.is_match(entry.key()) || pattern.is_match(entry.value()) {
                    entry.set_selected(true);
                    if !multi {
                        break;
                    }
                }
            }
        }
    }
}
