//! Result curation pipeline
//!
//! Turns raw connector entries into the presented list, always in this
//! order:
//!
//! 1. derive submit values
//! 2. keep entries whose key or value match the filter
//! 3. drop repeated values, first occurrence wins
//! 4. stable natural sort by key, reversed for descending order
//! 5. truncate to the result limit
//! 6. mark pre-selected entries

pub mod alphanum;
pub mod selection;

use std::collections::HashSet;

use crate::config::{MAX_RESULTS, QueryConfig};
use crate::error::Result;
use crate::pattern::FullMatch;
use crate::types::{ResultEntry, SelectionMode, SortOrder, SubmitMode};

pub use selection::Selection;

/// Compiled curation settings
#[derive(Debug, Clone)]
pub struct CurationOptions {
    pub submit_mode: SubmitMode,
    /// `None` accepts every entry
    pub filter: Option<FullMatch>,
    pub sort_order: SortOrder,
    /// Always within `1..=MAX_RESULTS`
    limit: usize,
    pub selection: Selection,
    /// Several entries may be pre-selected
    pub multi: bool,
}

impl Default for CurationOptions {
    fn default() -> Self {
        Self {
            submit_mode: SubmitMode::default(),
            filter: None,
            sort_order: SortOrder::default(),
            limit: clamp_limit(crate::config::schema::DEFAULT_RESULTS),
            selection: Selection::default(),
            multi: false,
        }
    }
}

impl CurationOptions {
    /// Compile the display options of a query definition.
    ///
    /// Fails with [`crate::Error::InvalidRegex`] when the filter or the
    /// selection pattern does not compile.
    pub fn from_config(config: &QueryConfig) -> Result<Self> {
        let display = &config.display;

        let filter = display
            .filter_regex
            .as_deref()
            .map(FullMatch::new)
            .transpose()?;

        let selection = match display.select_entry {
            SelectionMode::None => Selection::None,
            SelectionMode::First => Selection::First,
            SelectionMode::Last => Selection::Last,
            SelectionMode::Regex => Selection::Matching(FullMatch::new(&display.select_regex)?),
        };

        Ok(Self {
            submit_mode: display.submit_mode,
            filter,
            sort_order: display.sort_order,
            limit: clamp_limit(display.results_count),
            selection,
            multi: config.multi_select(),
        })
    }

    pub fn with_submit_mode(mut self, submit_mode: SubmitMode) -> Self {
        self.submit_mode = submit_mode;
        self
    }

    pub fn with_filter(mut self, filter: FullMatch) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Set the result limit, clamped into `1..=MAX_RESULTS`.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = clamp_limit(limit);
        self
    }

    pub fn with_selection(mut self, selection: Selection, multi: bool) -> Self {
        self.selection = selection;
        self.multi = multi;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

fn clamp_limit(requested: i64) -> usize {
    let clamped = requested.clamp(1, MAX_RESULTS);
    if clamped != requested {
        tracing::debug!(requested, clamped, "Result limit out of range, clamped");
    }
    // Always in 1..=MAX_RESULTS here.
    clamped as usize
}

/// Run the curation pipeline over raw connector entries.
pub fn curate(entries: Vec<ResultEntry>, options: &CurationOptions) -> Vec<ResultEntry> {
    let total = entries.len();
    let mut seen = HashSet::new();

    let mut curated: Vec<ResultEntry> = entries
        .into_iter()
        .map(|mut entry| {
            match options.submit_mode {
                SubmitMode::KeyValue => {}
                SubmitMode::Key => entry.set_submit_value(entry.key().to_string()),
                SubmitMode::Value => entry.set_submit_value(entry.value().to_string()),
            }
            entry
        })
        .filter(|entry| match &options.filter {
            Some(filter) => filter.is_match(entry.key()) || filter.is_match(entry.value()),
            None => true,
        })
        .filter(|entry| seen.insert(entry.value().to_string()))
        .collect();

    curated.sort_by(|a, b| {
        let ordering = alphanum::compare(a.key(), b.key());
        match options.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    curated.truncate(options.limit);

    selection::mark(&mut curated, &options.selection, options.multi);

    tracing::debug!(total, curated = curated.len(), "Curated entries");
    curated
}
