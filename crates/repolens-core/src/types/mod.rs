//! Shared core types used across connectors, curation and the query boundary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Separator between key and value in the default submit value.
pub const SUBMIT_SEPARATOR: char = ';';

/// One normalized record returned by a repository connector.
///
/// `key` and `value` are fixed at construction. Only the curation pipeline
/// touches `submit_value` and `selected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    key: String,
    value: String,
    submit_value: String,
    selected: bool,
}

impl ResultEntry {
    /// Create an unselected entry whose submit value is `key;value`.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        let submit_value = format!("{key}{SUBMIT_SEPARATOR}{value}");
        Self {
            key,
            value,
            submit_value,
            selected: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn submit_value(&self) -> &str {
        &self.submit_value
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_submit_value(&mut self, submit_value: String) {
        self.submit_value = submit_value;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

/// What a connector is asked to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMode {
    /// Artifact paths matching the artifact name
    Path,
    /// Versions extracted from artifact paths
    Version,
    /// Repository listing
    Repository,
    /// Repository listing used only to validate reachability and credentials
    ConnectivityTest,
}

impl QueryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryMode::Path => "path",
            QueryMode::Version => "version",
            QueryMode::Repository => "repository",
            QueryMode::ConnectivityTest => "test",
        }
    }
}

impl FromStr for QueryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "path" => Ok(QueryMode::Path),
            "version" => Ok(QueryMode::Version),
            "repository" => Ok(QueryMode::Repository),
            "test" | "connectivity-test" => Ok(QueryMode::ConnectivityTest),
            other => Err(Error::unknown_query_mode(other)),
        }
    }
}

/// Sort direction applied to the curated keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Which entries are pre-selected after curation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    None,
    First,
    Last,
    Regex,
}

/// What ends up in `submit_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitMode {
    /// Keep the `key;value` composite produced by the connector
    #[default]
    KeyValue,
    /// Submit the label only
    Key,
    /// Submit the value (path or URL) only
    Value,
}

/// How the curated entries are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    #[default]
    Dropdown,
    Radio,
    Checkbox,
    List,
}

impl DisplayStyle {
    /// Whether several entries may be selected at once.
    pub fn allows_multiple(self) -> bool {
        matches!(self, DisplayStyle::Checkbox | DisplayStyle::List)
    }
}
