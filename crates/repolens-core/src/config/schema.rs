//! Configuration schema for repolens.toml
//!
//! A file holds one query definition split into three sections:
//! - `[server]`: which backend to talk to and how to connect
//! - `[query]`: what to fetch from it
//! - `[display]`: how the fetched entries are curated and presented
//!
//! plus an optional `[credentials.<id>]` store referenced by identifier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::credentials::CredentialEntry;
use crate::error::Result;
use crate::types::{DisplayStyle, QueryMode, SelectionMode, SortOrder, SubmitMode};

/// Upper bound for the number of curated entries.
pub const MAX_RESULTS: i64 = 50;

/// Number of curated entries when nothing is configured.
pub const DEFAULT_RESULTS: i64 = 10;

/// Root structure of repolens.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepolensConfig {
    /// The query definition
    #[serde(flatten)]
    pub query: QueryConfig,

    /// Credential store keyed by credentials id
    #[serde(default)]
    pub credentials: HashMap<String, CredentialEntry>,
}

/// Immutable definition of one query against one repository server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub server: ServerConfig,

    #[serde(default)]
    pub query: QueryOptions,

    #[serde(default)]
    pub display: DisplayOptions,
}

/// Connection options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Backend identifier: "artifactory" or "nexus"
    pub r#type: String,

    /// Base URL of the server, e.g. https://repo.example.com/artifactory
    pub url: String,

    /// Credentials used to authenticate against the server
    #[serde(default)]
    pub credentials_id: String,

    /// Accept self-signed or otherwise invalid certificates
    #[serde(default)]
    pub ignore_certificate: bool,

    /// Explicit proxy, takes precedence over the system proxy
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

/// Explicit proxy block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_protocol")]
    pub protocol: String,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub port: Option<u32>,

    /// Credentials used to authenticate against the proxy
    #[serde(default)]
    pub credentials_id: String,
}

fn default_proxy_protocol() -> String {
    "http".to_string()
}

impl ProxyConfig {
    /// A proxy is only routed through when protocol, host and port are all set.
    pub fn is_active(&self) -> bool {
        !self.protocol.trim().is_empty() && !self.host.trim().is_empty() && self.port.is_some()
    }
}

/// API options
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueryOptions {
    /// Query mode: path, version, repository or test
    #[serde(default)]
    pub mode: String,

    /// Artifact name pattern as understood by the backend search
    #[serde(default)]
    pub artifact_name: String,

    /// Restrict artifact searches to this repository
    #[serde(default)]
    pub repo_name: String,

    /// Regex with one capture group extracting the version from a path
    #[serde(default)]
    pub version_regex: String,

    #[serde(default)]
    pub repo_types: RepoTypes,

    #[serde(default)]
    pub format_types: FormatTypes,
}

/// Accepted repository classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTypes {
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub r#virtual: bool,
}

impl Default for RepoTypes {
    fn default() -> Self {
        Self {
            local: true,
            remote: false,
            r#virtual: false,
        }
    }
}

impl RepoTypes {
    pub fn all() -> Self {
        Self {
            local: true,
            remote: true,
            r#virtual: true,
        }
    }
}

/// Accepted repository formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatTypes {
    #[serde(default)]
    pub maven: bool,
    #[serde(default)]
    pub npm: bool,
    #[serde(default)]
    pub pypi: bool,
    #[serde(default)]
    pub docker: bool,
    /// Any format that is none of the above
    #[serde(default)]
    pub other: bool,
}

impl Default for FormatTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl FormatTypes {
    pub fn all() -> Self {
        Self {
            maven: true,
            npm: true,
            pypi: true,
            docker: true,
            other: true,
        }
    }
}

/// Display options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default)]
    pub style: DisplayStyle,

    /// Maximum number of entries, 1 to 50
    #[serde(default = "default_results_count")]
    pub results_count: i64,

    /// Entries whose key and value both fail this pattern are dropped
    #[serde(default)]
    pub filter_regex: Option<String>,

    #[serde(default)]
    pub sort_order: SortOrder,

    #[serde(default)]
    pub select_entry: SelectionMode,

    /// Pattern used by `select_entry = "regex"`
    #[serde(default)]
    pub select_regex: String,

    #[serde(default)]
    pub submit_mode: SubmitMode,
}

fn default_results_count() -> i64 {
    DEFAULT_RESULTS
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            style: DisplayStyle::default(),
            results_count: DEFAULT_RESULTS,
            filter_regex: None,
            sort_order: SortOrder::default(),
            select_entry: SelectionMode::default(),
            select_regex: String::new(),
            submit_mode: SubmitMode::default(),
        }
    }
}

impl QueryConfig {
    /// Build the definition used by a connection test: repository listing
    /// over every repo type and format, nothing pre-selected.
    pub fn connection_test(server: ServerConfig) -> Self {
        Self {
            server,
            query: QueryOptions {
                mode: QueryMode::ConnectivityTest.as_str().to_string(),
                repo_types: RepoTypes::all(),
                format_types: FormatTypes::all(),
                ..QueryOptions::default()
            },
            display: DisplayOptions::default(),
        }
    }

    /// Parse the configured query mode.
    pub fn query_mode(&self) -> Result<QueryMode> {
        self.query.mode.parse()
    }

    /// Whether the display style allows several selected entries.
    pub fn multi_select(&self) -> bool {
        self.display.style.allows_multiple()
    }

    /// Trim every free-text field in place.
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.server.r#type);
        trim_in_place(&mut self.server.url);
        trim_in_place(&mut self.server.credentials_id);
        if let Some(proxy) = self.server.proxy.as_mut() {
            trim_in_place(&mut proxy.protocol);
            trim_in_place(&mut proxy.host);
            trim_in_place(&mut proxy.credentials_id);
        }
        trim_in_place(&mut self.query.mode);
        trim_in_place(&mut self.query.artifact_name);
        trim_in_place(&mut self.query.repo_name);
        trim_in_place(&mut self.query.version_regex);
        trim_in_place(&mut self.display.select_regex);
        self.display.filter_regex = self
            .display
            .filter_regex
            .take()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> ServerConfig {
        ServerConfig {
            r#type: "nexus".to_string(),
            url: "https://nexus.example.com".to_string(),
            credentials_id: "ci".to_string(),
            ignore_certificate: false,
            proxy: None,
        }
    }

    #[test]
    fn test_defaults_follow_form_defaults() {
        let repo_types = RepoTypes::default();
        assert!(repo_types.local);
        assert!(!repo_types.remote);
        assert!(!repo_types.r#virtual);

        let formats = FormatTypes::default();
        assert!(formats.maven && formats.npm && formats.pypi && formats.docker && formats.other);

        let display = DisplayOptions::default();
        assert_eq!(display.results_count, DEFAULT_RESULTS);
        assert_eq!(display.select_entry, SelectionMode::None);
    }

    #[test]
    fn test_connection_test_config() {
        let config = QueryConfig::connection_test(server());
        assert_eq!(config.query_mode().unwrap(), QueryMode::ConnectivityTest);
        assert_eq!(config.query.repo_types, RepoTypes::all());
        assert_eq!(config.query.format_types, FormatTypes::all());
        assert_eq!(config.display.select_entry, SelectionMode::None);
    }

    #[test]
    fn test_proxy_is_active() {
        let mut proxy = ProxyConfig {
            protocol: "http".to_string(),
            host: "proxy.local".to_string(),
            port: Some(3128),
            credentials_id: String::new(),
        };
        assert!(proxy.is_active());
        proxy.port = None;
        assert!(!proxy.is_active());
        proxy.port = Some(3128);
        proxy.host = "  ".to_string();
        assert!(!proxy.is_active());
    }

    #[test]
    fn test_normalize_trims_fields() {
        let mut config = QueryConfig::connection_test(ServerConfig {
            url: " https://nexus.example.com/ ".to_string(),
            ..server()
        });
        config.query.artifact_name = "  app*.jar ".to_string();
        config.display.filter_regex = Some("   ".to_string());
        config.normalize();

        assert_eq!(config.server.url, "https://nexus.example.com/");
        assert_eq!(config.query.artifact_name, "app*.jar");
        assert_eq!(config.display.filter_regex, None);
    }
}
