//! Field-level validation of a query definition.
//!
//! Connectors and the curation pipeline assume a validated configuration.
//! Issues carry a severity; only errors block a query.

use url::Url;

use super::schema::{MAX_RESULTS, QueryConfig};
use crate::connector::selector::{KNOWN_SERVER_TYPES, canonical_server_type};
use crate::connector::ARTIFACTORY_ID;
use crate::pattern::FullMatch;
use crate::types::{QueryMode, SelectionMode};

/// How serious a validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, e.g. `server.url`
    pub field: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Validate the connection part of a definition only.
pub fn validate_connection(config: &QueryConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let server = &config.server;
    let server_type = canonical_server_type(&server.r#type);

    if server_type.is_empty() {
        issues.push(ValidationIssue::error("server.type", "Server type is required"));
    } else if !KNOWN_SERVER_TYPES.contains(&server_type.as_str()) {
        issues.push(ValidationIssue::error(
            "server.type",
            format!(
                "Unknown server type '{}'. Valid types: {}",
                server.r#type,
                KNOWN_SERVER_TYPES.join(", ")
            ),
        ));
    }

    if server.url.is_empty() {
        issues.push(ValidationIssue::error("server.url", "Server URL is required"));
    } else if Url::parse(&server.url).is_err() {
        issues.push(ValidationIssue::error(
            "server.url",
            format!("Server URL '{}' is not a valid URL", server.url),
        ));
    }

    if server.credentials_id.is_empty() {
        issues.push(ValidationIssue::error(
            "server.credentials_id",
            "Credentials are required to query the server",
        ));
    }

    if server.ignore_certificate {
        issues.push(ValidationIssue::warning(
            "server.ignore_certificate",
            "Certificate validation is disabled; connections are open to interception",
        ));
    }

    if let Some(proxy) = &server.proxy
        && !proxy.host.is_empty()
    {
        match proxy.port {
            None => issues.push(ValidationIssue::error(
                "server.proxy.port",
                "Proxy port is required when a proxy host is set",
            )),
            Some(port) if !(1..=65535).contains(&port) => {
                issues.push(ValidationIssue::error(
                    "server.proxy.port",
                    format!("Proxy port {port} is outside 1-65535"),
                ))
            }
            Some(_) => {}
        }
    }

    issues
}

/// Validate the full definition.
pub fn validate(config: &QueryConfig) -> Vec<ValidationIssue> {
    let mut issues = validate_connection(config);
    let query = &config.query;
    let display = &config.display;

    let mode = if query.mode.is_empty() {
        issues.push(ValidationIssue::error("query.mode", "Query mode is required"));
        None
    } else {
        match config.query_mode() {
            Ok(mode) => Some(mode),
            Err(e) => {
                issues.push(ValidationIssue::error("query.mode", e.to_string()));
                None
            }
        }
    };

    if matches!(mode, Some(QueryMode::Path | QueryMode::Version)) {
        if query.artifact_name.is_empty() {
            issues.push(ValidationIssue::error(
                "query.artifact_name",
                "Artifact name is required",
            ));
        } else if query.artifact_name == "*"
            && canonical_server_type(&config.server.r#type) == ARTIFACTORY_ID
        {
            issues.push(ValidationIssue::error(
                "query.artifact_name",
                "Artifactory does not accept '*' as artifact name",
            ));
        }
    }

    if mode == Some(QueryMode::Version) {
        if query.version_regex.is_empty() {
            issues.push(ValidationIssue::error(
                "query.version_regex",
                "Version regex is required in version mode",
            ));
        } else if let Err(e) = FullMatch::new(&query.version_regex) {
            issues.push(ValidationIssue::error("query.version_regex", e.to_string()));
        }
    }

    if !(1..=MAX_RESULTS).contains(&display.results_count) {
        issues.push(ValidationIssue::error(
            "display.results_count",
            format!(
                "Result count {} is outside 1-{}",
                display.results_count, MAX_RESULTS
            ),
        ));
    }

    if let Some(filter) = &display.filter_regex
        && let Err(e) = FullMatch::new(filter)
    {
        issues.push(ValidationIssue::error("display.filter_regex", e.to_string()));
    }

    if display.select_entry == SelectionMode::Regex
        && let Err(e) = FullMatch::new(&display.select_regex)
    {
        issues.push(ValidationIssue::error("display.select_regex", e.to_string()));
    }

    issues
}
