//! Query boundary
//!
//! Runs connector and curation for one [`QueryConfig`] and hands the caller
//! a [`CuratedResult`]. Faults never cross this boundary: they are logged,
//! the result is emptied and `error_occurred` is set.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::config::{QueryConfig, ServerConfig, validate_connection};
use crate::connector::{ConnectorContext, select_connector};
use crate::credentials::CredentialProvider;
use crate::curate::{CurationOptions, curate};
use crate::error::Result;
use crate::http::SystemProxy;
use crate::types::ResultEntry;

/// Separator between submitted values of a multi-selection
pub const SUBMISSION_SEPARATOR: &str = "\n";

/// Curated entries plus the error flag of the run that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CuratedResult {
    pub entries: Vec<ResultEntry>,
    pub error_occurred: bool,
}

impl CuratedResult {
    fn failed() -> Self {
        Self {
            entries: Vec::new(),
            error_occurred: true,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries.iter().filter(|entry| entry.is_selected())
    }

    /// Submit values of the selected entries, one per line.
    pub fn submission(&self) -> String {
        submission_of(self.selected())
    }
}

/// Join the submit values of `entries` the way a parameter value is formed.
pub fn submission_of<'a>(entries: impl IntoIterator<Item = &'a ResultEntry>) -> String {
    entries
        .into_iter()
        .map(ResultEntry::submit_value)
        .collect::<Vec<_>>()
        .join(SUBMISSION_SEPARATOR)
}

/// One configured query with a memoized result
pub struct ParameterQuery {
    config: Arc<QueryConfig>,
    credentials: Arc<dyn CredentialProvider>,
    system_proxy: Option<SystemProxy>,
    cached: Mutex<Option<CuratedResult>>,
}

impl std::fmt::Debug for ParameterQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterQuery")
            .field("config", &self.config)
            .field("system_proxy", &self.system_proxy)
            .finish_non_exhaustive()
    }
}

impl ParameterQuery {
    pub fn new(config: QueryConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config: Arc::new(config),
            credentials,
            system_proxy: None,
            cached: Mutex::new(None),
        }
    }

    /// Route requests through the ambient proxy unless an explicit one is
    /// configured.
    pub fn with_system_proxy(mut self, system_proxy: Option<SystemProxy>) -> Self {
        self.system_proxy = system_proxy;
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Fetch and curate, replacing any memoized result.
    pub async fn run(&self) -> CuratedResult {
        self.invalidate();

        let result = match self.fetch_and_curate().await {
            Ok(entries) => CuratedResult {
                entries,
                error_occurred: false,
            },
            Err(e) => {
                tracing::error!(
                    server = %self.config.server.url,
                    mode = %self.config.query.mode,
                    error = %e,
                    "Query failed"
                );
                CuratedResult::failed()
            }
        };

        self.store(result.clone());
        result
    }

    /// The memoized result, running the query first if there is none.
    pub async fn result(&self) -> CuratedResult {
        if let Some(cached) = self.cached() {
            return cached;
        }
        self.run().await
    }

    /// Drop the memoized result.
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            cached.take();
        }
    }

    fn cached(&self) -> Option<CuratedResult> {
        self.cached.lock().ok().and_then(|cached| cached.clone())
    }

    fn store(&self, result: CuratedResult) {
        match self.cached.lock() {
            Ok(mut cached) => *cached = Some(result),
            Err(e) => tracing::warn!(error = %e, "Result cache unavailable, not memoizing"),
        }
    }

    async fn fetch_and_curate(&self) -> Result<Vec<ResultEntry>> {
        let options = CurationOptions::from_config(&self.config)?;
        let context = ConnectorContext::new(
            Arc::clone(&self.config),
            self.credentials.as_ref(),
            self.system_proxy.clone(),
        );
        let connector = select_connector(&self.config.server.r#type, context);

        let entries = connector.results().await?;
        tracing::debug!(
            connector = connector.id(),
            entries = entries.len(),
            "Fetched entries"
        );
        Ok(curate(entries, &options))
    }
}

/// Outcome of a connection test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// The server listed at least one repository
    Success { repositories: usize },
    /// Missing connection fields, unreachable server, rejected credentials
    /// or an empty listing
    Failed { reason: String },
}

impl ConnectionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ConnectionStatus::Success { .. })
    }
}

/// Check that a server is reachable and the credentials are accepted by
/// listing its repositories.
pub async fn test_connection(
    server: ServerConfig,
    credentials: Arc<dyn CredentialProvider>,
    system_proxy: Option<SystemProxy>,
) -> ConnectionStatus {
    let config = QueryConfig::connection_test(server);

    if let Some(issue) = validate_connection(&config)
        .into_iter()
        .find(|issue| issue.is_error())
    {
        return ConnectionStatus::Failed {
            reason: issue.message,
        };
    }

    let query = ParameterQuery::new(config, credentials).with_system_proxy(system_proxy);
    let result = query.run().await;

    if result.error_occurred {
        ConnectionStatus::Failed {
            reason: "Request failed, check the log output for details".to_string(),
        }
    } else if result.entries.is_empty() {
        ConnectionStatus::Failed {
            reason: "Server returned no repositories".to_string(),
        }
    } else {
        ConnectionStatus::Success {
            repositories: result.entries.len(),
        }
    }
}
