//! Repository connectors
//!
//! One [`Connector`] per backend dialect translates the configured query
//! mode into REST calls and normalizes the payloads into [`ResultEntry`]
//! values. Connectors never curate: filtering, sorting and selection belong
//! to [`crate::curate`].

pub mod artifactory;
pub mod fallback;
pub mod nexus;
pub mod selector;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::{FormatTypes, QueryConfig, RepoTypes};
use crate::credentials::CredentialProvider;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, SystemProxy};
use crate::pattern::FullMatch;
use crate::types::ResultEntry;

pub use artifactory::ArtifactoryConnector;
pub use fallback::FallbackConnector;
pub use nexus::NexusConnector;
pub use selector::{KNOWN_SERVER_TYPES, canonical_server_type, select_connector};

pub const ARTIFACTORY_ID: &str = "artifactory";
pub const NEXUS_ID: &str = "nexus";
pub const FALLBACK_ID: &str = "fallback";

/// A backend dialect
#[async_trait]
pub trait Connector: Send + Sync {
    /// Identifier of the dialect
    fn id(&self) -> &'static str;

    /// Fetch the entries for the configured query mode.
    ///
    /// Fails with [`Error::UnknownQueryMode`] for an unsupported mode and
    /// with [`Error::HttpStatus`] when a required request is not 2xx.
    async fn results(&self) -> Result<Vec<ResultEntry>>;
}

/// Inputs shared by every connector
#[derive(Debug, Clone)]
pub struct ConnectorContext {
    pub config: Arc<QueryConfig>,
    pub http: HttpClientConfig,
}

impl ConnectorContext {
    pub fn new(
        config: Arc<QueryConfig>,
        credentials: &dyn CredentialProvider,
        system_proxy: Option<SystemProxy>,
    ) -> Self {
        let http = HttpClientConfig::resolve(&config.server, credentials, system_proxy);
        Self { config, http }
    }
}

/// Text after the last `/`, empty when there is none.
pub(crate) fn last_segment(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[idx + 1..]).unwrap_or("")
}

/// Pair each extracted version with its path, dropping paths that do not
/// fully match or yield no capture.
pub fn extract_versions(entries: Vec<ResultEntry>, pattern: &FullMatch) -> Vec<ResultEntry> {
    entries
        .into_iter()
        .filter_map(|entry| {
            pattern
                .first_group(entry.value())
                .map(|version| ResultEntry::new(version, entry.value()))
        })
        .collect()
}

/// Join an API path onto the server URL and append the non-empty query
/// parameters, percent-encoded.
pub(crate) fn endpoint_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<String> {
    let joined = format!("{}{}", base.trim_end_matches('/'), path);
    let mut url = Url::parse(&joined)
        .map_err(|e| Error::invalid_config(format!("Invalid server URL '{base}': {e}")))?;

    let present: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    if !present.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in present {
            pairs.append_pair(name, value);
        }
    }

    Ok(url.into())
}

/// Backend codes for repository types and formats of one dialect
#[derive(Debug, Clone, Copy)]
pub(crate) struct DialectCodes {
    pub local: &'static str,
    pub remote: &'static str,
    pub r#virtual: &'static str,
    pub maven: &'static [&'static str],
    pub npm: &'static [&'static str],
    pub pypi: &'static [&'static str],
    pub docker: &'static [&'static str],
}

impl DialectCodes {
    pub fn accepts_repo_type(&self, accepted: &RepoTypes, value: &str) -> bool {
        (accepted.local && value == self.local)
            || (accepted.remote && value == self.remote)
            || (accepted.r#virtual && value == self.r#virtual)
    }

    pub fn accepts_format(&self, accepted: &FormatTypes, value: &str) -> bool {
        let is = |codes: &[&str]| codes.iter().any(|code| *code == value);
        let known = [self.maven, self.npm, self.pypi, self.docker];
        (accepted.maven && is(self.maven))
            || (accepted.npm && is(self.npm))
            || (accepted.pypi && is(self.pypi))
            || (accepted.docker && is(self.docker))
            || (accepted.other && !known.into_iter().any(|codes| is(codes)))
    }
}
