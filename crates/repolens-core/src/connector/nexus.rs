//! Sonatype Nexus 3 connector
//!
//! Search results are paginated through `continuationToken`; pages are
//! fetched in order and concatenated until the token is absent or one
//! comes back a second time. Every request carries Basic
//! credentials up front when they are configured.

use std::collections::HashSet;
use std::sync::OnceLock;

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    Connector, ConnectorContext, DialectCodes, NEXUS_ID, endpoint_url, extract_versions,
    last_segment,
};
use crate::config::{FormatTypes, RepoTypes};
use crate::error::{Error, Result};
use crate::http::{AuthContext, HttpFetcher};
use crate::pattern::FullMatch;
use crate::types::{QueryMode, ResultEntry};

const SEARCH_PATH: &str = "/service/rest/v1/search";
const REPOSITORIES_PATH: &str = "/service/rest/v1/repositories";

/// Checksum sidecar suffixes left out of search results
const CHECKSUM_SUFFIXES: &[&str] = &["md5", "sha1"];

const CODES: DialectCodes = DialectCodes {
    local: "hosted",
    remote: "proxy",
    r#virtual: "group",
    maven: &["maven2"],
    npm: &["npm", "bower"],
    pypi: &["pypi"],
    docker: &["docker"],
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<Component>,
    #[serde(rename = "continuationToken", default)]
    continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Component {
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    #[serde(rename = "downloadUrl")]
    download_url: String,
}

#[derive(Debug, Deserialize)]
struct Repository {
    name: String,
    format: String,
    r#type: String,
    url: String,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub entries: Vec<ResultEntry>,
    /// Token for the next page, `None` on the last one
    pub continuation_token: Option<String>,
}

/// Parse one search page into `(file name, download URL)` entries.
pub fn parse_search_page(body: &str) -> Result<SearchPage> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let entries = response
        .items
        .into_iter()
        .flat_map(|component| component.assets)
        .filter_map(|asset| {
            let key = last_segment(&asset.download_url);
            if key.trim().is_empty() || asset.download_url.trim().is_empty() {
                return None;
            }
            if CHECKSUM_SUFFIXES.iter().any(|suffix| key.ends_with(suffix)) {
                return None;
            }
            Some(ResultEntry::new(key, asset.download_url.as_str()))
        })
        .collect();

    let continuation_token = response
        .continuation_token
        .filter(|token| !token.trim().is_empty());

    Ok(SearchPage {
        entries,
        continuation_token,
    })
}

/// Parse a repository listing into `(repository name, url)` entries, keeping
/// only accepted repository types and formats.
pub fn parse_repositories(
    body: &str,
    repo_types: &RepoTypes,
    format_types: &FormatTypes,
) -> Result<Vec<ResultEntry>> {
    let repositories: Vec<Repository> = serde_json::from_str(body)?;

    Ok(repositories
        .into_iter()
        .filter(|repo| {
            CODES.accepts_repo_type(repo_types, &repo.r#type)
                && CODES.accepts_format(format_types, &repo.format)
        })
        .filter(|repo| !repo.name.trim().is_empty() && !repo.url.trim().is_empty())
        .map(|repo| ResultEntry::new(repo.name, repo.url))
        .collect())
}

/// Connector for the Nexus 3 REST dialect
#[derive(Debug)]
pub struct NexusConnector {
    context: ConnectorContext,
    fetcher: HttpFetcher,
    auth: OnceLock<AuthContext>,
}

impl NexusConnector {
    pub fn new(context: ConnectorContext) -> Self {
        let fetcher = HttpFetcher::new(context.http.clone());
        Self {
            context,
            fetcher,
            auth: OnceLock::new(),
        }
    }

    /// Preemptive auth context, built once per connector.
    fn auth_context(&self) -> &AuthContext {
        self.auth.get_or_init(|| {
            AuthContext::preemptive(
                &self.context.config.server.url,
                self.fetcher.config().server_credentials.clone(),
            )
        })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.fetcher.get(url, Some(self.auth_context())).await;
        if !response.is_success() {
            tracing::warn!(url = %url, status = response.status, "Nexus request failed");
            return Err(Error::http_status(response.status, url));
        }
        Ok(response.body)
    }

    fn search_url(&self, continuation_token: Option<&str>) -> Result<String> {
        let config = &self.context.config;
        endpoint_url(
            &config.server.url,
            SEARCH_PATH,
            &[
                ("name", config.query.artifact_name.as_str()),
                ("repository", config.query.repo_name.as_str()),
                ("continuationToken", continuation_token.unwrap_or_default()),
            ],
        )
    }

    async fn artifacts(&self) -> Result<Vec<ResultEntry>> {
        let mut entries = Vec::new();
        let mut token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        let mut pages = 0usize;

        loop {
            let url = self.search_url(token.as_deref())?;
            let page = parse_search_page(&self.fetch(&url).await?)?;
            pages += 1;
            entries.extend(page.entries);

            match page.continuation_token {
                Some(next) if !seen_tokens.insert(next.clone()) => {
                    tracing::warn!(token = %next, pages, "Continuation token seen before, stopping pagination");
                    break;
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::debug!(pages, entries = entries.len(), "Nexus search complete");
        Ok(entries)
    }

    async fn repositories(&self) -> Result<Vec<ResultEntry>> {
        let config = &self.context.config;
        let url = endpoint_url(&config.server.url, REPOSITORIES_PATH, &[])?;

        let body = self.fetch(&url).await?;
        parse_repositories(
            &body,
            &config.query.repo_types,
            &config.query.format_types,
        )
    }
}

#[async_trait]
impl Connector for NexusConnector {
    fn id(&self) -> &'static str {
        NEXUS_ID
    }

    async fn results(&self) -> Result<Vec<ResultEntry>> {
        match self.context.config.query_mode()? {
            QueryMode::Path => self.artifacts().await,
            QueryMode::Version => {
                let pattern = FullMatch::new(&self.context.config.query.version_regex)?;
                Ok(extract_versions(self.artifacts().await?, &pattern))
            }
            QueryMode::Repository | QueryMode::ConnectivityTest => self.repositories().await,
        }
    }
}
