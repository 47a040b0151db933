//! JFrog Artifactory connector
//!
//! Endpoints:
//! - `GET {server}/api/search/artifact?name=..[&repos=..]`
//! - `GET {server}/api/repositories`
//!
//! Single request per query mode, no pagination. Credentials are answered on
//! challenge.

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    ARTIFACTORY_ID, Connector, ConnectorContext, DialectCodes, endpoint_url, extract_versions,
    last_segment,
};
use crate::config::{FormatTypes, RepoTypes};
use crate::error::{Error, Result};
use crate::http::HttpFetcher;
use crate::pattern::FullMatch;
use crate::types::{QueryMode, ResultEntry};

/// Segment of storage API URIs that is not part of the download path.
const STORAGE_SEGMENT: &str = "api/storage/";

const CODES: DialectCodes = DialectCodes {
    local: "LOCAL",
    remote: "REMOTE",
    r#virtual: "VIRTUAL",
    maven: &["Maven"],
    npm: &["Npm", "Bower"],
    pypi: &["Pypi"],
    docker: &["Docker"],
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct Repository {
    r#type: String,
    #[serde(rename = "packageType")]
    package_type: String,
    key: String,
    url: String,
}

/// Parse an artifact search payload into `(file name, path)` entries.
pub fn parse_artifacts(body: &str) -> Result<Vec<ResultEntry>> {
    let response: SearchResponse = serde_json::from_str(body)?;

    Ok(response
        .results
        .into_iter()
        .filter_map(|result| {
            let value = result.uri.replace(STORAGE_SEGMENT, "");
            let key = last_segment(&result.uri);
            if key.trim().is_empty() || value.trim().is_empty() {
                return None;
            }
            Some(ResultEntry::new(key, value))
        })
        .collect())
}

/// Parse a repository listing into `(repository key, url)` entries, keeping
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
                && CODES.accepts_format(format_types, &repo.package_type)
        })
        .filter(|repo| !repo.key.trim().is_empty() && !repo.url.trim().is_empty())
        .map(|repo| ResultEntry::new(repo.key, repo.url))
        .collect())
}

/// Connector for the Artifactory REST dialect
#[derive(Debug)]
pub struct ArtifactoryConnector {
    context: ConnectorContext,
    fetcher: HttpFetcher,
}

impl ArtifactoryConnector {
    pub fn new(context: ConnectorContext) -> Self {
        let fetcher = HttpFetcher::new(context.http.clone());
        Self { context, fetcher }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.fetcher.get(url, None).await;
        if !response.is_success() {
            tracing::warn!(url = %url, status = response.status, "Artifactory request failed");
            return Err(Error::http_status(response.status, url));
        }
        Ok(response.body)
    }

    async fn artifacts(&self) -> Result<Vec<ResultEntry>> {
        let config = &self.context.config;
        let url = endpoint_url(
            &config.server.url,
            "/api/search/artifact",
            &[
                ("name", config.query.artifact_name.as_str()),
                ("repos", config.query.repo_name.as_str()),
            ],
        )?;

        let body = self.fetch(&url).await?;
        parse_artifacts(&body)
    }

    async fn repositories(&self) -> Result<Vec<ResultEntry>> {
        let config = &self.context.config;
        let url = endpoint_url(&config.server.url, "/api/repositories", &[])?;

        let body = self.fetch(&url).await?;
        parse_repositories(
            &body,
            &config.query.repo_types,
            &config.query.format_types,
        )
    }
}

#[async_trait]
impl Connector for ArtifactoryConnector {
    fn id(&self) -> &'static str {
        ARTIFACTORY_ID
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
