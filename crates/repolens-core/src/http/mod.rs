//! HTTP access layer
//!
//! Builds a configured client per request and performs a single GET. Never
//! fails on transport problems: those become a sentinel response with
//! status [`TRANSPORT_FAILURE_STATUS`] so callers only ever inspect a status.

pub mod auth;
pub mod proxy;

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::config::ServerConfig;
use crate::credentials::{CredentialProvider, Credentials};

pub use auth::{AuthContext, AuthScheme, AuthScope};
pub use proxy::{ExplicitProxy, NoProxyMatcher, ProxyRoute, SystemProxy, select_route};

/// User agent sent with every request
pub const USER_AGENT: &str = "repolens - Artifact Repository Query";

/// Status reported when the request never produced an HTTP response
pub const TRANSPORT_FAILURE_STATUS: u16 = 963;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const SOCKET_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_REDIRECTS: usize = 10;

/// Status code and body of one GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Sentinel for a request that failed below HTTP.
    pub fn transport_failure(reason: impl std::fmt::Display) -> Self {
        Self::new(
            TRANSPORT_FAILURE_STATUS,
            format!("An exception occurred, please check the log files: {reason}"),
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == TRANSPORT_FAILURE_STATUS
    }
}

/// Everything needed to build a client for one server
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Accept invalid certificates and host names
    pub ignore_certificate: bool,
    /// Answer Basic challenges from the server with these
    pub server_credentials: Option<Credentials>,
    /// Proxy from the query configuration
    pub explicit_proxy: Option<ExplicitProxy>,
    /// Ambient proxy, used when no explicit proxy is set
    pub system_proxy: Option<SystemProxy>,
}

impl HttpClientConfig {
    /// Resolve credentials and proxy settings for a server definition.
    pub fn resolve(
        server: &ServerConfig,
        credentials: &dyn CredentialProvider,
        system_proxy: Option<SystemProxy>,
    ) -> Self {
        let server_credentials = credentials.lookup(&server.credentials_id);

        let explicit_proxy = server
            .proxy
            .as_ref()
            .filter(|p| p.is_active())
            .and_then(|p| {
                p.port.map(|port| ExplicitProxy {
                    url: format!("{}://{}:{}", p.protocol, p.host, port),
                    credentials: credentials.lookup(&p.credentials_id),
                })
            });

        if explicit_proxy.is_none() && system_proxy.is_none() {
            tracing::debug!("No proxy configured");
        }

        Self {
            ignore_certificate: server.ignore_certificate,
            server_credentials,
            explicit_proxy,
            system_proxy,
        }
    }
}

/// Performs GET requests with an [`HttpClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    config: HttpClientConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `url`, optionally with a preemptive auth context.
    ///
    /// Non-2xx responses are returned as they are. Blank or malformed URLs
    /// and transport errors yield [`HttpResponse::transport_failure`].
    pub async fn get(&self, url: &str, auth: Option<&AuthContext>) -> HttpResponse {
        if url.trim().is_empty() {
            tracing::info!("Skipping request with blank URL");
            return HttpResponse::transport_failure("blank URL");
        }

        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Invalid request URL");
                return HttpResponse::transport_failure(e);
            }
        };

        match self.execute(&url, auth).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "HTTP request failed");
                HttpResponse::transport_failure(e)
            }
        }
    }

    async fn execute(
        &self,
        url: &Url,
        auth: Option<&AuthContext>,
    ) -> Result<HttpResponse, reqwest::Error> {
        let client = self.build_client(url)?;

        let preemptive = auth.and_then(|ctx| ctx.preemptive_credentials(url));
        tracing::debug!(url = %url, preemptive = preemptive.is_some(), "GET");
        let mut response = send(&client, url, preemptive).await?;

        if response.status() == StatusCode::UNAUTHORIZED && preemptive.is_none() {
            let challenge_credentials = auth
                .and_then(AuthContext::credentials)
                .or(self.config.server_credentials.as_ref());

            if let Some(credentials) = challenge_credentials {
                tracing::debug!(url = %url, "Answering authentication challenge");
                // Drain the challenge so its connection goes back to the pool.
                if let Err(err) = response.bytes().await {
                    tracing::debug!(url = %url, error = %err, "Failed to drain challenge response");
                }
                response = send(&client, url, Some(credentials)).await?;
            }
        }

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse::new(status, body))
    }

    fn build_client(&self, url: &Url) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(SOCKET_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

        if self.config.ignore_certificate {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let host = url.host_str().unwrap_or_default();
        builder = match select_route(
            self.config.explicit_proxy.as_ref(),
            self.config.system_proxy.as_ref(),
            host,
        ) {
            ProxyRoute::Direct => builder.no_proxy(),
            ProxyRoute::Explicit(explicit) => {
                let mut proxy = reqwest::Proxy::all(&explicit.url)?;
                if let Some(credentials) = &explicit.credentials {
                    proxy = proxy.basic_auth(&credentials.username, &credentials.password);
                }
                builder.proxy(proxy)
            }
            ProxyRoute::System(proxy_url) => builder.proxy(reqwest::Proxy::all(&proxy_url)?),
        };

        builder.build()
    }
}

async fn send(
    client: &reqwest::Client,
    url: &Url,
    credentials: Option<&Credentials>,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut request = client.get(url.clone());
    if let Some(credentials) = credentials {
        request = request.basic_auth(&credentials.username, Some(&credentials.password));
    }
    request.send().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;
    use crate::credentials::CredentialStore;

    fn server(proxy: Option<ProxyConfig>) -> ServerConfig {
        ServerConfig {
            r#type: "nexus".to_string(),
            url: "https://nexus.example.com".to_string(),
            credentials_id: "repo".to_string(),
            ignore_certificate: true,
            proxy,
        }
    }

    fn store() -> CredentialStore {
        let mut store = CredentialStore::new();
        store.insert("repo", Credentials::new("deployer", "secret"));
        store.insert("proxy", Credentials::new("proxy-user", "proxy-secret"));
        store
    }

    #[test]
    fn test_response_classification() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());

        let failure = HttpResponse::transport_failure("connection refused");
        assert!(failure.is_transport_failure());
        assert!(!failure.is_success());
        assert!(failure.body.contains("connection refused"));
    }

    #[test]
    fn test_resolve_with_explicit_proxy() {
        let proxy = ProxyConfig {
            protocol: "https".to_string(),
            host: "proxy.corp".to_string(),
            port: Some(8443),
            credentials_id: "proxy".to_string(),
        };
        let config = HttpClientConfig::resolve(&server(Some(proxy)), &store(), None);

        assert!(config.ignore_certificate);
        assert_eq!(config.server_credentials.unwrap().username, "deployer");
        let explicit = config.explicit_proxy.unwrap();
        assert_eq!(explicit.url, "https://proxy.corp:8443");
        assert_eq!(explicit.credentials.unwrap().username, "proxy-user");
    }

    #[test]
    fn test_resolve_ignores_inactive_proxy() {
        let proxy = ProxyConfig {
            protocol: "http".to_string(),
            host: String::new(),
            port: Some(3128),
            credentials_id: "proxy".to_string(),
        };
        let system = SystemProxy::new("system", 3128);
        let config = HttpClientConfig::resolve(&server(Some(proxy)), &store(), Some(system));

        assert!(config.explicit_proxy.is_none());
        assert!(config.system_proxy.is_some());
    }

    #[tokio::test]
    async fn test_blank_and_malformed_urls_are_transport_failures() {
        let fetcher = HttpFetcher::default();
        assert!(fetcher.get("   ", None).await.is_transport_failure());
        assert!(fetcher.get("not a url", None).await.is_transport_failure());
    }
}
