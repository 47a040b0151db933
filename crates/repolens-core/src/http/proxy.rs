//! Proxy routing decisions.
//!
//! An explicit proxy from the query configuration always wins. Otherwise the
//! caller may hand in the ambient [`SystemProxy`]; its no-proxy patterns are
//! glob matched against the outbound host before routing through it.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use url::Url;

use crate::credentials::Credentials;

/// Ambient proxy of the host environment, injected explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemProxy {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Host patterns that bypass the proxy, `*` and `?` wildcards allowed
    pub no_proxy: Vec<String>,
}

impl SystemProxy {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port,
            no_proxy: Vec::new(),
        }
    }

    pub fn with_no_proxy<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_proxy = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Read `HTTPS_PROXY`/`HTTP_PROXY` and `NO_PROXY` (either case) from the
    /// process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_env_with(|var| std::env::var(var).ok())
    }

    /// Same as [`SystemProxy::from_env`] with a custom variable lookup.
    pub fn from_env_with<F>(env: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| env(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let raw = first(&["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"])?;
        let with_scheme = if raw.contains("://") {
            raw
        } else {
            format!("http://{raw}")
        };

        let parsed = match Url::parse(&with_scheme) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(proxy = %with_scheme, error = %e, "Ignoring unparsable system proxy");
                return None;
            }
        };
        let host = parsed.host_str()?.to_string();
        let port = parsed.port_or_known_default().unwrap_or(80);

        let no_proxy = first(&["NO_PROXY", "no_proxy"])
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            scheme: parsed.scheme().to_string(),
            host,
            port,
            no_proxy,
        })
    }
}

/// Compiled no-proxy host patterns
#[derive(Debug, Clone)]
pub struct NoProxyMatcher {
    globs: GlobSet,
}

impl NoProxyMatcher {
    /// Compile host patterns. A leading `.` is read as "any subdomain of".
    /// Patterns that fail to compile are skipped.
    pub fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            let pattern = if pattern.starts_with('.') {
                format!("*{pattern}")
            } else {
                pattern.to_string()
            };

            match GlobBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Skipping invalid no-proxy pattern");
                }
            }
        }

        let globs = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build no-proxy patterns, proxying every host");
            GlobSet::empty()
        });

        Self { globs }
    }

    pub fn matches(&self, host: &str) -> bool {
        self.globs.is_match(host)
    }
}

/// Explicitly configured proxy with its resolved credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitProxy {
    pub url: String,
    pub credentials: Option<Credentials>,
}

/// Where a request to one host is routed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRoute {
    Direct,
    Explicit(ExplicitProxy),
    System(String),
}

/// Pick the route for a request to `host`.
pub fn select_route(
    explicit: Option<&ExplicitProxy>,
    system: Option<&SystemProxy>,
    host: &str,
) -> ProxyRoute {
    if let Some(proxy) = explicit {
        return ProxyRoute::Explicit(proxy.clone());
    }

    match system {
        Some(proxy) if !proxy.host.trim().is_empty() => {
            if NoProxyMatcher::new(&proxy.no_proxy).matches(host) {
                tracing::debug!(host = %host, "Host matches no-proxy pattern, connecting directly");
                ProxyRoute::Direct
            } else {
                ProxyRoute::System(proxy.url())
            }
        }
        _ => ProxyRoute::Direct,
    }
}
