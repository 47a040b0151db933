//! Authentication context for preemptive Basic auth.
//!
//! A context caches which auth scheme to send to which origin. Requests to a
//! cached origin carry credentials on the first attempt instead of waiting
//! for a 401 challenge.

use std::collections::HashMap;
use url::Url;

use crate::credentials::Credentials;

/// Origin an auth scheme is cached for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthScope {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl AuthScope {
    pub fn from_url(url: &Url) -> Option<Self> {
        Some(Self {
            scheme: url.scheme().to_string(),
            host: url.host_str()?.to_ascii_lowercase(),
            port: url.port_or_known_default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
}

/// Credentials plus the per-origin scheme cache
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    credentials: Option<Credentials>,
    cache: HashMap<AuthScope, AuthScheme>,
}

impl AuthContext {
    /// A context that authenticates nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Cache a Basic scheme for the origin of `server_url`.
    ///
    /// Without credentials the context stays empty. An unparsable URL leaves
    /// the cache empty, so credentials are then only sent on challenge.
    pub fn preemptive(server_url: &str, credentials: Option<Credentials>) -> Self {
        let Some(credentials) = credentials else {
            return Self::empty();
        };

        let mut cache = HashMap::new();
        match Url::parse(server_url).ok().as_ref().and_then(AuthScope::from_url) {
            Some(scope) => {
                tracing::debug!(host = %scope.host, "Caching preemptive Basic auth");
                cache.insert(scope, AuthScheme::Basic);
            }
            None => {
                tracing::error!(url = %server_url, "Invalid server URL, preemptive authentication disabled");
            }
        }

        Self {
            credentials: Some(credentials),
            cache,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn cached_scheme(&self, url: &Url) -> Option<AuthScheme> {
        AuthScope::from_url(url).and_then(|scope| self.cache.get(&scope).copied())
    }

    /// Credentials to attach to the first request for `url`, if its origin
    /// is cached.
    pub fn preemptive_credentials(&self, url: &Url) -> Option<&Credentials> {
        match self.cached_scheme(url) {
            Some(AuthScheme::Basic) => self.credentials.as_ref(),
            None => None,
        }
    }
}
