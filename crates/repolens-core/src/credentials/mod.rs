//! Credential resolution by identifier.
//!
//! The query layer never owns secrets; it asks a [`CredentialProvider`] for
//! the credentials behind an id. An unknown or blank id means "no auth".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Username and secret used for HTTP Basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Lookup of credentials by identifier
pub trait CredentialProvider: Send + Sync {
    fn lookup(&self, id: &str) -> Option<Credentials>;
}

/// Credential entry as written in repolens.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub username: String,

    /// Inline secret
    #[serde(default)]
    pub password: Option<String>,

    /// Name of an environment variable holding the secret
    #[serde(default)]
    pub password_env: Option<String>,
}

/// In-memory credential store
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, Credentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from config entries, reading `password_env` secrets
    /// through `env`. Entries whose secret cannot be resolved are skipped.
    pub fn from_entries_with<F>(entries: &HashMap<String, CredentialEntry>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut store = Self::new();
        for (id, entry) in entries {
            let password = match (&entry.password, &entry.password_env) {
                (Some(password), _) => Some(password.clone()),
                (None, Some(var)) => {
                    let value = env(var);
                    if value.is_none() {
                        tracing::warn!(credentials_id = %id, variable = %var, "Credential secret variable is not set");
                    }
                    value
                }
                (None, None) => {
                    tracing::warn!(credentials_id = %id, "Credential entry has no password or password_env");
                    None
                }
            };

            if let Some(password) = password {
                store.insert(id.clone(), Credentials::new(&entry.username, password));
            }
        }
        store
    }

    /// Build a store from config entries using the process environment.
    pub fn from_entries(entries: &HashMap<String, CredentialEntry>) -> Self {
        Self::from_entries_with(entries, |var| std::env::var(var).ok())
    }

    pub fn insert(&mut self, id: impl Into<String>, credentials: Credentials) {
        self.entries.insert(id.into(), credentials);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialProvider for CredentialStore {
    fn lookup(&self, id: &str) -> Option<Credentials> {
        let id = id.trim();
        if id.is_empty() {
            tracing::info!("No credentials id configured, continuing without authentication");
            return None;
        }

        let found = self.entries.get(id).cloned();
        if found.is_none() {
            tracing::info!(credentials_id = %id, "Credentials not found, continuing without authentication");
        }
        found
    }
}
