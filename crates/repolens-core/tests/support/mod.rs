#![allow(dead_code)]

use std::sync::Arc;

use repolens_core::config::{QueryConfig, ServerConfig};
use repolens_core::credentials::{CredentialProvider, CredentialStore, Credentials};

pub const USERNAME: &str = "deployer";
pub const PASSWORD: &str = "s3cret";
pub const CREDENTIALS_ID: &str = "repo-ci";

pub fn server(server_type: &str, url: &str) -> ServerConfig {
    ServerConfig {
        r#type: server_type.to_string(),
        url: url.to_string(),
        credentials_id: CREDENTIALS_ID.to_string(),
        ignore_certificate: false,
        proxy: None,
    }
}

/// A definition for `mode` against `url`, artifact name `app*`.
pub fn query(server_type: &str, url: &str, mode: &str) -> QueryConfig {
    let mut config = QueryConfig::connection_test(server(server_type, url));
    config.query.mode = mode.to_string();
    config.query.artifact_name = "app*".to_string();
    config.display.results_count = 50;
    config
}

pub fn store() -> CredentialStore {
    let mut store = CredentialStore::new();
    store.insert(CREDENTIALS_ID, Credentials::new(USERNAME, PASSWORD));
    store
}

pub fn provider() -> Arc<dyn CredentialProvider> {
    Arc::new(store())
}

/// Address nothing listens on
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";
