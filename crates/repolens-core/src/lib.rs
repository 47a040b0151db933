//! Repolens Core Library
//!
//! Queries artifact repository servers (Artifactory and Nexus REST
//! dialects) and curates the returned paths, versions or repositories into
//! an ordered, pre-selected list of entries.

pub mod config;
pub mod connector;
pub mod credentials;
pub mod curate;
pub mod error;
pub mod http;
pub mod pattern;
pub mod query;
pub mod types;

pub use error::{Error, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        DisplayOptions, QueryConfig, QueryOptions, RepolensConfig, ServerConfig, parse_config,
        validate,
    };

    // Connectors
    pub use crate::connector::{Connector, ConnectorContext, select_connector};

    // Credentials
    pub use crate::credentials::{CredentialProvider, CredentialStore, Credentials};

    // Curation
    pub use crate::curate::{CurationOptions, curate};

    // HTTP
    pub use crate::http::{HttpFetcher, HttpResponse, SystemProxy};

    // Query
    pub use crate::query::{ConnectionStatus, CuratedResult, ParameterQuery, test_connection};

    // Types
    pub use crate::types::{DisplayStyle, QueryMode, ResultEntry, SubmitMode};

    pub use crate::error::{Error, Result};
}
