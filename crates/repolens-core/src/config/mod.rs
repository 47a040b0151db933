//! Query configuration
//!
//! One repolens.toml describes a single query: the server to talk to, what
//! to fetch, and how to curate the result. Parsing trims free text;
//! validation reports field-level problems without failing the parse.

pub mod parser;
pub mod paths;
pub mod schema;
pub mod validate;

pub use parser::{parse_config, parse_config_str, to_toml};
pub use paths::{default_config_path, resolve_config_path};
pub use schema::{
    DisplayOptions, FormatTypes, MAX_RESULTS, ProxyConfig, QueryConfig, QueryOptions,
    RepoTypes, RepolensConfig, ServerConfig,
};
pub use validate::{Severity, ValidationIssue, validate, validate_connection};
