use std::fs;

use repolens_core::config::paths::config_path_in;
use repolens_core::config::{parse_config, resolve_config_path, to_toml, validate};
use repolens_core::credentials::{CredentialProvider, CredentialStore};
use repolens_core::types::QueryMode;
use tempfile::TempDir;

const NEXUS_VERSIONS: &str = r#"
[server]
type = "nexus"
url = "https://nexus.example.com"
credentials_id = "nexus-ci"

[query]
mode = "version"
artifact_name = "app"
repo_name = "maven-releases"
version_regex = '.*/app-(\d+\.\d+\.\d+)\.jar'

[display]
style = "dropdown"
results_count = 20
sort_order = "desc"
select_entry = "first"
submit_mode = "key"

[credentials.nexus-ci]
username = "deployer"
password = "s3cret"
"#;

#[test]
fn load_validate_and_resolve_credentials() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("repolens.toml");
    fs::write(&path, NEXUS_VERSIONS).unwrap();

    let config = parse_config(&path).unwrap();
    assert_eq!(config.query.query_mode().unwrap(), QueryMode::Version);

    let issues = validate(&config.query);
    assert!(issues.iter().all(|issue| !issue.is_error()), "{issues:?}");

    let store = CredentialStore::from_entries(&config.credentials);
    let credentials = store.lookup("nexus-ci").unwrap();
    assert_eq!(credentials.username, "deployer");
    assert!(store.lookup("other").is_none());
}

#[test]
fn syntax_errors_point_at_the_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("repolens.toml");
    fs::write(&path, "[server]\ntype = \"nexus\"\nurl = https://nexus\n").unwrap();

    let err = parse_config(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("line 3"), "{message}");
}

#[test]
fn missing_file_is_reported_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = parse_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn written_config_reads_back() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source.toml");
    fs::write(&source, NEXUS_VERSIONS).unwrap();
    let config = parse_config(&source).unwrap();

    let target = config_path_in(dir.path());
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, to_toml(&config).unwrap()).unwrap();

    let reread = parse_config(&target).unwrap();
    assert_eq!(reread.query.query.version_regex, config.query.query.version_regex);
    assert_eq!(reread.query.display.results_count, 20);
    assert_eq!(reread.credentials.len(), 1);
}

#[test]
fn explicit_path_wins_over_default() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("custom.toml");
    assert_eq!(resolve_config_path(Some(&explicit)).unwrap(), explicit);
}

#[test]
fn validation_flags_incomplete_definitions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("repolens.toml");
    fs::write(
        &path,
        r#"
[server]
type = "artifactory"
url = "repo.example.com"

[query]
mode = "path"
artifact_name = "*"

[display]
results_count = 80
"#,
    )
    .unwrap();

    let config = parse_config(&path).unwrap();
    let fields: Vec<_> = validate(&config.query)
        .into_iter()
        .filter(|issue| issue.is_error())
        .map(|issue| issue.field)
        .collect();

    assert!(fields.contains(&"server.url"));
    assert!(fields.contains(&"server.credentials_id"));
    assert!(fields.contains(&"query.artifact_name"));
    assert!(fields.contains(&"display.results_count"));
}
