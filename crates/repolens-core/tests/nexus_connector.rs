mod support;

use std::sync::Arc;

use repolens_core::config::{FormatTypes, QueryConfig, RepoTypes};
use repolens_core::connector::{Connector, ConnectorContext, NexusConnector};
use repolens_core::credentials::CredentialStore;
use serde_json::{Value, json};
use wiremock::matchers::{basic_auth, header_exists, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{PASSWORD, USERNAME};

const SEARCH: &str = "/service/rest/v1/search";
const REPOSITORIES: &str = "/service/rest/v1/repositories";

fn connector(config: QueryConfig) -> NexusConnector {
    NexusConnector::new(ConnectorContext::new(
        Arc::new(config),
        &support::store(),
        None,
    ))
}

fn page(base: &str, files: &[&str], token: Option<&str>) -> Value {
    let items: Vec<_> = files
        .iter()
        .map(|file| {
            json!({
                "assets": [
                    { "downloadUrl": format!("{base}/repository/releases/org/acme/{file}") }
                ]
            })
        })
        .collect();
    json!({ "items": items, "continuationToken": token })
}

#[tokio::test]
async fn pagination_merges_every_page_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("name", "app*"))
        .and(query_param_is_missing("continuationToken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(&base, &["app-1.0.jar", "app-1.1.jar"], Some("next-1"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("continuationToken", "next-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&base, &["app-2.0.jar"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let entries = connector(support::query("nexus", &base, "path"))
        .results()
        .await
        .unwrap();

    let keys: Vec<_> = entries.iter().map(|e| e.key()).collect();
    assert_eq!(keys, vec!["app-1.0.jar", "app-1.1.jar", "app-2.0.jar"]);
    assert_eq!(
        entries[2].value(),
        format!("{base}/repository/releases/org/acme/app-2.0.jar")
    );
}

#[tokio::test]
async fn failing_later_page_aborts_the_query() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param_is_missing("continuationToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-1.0.jar"], Some("next-1"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("continuationToken", "next-1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = connector(support::query("nexus", &base, "path"))
        .results()
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn repeated_token_stops_pagination() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param_is_missing("continuationToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-1.0.jar"], Some("same"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("continuationToken", "same"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-2.0.jar"], Some("same"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entries = connector(support::query("nexus", &base, "path"))
        .results()
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn cycling_tokens_stop_pagination() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param_is_missing("continuationToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-1.0.jar"], Some("a"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("continuationToken", "a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-2.0.jar"], Some("b"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("continuationToken", "b"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-3.0.jar"], Some("a"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entries = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        connector(support::query("nexus", &base, "path")).results(),
    )
    .await
    .expect("pagination should terminate")
    .unwrap();

    let keys: Vec<_> = entries.iter().map(|e| e.key()).collect();
    assert_eq!(keys, vec!["app-1.0.jar", "app-2.0.jar", "app-3.0.jar"]);
}

#[tokio::test]
async fn credentials_are_sent_preemptively() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPOSITORIES))
        .and(basic_auth(USERNAME, PASSWORD))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "maven-releases", "format": "maven2", "type": "hosted", "url": "https://nexus/repository/maven-releases" }
        ])))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(REPOSITORIES))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;

    let entries = connector(support::query("nexus", &server.uri(), "repository"))
        .results()
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key(), "maven-releases");
}

#[tokio::test]
async fn every_page_carries_credentials() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(header_exists("authorization"))
        .and(query_param_is_missing("continuationToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-1.0.jar"], Some("next-1"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(header_exists("authorization"))
        .and(query_param("continuationToken", "next-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&base, &["app-1.1.jar"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let entries = connector(support::query("nexus", &base, "path"))
        .results()
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn no_credentials_means_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPOSITORIES))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(REPOSITORIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let connector = NexusConnector::new(ConnectorContext::new(
        Arc::new(support::query("nexus", &server.uri(), "repository")),
        &CredentialStore::new(),
        None,
    ));
    assert!(connector.results().await.unwrap().is_empty());
}

#[tokio::test]
async fn checksum_assets_are_excluded() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            &base,
            &["app-1.0.jar", "app-1.0.jar.md5", "app-1.0.jar.sha1"],
            None,
        )))
        .mount(&server)
        .await;

    let entries = connector(support::query("nexus", &base, "path"))
        .results()
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key(), "app-1.0.jar");
}

#[tokio::test]
async fn version_mode_over_paginated_results() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param_is_missing("continuationToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-1.2.3.jar"], Some("p2"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("continuationToken", "p2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page(&base, &["app-1.3.0.jar", "readme.txt"], None)),
        )
        .mount(&server)
        .await;

    let mut config = support::query("nexus", &base, "version");
    config.query.version_regex = r".*/app-([\d.]+)\.jar".to_string();

    let entries = connector(config).results().await.unwrap();
    let keys: Vec<_> = entries.iter().map(|e| e.key()).collect();
    assert_eq!(keys, vec!["1.2.3", "1.3.0"]);
}

#[tokio::test]
async fn repository_listing_filters_formats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPOSITORIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "maven-releases", "format": "maven2", "type": "hosted", "url": "u1" },
            { "name": "npm-hosted", "format": "npm", "type": "hosted", "url": "u2" },
            { "name": "docker-proxy", "format": "docker", "type": "proxy", "url": "u3" },
            { "name": "pypi-group", "format": "pypi", "type": "group", "url": "u4" }
        ])))
        .mount(&server)
        .await;

    let mut config = support::query("nexus", &server.uri(), "repository");
    config.query.repo_types = RepoTypes::all();
    config.query.format_types = FormatTypes {
        maven: false,
        npm: true,
        pypi: false,
        docker: true,
        other: false,
    };

    let entries = connector(config).results().await.unwrap();
    let keys: Vec<_> = entries.iter().map(|e| e.key()).collect();
    assert_eq!(keys, vec!["npm-hosted", "docker-proxy"]);
}
