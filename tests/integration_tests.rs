//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: query parameters → mode resolution →
//! upstream list calls → response envelopes

use pagegate::classify::ErrorKind;
use pagegate::features::{FeatureConfigStore, FlagSources};
use pagegate::response::{ApiError, ListResponse};
use pagegate::source::{InMemoryListSource, KubeListSource, ListSource};
use pagegate::{GatewayConfig, ListService, PaginationMode, PaginationRequest, PaginationResolver};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn items(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({ "name": format!("component-{i}") })).collect()
}

fn service_with(sources: FlagSources, source: Arc<dyn ListSource>) -> ListService {
    let store = Arc::new(FeatureConfigStore::new(sources, Duration::from_secs(60)));
    ListService::new(Arc::new(PaginationResolver::new(store)), source)
}

fn kube_source(server: &MockServer) -> Arc<dyn ListSource> {
    Arc::new(KubeListSource::new(&format!("{}/api/v1/components", server.uri())).unwrap())
}

// ============================================================================
// Cursor Mode Against an HTTP Upstream
// ============================================================================

#[tokio::test]
async fn test_cursor_flow_against_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/components"))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("continue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "a"}, {"name": "b"}],
            "metadata": {"continue": "cGFnZS0y"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/components"))
        .and(query_param("continue", "cGFnZS0y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "c"}],
            "metadata": {"continue": ""}
        })))
        .mount(&mock_server)
        .await;

    let service = service_with(FlagSources::none(), kube_source(&mock_server));

    let first = service
        .list(&PaginationRequest::new().mode("cursor").limit("2"))
        .await
        .unwrap();
    assert_eq!(first.items().len(), 2);
    assert_eq!(first.next_cursor(), Some("cGFnZS0y"));

    // Cursor presence alone selects cursor mode
    let second = service
        .list(&PaginationRequest::new().cursor("cGFnZS0y").limit("2"))
        .await
        .unwrap();
    assert_eq!(
        second,
        ListResponse::Cursor {
            items: vec![json!({"name": "c"})],
            next_cursor: String::new(),
        }
    );
}

#[tokio::test]
async fn test_expired_upstream_token_maps_to_410() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/components"))
        .respond_with(ResponseTemplate::new(410).set_body_json(json!({
            "kind": "Status",
            "reason": "Expired",
            "message": "The provided continue parameter is too old"
        })))
        .mount(&mock_server)
        .await;

    let service = service_with(FlagSources::none(), kube_source(&mock_server));
    let err = service
        .list(&PaginationRequest::new().cursor("c3RhbGU="))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TokenExpired);
    let api = ApiError::from(&err);
    assert_eq!(api.status, 410);
    assert_eq!(api.body.code, "CONTINUE_TOKEN_EXPIRED");
    assert_eq!(api.body.metadata.unwrap().restart, Some("first_page"));
}

#[tokio::test]
async fn test_upstream_outage_is_retryable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("etcd unavailable"))
        .mount(&mock_server)
        .await;

    let service = service_with(FlagSources::none(), kube_source(&mock_server));
    let err = service
        .list(&PaginationRequest::new().mode("cursor"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(err.is_retryable());
    assert_eq!(ApiError::from(err).status, 503);
}

#[tokio::test]
async fn test_malformed_cursor_never_reaches_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_with(FlagSources::none(), kube_source(&mock_server));
    let err = service
        .list(&PaginationRequest::new().cursor("not base64 at all!"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_CURSOR_FORMAT");
    assert_eq!(err.status(), 400);
}

// ============================================================================
// Legacy Mode Against an HTTP Upstream
// ============================================================================

#[tokio::test]
async fn test_legacy_walks_continue_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/components"))
        .and(query_param("limit", "1024"))
        .and(query_param_is_missing("continue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": items(3),
            "metadata": {"continue": "bmV4dA=="}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/components"))
        .and(query_param("continue", "bmV4dA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "component-3"}, {"name": "component-4"}],
            "metadata": {}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_with(FlagSources::none(), kube_source(&mock_server));
    let response = service
        .list(&PaginationRequest::new().limit("2").page("2"))
        .await
        .unwrap();

    assert_eq!(
        response,
        ListResponse::Legacy {
            items: vec![json!({"name": "component-2"}), json!({"name": "component-3"})],
            total: 5,
            page: 2,
            page_size: 2,
        }
    );
}

// ============================================================================
// Feature Flag Driven Defaults
// ============================================================================

#[tokio::test]
async fn test_flag_file_switches_default_mode() {
    let dir = tempdir().unwrap();
    let flags_path = dir.path().join("flags.json");
    std::fs::write(&flags_path, r#"{"features":{"cursor_pagination_enabled":true}}"#).unwrap();

    let store = Arc::new(FeatureConfigStore::new(
        FlagSources::none().with_file(&flags_path),
        Duration::from_secs(60),
    ));
    let service = ListService::new(
        Arc::new(PaginationResolver::new(Arc::clone(&store))),
        Arc::new(InMemoryListSource::new(items(4))),
    );

    let response = service
        .list(&PaginationRequest::new().limit("3"))
        .await
        .unwrap();
    assert!(matches!(response, ListResponse::Cursor { .. }));

    // Turn cursor mode off and force a reload
    std::fs::write(&flags_path, r#"{"features":{"cursor_pagination_enabled":false}}"#).unwrap();
    store.invalidate().await;

    let response = service
        .list(&PaginationRequest::new().limit("3"))
        .await
        .unwrap();
    assert!(matches!(response, ListResponse::Legacy { total: 4, .. }));

    // An explicit parameter always wins over the flag
    let response = service
        .list(&PaginationRequest::new().mode("cursor").limit("3"))
        .await
        .unwrap();
    assert!(matches!(response, ListResponse::Cursor { .. }));
}

#[tokio::test]
async fn test_environment_overrides_flag_file() {
    let dir = tempdir().unwrap();
    let flags_path = dir.path().join("flags.yaml");
    std::fs::write(&flags_path, "features:\n  cursor_pagination_enabled: true\n").unwrap();

    let var = "PAGEGATE_IT_ENV_OVERRIDE";
    std::env::set_var(var, "false");

    let store = Arc::new(FeatureConfigStore::new(
        FlagSources::none().with_file(&flags_path).with_env_var(var),
        Duration::from_secs(60),
    ));
    let resolver = PaginationResolver::new(store);
    let resolved = resolver.resolve(&PaginationRequest::new()).await.unwrap();

    assert_eq!(resolved.mode, PaginationMode::Legacy);
    assert_eq!(resolved.page, Some(1));
    std::env::remove_var(var);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_flag_load() {
    let dir = tempdir().unwrap();
    let flags_path = dir.path().join("flags.json");
    std::fs::write(&flags_path, r#"{"features":{"cursor_pagination_enabled":true}}"#).unwrap();

    let store = Arc::new(FeatureConfigStore::new(
        FlagSources::none().with_file(&flags_path),
        Duration::from_secs(60),
    ));
    let service = Arc::new(ListService::new(
        Arc::new(PaginationResolver::new(Arc::clone(&store))),
        Arc::new(InMemoryListSource::new(items(10))),
    ));

    let tasks = (0..50).map(|_| {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.list(&PaginationRequest::new()).await })
    });
    let results = futures::future::join_all(tasks).await;

    for result in results {
        let response = result.unwrap().unwrap();
        assert!(matches!(response, ListResponse::Cursor { .. }));
    }
    assert_eq!(store.reload_count(), 1);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_config_file_bounds_apply_end_to_end() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("gateway.yaml");
    std::fs::write(
        &config_path,
        r"
pagination:
  default_limit: 5
  max_limit: 8
features:
  flags_path: null
  env_var: null
",
    )
    .unwrap();

    let config = GatewayConfig::from_file(&config_path).unwrap();
    let store = Arc::new(config.feature_store());
    let resolver = PaginationResolver::with_policy(config.mode_resolver(), store);

    let resolved = resolver.resolve(&PaginationRequest::new()).await.unwrap();
    assert_eq!(resolved.limit, 5);

    let resolved = resolver
        .resolve(&PaginationRequest::new().limit("500"))
        .await
        .unwrap();
    assert_eq!(resolved.limit, 8);
}
