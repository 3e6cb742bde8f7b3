//! Tests for the list source module

use super::memory::encode_token;
use super::*;
use crate::classify::{ErrorKind, UpstreamStatus};
use crate::cursor::{CursorValidator, ValidatedCursor};
use crate::error::Error;
use serde_json::{json, Value};
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn items(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({ "id": i })).collect()
}

fn token(raw: &str) -> ValidatedCursor {
    CursorValidator::default()
        .validate_owned(raw.to_string())
        .unwrap()
        .unwrap()
}

// ============================================================================
// ListPage Tests
// ============================================================================

#[test]
fn test_list_page_empty_token_is_last() {
    let page = ListPage {
        items: vec![],
        continue_token: Some(String::new()),
    };
    assert!(page.is_last());
    assert_eq!(page.next_token(), None);

    let page = ListPage {
        items: vec![],
        continue_token: Some("abc".to_string()),
    };
    assert!(!page.is_last());
}

// ============================================================================
// InMemoryListSource Tests
// ============================================================================

#[tokio::test]
async fn test_memory_walks_all_pages() {
    let source = InMemoryListSource::new(items(7));

    let mut query = ListQuery::first(3);
    let mut seen = Vec::new();
    let mut calls = 0;
    loop {
        let page = source.list(query.clone()).await.unwrap();
        calls += 1;
        seen.extend(page.items.iter().map(|item| item["id"].as_u64().unwrap()));
        match page.next_token() {
            Some(next) => query = ListQuery::resume(token(next), 3),
            None => break,
        }
    }

    assert_eq!(calls, 3);
    assert_eq!(seen, (0..7).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_memory_issues_valid_cursor_tokens() {
    let source = InMemoryListSource::new(items(5));
    let page = source.list(ListQuery::first(2)).await.unwrap();

    let next = page.next_token().unwrap();
    assert!(CursorValidator::default().is_valid_continue_token(next));
}

#[tokio::test]
async fn test_memory_limit_larger_than_items() {
    let source = InMemoryListSource::new(items(2));
    let page = source.list(ListQuery::first(100)).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(page.is_last());
}

#[tokio::test]
async fn test_memory_expired_token() {
    let source = InMemoryListSource::new(items(5));
    let stale = encode_token(2, 1_000);

    let err = source
        .list(ListQuery::resume(token(&stale), 2))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Upstream {
            status: UpstreamStatus::Gone,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::TokenExpired);
}

#[tokio::test]
async fn test_memory_foreign_token_is_bad_request() {
    let source = InMemoryListSource::new(items(5));

    // Valid cursor shape, but not a token this source issued
    let err = source
        .list(ListQuery::resume(token("SGVsbG8="), 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCursor);
}

#[tokio::test]
async fn test_memory_offset_past_end_is_bad_request() {
    let source = InMemoryListSource::new(items(2));
    let far = encode_token(50, chrono::Utc::now().timestamp_millis());

    let err = source.list(ListQuery::resume(token(&far), 2)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCursor);
}

#[test]
fn test_memory_from_file_shapes() {
    let dir = tempdir().unwrap();

    let array = dir.path().join("array.json");
    std::fs::write(&array, r#"[{"id":1},{"id":2}]"#).unwrap();
    assert_eq!(InMemoryListSource::from_file(&array).unwrap().len(), 2);

    let wrapped = dir.path().join("wrapped.json");
    std::fs::write(&wrapped, r#"{"items":[{"id":1}]}"#).unwrap();
    assert_eq!(InMemoryListSource::from_file(&wrapped).unwrap().len(), 1);

    let missing = dir.path().join("missing.json");
    let err = InMemoryListSource::from_file(&missing).unwrap_err();
    assert!(matches!(&err, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    assert!(err.to_string().contains("missing.json"));

    let scalar = dir.path().join("scalar.json");
    std::fs::write(&scalar, "42").unwrap();
    assert!(matches!(
        InMemoryListSource::from_file(&scalar),
        Err(Error::Config { .. })
    ));
}

// ============================================================================
// KubeListSource Tests
// ============================================================================

#[tokio::test]
async fn test_kube_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/components"))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("continue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "a"}, {"name": "b"}],
            "metadata": {"continue": "Y29udGludWU="}
        })))
        .mount(&mock_server)
        .await;

    let source =
        KubeListSource::new(&format!("{}/api/v1/components", mock_server.uri())).unwrap();
    let page = source.list(ListQuery::first(2)).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.next_token(), Some("Y29udGludWU="));
}

#[tokio::test]
async fn test_kube_resume_sends_continue() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/components"))
        .and(query_param("continue", "Y29udGludWU="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "c"}],
            "metadata": {}
        })))
        .mount(&mock_server)
        .await;

    let source =
        KubeListSource::new(&format!("{}/api/v1/components", mock_server.uri())).unwrap();
    let page = source
        .list(ListQuery::resume(token("Y29udGludWU="), 2))
        .await
        .unwrap();

    assert_eq!(page.items, vec![json!({"name": "c"})]);
    assert!(page.is_last());
}

#[tokio::test]
async fn test_kube_status_errors_classify() {
    for (status, expected) in [
        (410, ErrorKind::TokenExpired),
        (400, ErrorKind::InvalidCursor),
        (503, ErrorKind::Unavailable),
        (500, ErrorKind::Other),
    ] {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream says no"))
            .mount(&mock_server)
            .await;

        let source = KubeListSource::new(&mock_server.uri()).unwrap();
        let err = source.list(ListQuery::first(5)).await.unwrap_err();

        assert!(matches!(err, Error::HttpStatus { .. }));
        assert_eq!(err.kind(), expected, "status {status}");
    }
}

#[test]
fn test_kube_rejects_bad_url() {
    assert!(matches!(
        KubeListSource::new("not a url"),
        Err(Error::InvalidUrl(_))
    ));
}
