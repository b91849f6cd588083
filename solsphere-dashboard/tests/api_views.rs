use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use solsphere_core::FleetStore;
use solsphere_dashboard::{build_router, refresh_all, AppState, BackendClient, FleetLoader, RefreshTracker};
use solsphere_devkit::{TestHarness, FIXTURE_NOW};
use std::time::Duration;
use time::OffsetDateTime;
use tower::ServiceExt;

fn fixture_now() -> OffsetDateTime {
    FIXTURE_NOW
}

/// Store rempli depuis le stub, router figé sur l'instant des fixtures
async fn loaded_router(harness: &TestHarness, placeholder: bool) -> (Router, FleetStore) {
    let client = BackendClient::new(&harness.base_url(), Duration::from_secs(5)).unwrap();
    let loader = FleetLoader::new(client, placeholder);
    let store = FleetStore::new();
    let tracker = RefreshTracker::new();
    refresh_all(&loader, &store, &tracker).await;

    let state = AppState { store: store.clone(), tracker, now: fixture_now };
    (build_router(state), store)
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|m| m["machine_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_summary_over_live_fleet() {
    let harness = TestHarness::new().await.unwrap();
    let (router, _) = loaded_router(&harness, true).await;

    let (status, body) = call(&router, "GET", "/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"healthy": 2, "warning": 1, "critical": 1, "offline": 1}));
}

#[tokio::test]
async fn test_compliance_percentage_over_live_snapshot() {
    let harness = TestHarness::new().await.unwrap();
    let (router, _) = loaded_router(&harness, true).await;

    // (3 + 4) / (3 + 4 + 4 + 4) = 46.67 -> 47
    let (_, body) = call(&router, "GET", "/compliance", None).await;
    assert_eq!(body["percentage"], 47);
    assert_eq!(body["source"], "live");
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn test_stored_filters_combine() {
    let harness = TestHarness::new().await.unwrap();
    let (router, store) = loaded_router(&harness, true).await;

    let (status, _) = call(&router, "POST", "/filters", Some(r#"{"dimension": "os", "value": "windows"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&router, "GET", "/machines", None).await;
    assert_eq!(ids(&body), vec!["WIN-ABC123", "WIN-MNO345"]);

    call(&router, "POST", "/filters", Some(r#"{"dimension": "search", "value": "mno"}"#)).await;
    let (_, body) = call(&router, "GET", "/machines", None).await;
    assert_eq!(ids(&body), vec!["WIN-MNO345"]);

    let (_, filters) = call(&router, "DELETE", "/filters", None).await;
    assert_eq!(filters, serde_json::json!({"os": "", "status": "", "search": ""}));
    assert!(store.filters().is_empty());
    let (_, body) = call(&router, "GET", "/machines", None).await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_query_overrides_stored_filter() {
    let harness = TestHarness::new().await.unwrap();
    let (router, store) = loaded_router(&harness, true).await;
    store.set_filter(solsphere_core::FilterDimension::Os, "windows");

    let (_, body) = call(&router, "GET", "/machines?os=linux&status=offline", None).await;
    assert_eq!(ids(&body), vec!["LIN-JKL012"]);
    assert_eq!(body[0]["status"], "offline");
    // la requête ne touche pas au filtre stocké
    assert_eq!(store.filters().os, "windows");
}

#[tokio::test]
async fn test_unknown_status_filter_matches_nothing() {
    let harness = TestHarness::new().await.unwrap();
    let (router, _) = loaded_router(&harness, true).await;

    let (_, body) = call(&router, "GET", "/machines?status=Healthy", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_filter_dimension_rejected() {
    let harness = TestHarness::new().await.unwrap();
    let (router, store) = loaded_router(&harness, true).await;

    let (status, _) = call(&router, "POST", "/filters", Some(r#"{"dimension": "color", "value": "red"}"#)).await;
    assert!(status.is_client_error());
    assert!(store.filters().is_empty());
}

#[tokio::test]
async fn test_placeholder_views_when_backend_down() {
    let harness = TestHarness::new().await.unwrap();
    harness.backend.set_failing(true);
    let (router, _) = loaded_router(&harness, true).await;

    let (_, stats) = call(&router, "GET", "/stats", None).await;
    assert_eq!(stats["source"], "placeholder");
    assert!(stats["error"].is_string());

    let (_, health) = call(&router, "GET", "/system/health", None).await;
    assert_eq!(health["machines_source"], "placeholder");
    assert_eq!(health["fetch_failures"], 2);
}

#[tokio::test]
async fn test_stats_and_export() {
    let harness = TestHarness::new().await.unwrap();
    let (router, _) = loaded_router(&harness, true).await;

    let (_, stats) = call(&router, "GET", "/stats", None).await;
    assert_eq!(stats["stats"]["total_machines"], 5);
    assert_eq!(stats["healthy_rate"], 40.0);
    assert_eq!(stats["source"], "live");

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/export/machines").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.lines().any(|l| l.starts_with("LIN-GHI789,build-linux-03,Ubuntu Linux 22.04,critical,")));
}
