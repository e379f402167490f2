//! Integration tests for the gateway endpoints over an in-memory cluster
//! source.
//!
//! Tests: access gate, parameter validation, streamed body content.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use futures::{stream, StreamExt};
use tower::ServiceExt;

use podtail_api::{build_router, ApiState};
use podtail_types::{GatewayConfig, LineStream, LogSource, ReplicaInfo, SourceRef};

const API_KEY: &str = "test-secret";

struct FakeSource {
    replicas: Vec<ReplicaInfo>,
    lines: HashMap<String, Vec<&'static str>>,
    fail_listing: bool,
    list_calls: AtomicUsize,
}

impl FakeSource {
    fn new(replicas: Vec<ReplicaInfo>) -> Self {
        Self {
            replicas,
            lines: HashMap::new(),
            fail_listing: false,
            list_calls: AtomicUsize::new(0),
        }
    }

    fn lines(mut self, origin: &str, lines: Vec<&'static str>) -> Self {
        self.lines.insert(origin.to_string(), lines);
        self
    }

    fn failing_listing() -> Self {
        let mut source = Self::new(Vec::new());
        source.fail_listing = true;
        source
    }
}

#[async_trait]
impl LogSource for FakeSource {
    async fn list_replicas(
        &self,
        _namespace: &str,
        _label_selector: &str,
    ) -> anyhow::Result<Vec<ReplicaInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            anyhow::bail!("cluster unreachable");
        }
        Ok(self.replicas.clone())
    }

    async fn open_line_stream(
        &self,
        _namespace: &str,
        origin: &SourceRef,
        _tail_lines: i64,
    ) -> anyhow::Result<LineStream> {
        let lines: Vec<io::Result<String>> = self
            .lines
            .get(&origin.to_string())
            .map(|lines| lines.iter().map(|line| Ok(line.to_string())).collect())
            .unwrap_or_default();
        Ok(stream::iter(lines).boxed())
    }
}

fn replica(name: &str, containers: &[&str]) -> ReplicaInfo {
    ReplicaInfo {
        name: name.to_string(),
        containers: containers.iter().map(|c| c.to_string()).collect(),
    }
}

fn test_state(source: &Arc<FakeSource>) -> ApiState {
    ApiState {
        source: Arc::clone(source) as Arc<dyn LogSource>,
        config: Arc::new(GatewayConfig {
            api_key: API_KEY.to_string(),
            resolve_timeout: Duration::from_secs(1),
            ..GatewayConfig::default()
        }),
    }
}

fn authorized(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_needs_no_credentials() {
    let source = Arc::new(FakeSource::new(Vec::new()));
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logs_rejects_missing_credential() {
    let source = Arc::new(FakeSource::new(Vec::new()));
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/logs?selectorValue=web")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_logs_rejects_wrong_credential() {
    let source = Arc::new(FakeSource::new(Vec::new()));
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/logs?selectorValue=web")
                .header("x-api-key", "not-the-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bearer_credential_is_accepted() {
    let source = Arc::new(FakeSource::new(Vec::new()));
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/logs?selectorValue=web")
                .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_selector_value_is_rejected_before_listing() {
    let source = Arc::new(FakeSource::new(Vec::new()));
    let app = build_router(test_state(&source));

    let response = app.oneshot(authorized("/v1/logs")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_selector_value_is_rejected_before_listing() {
    let source = Arc::new(FakeSource::new(Vec::new()));
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(authorized("/v1/logs?selectorValue="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_listing_failure_is_a_server_error() {
    let source = Arc::new(FakeSource::failing_listing());
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(authorized("/v1/logs?selectorValue=web"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_streams_app_lines_from_every_replica() {
    let source = Arc::new(
        FakeSource::new(vec![
            replica("web-0", &["app", "istio-proxy"]),
            replica("web-1", &["app", "istio-proxy"]),
        ])
        .lines("web-0/app", vec!["w0 one", "w0 two"])
        .lines("web-1/app", vec!["w1 one"])
        .lines("web-0/istio-proxy", vec!["proxy noise"])
        .lines("web-1/istio-proxy", vec!["proxy noise"]),
    );
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(authorized("/v1/logs?selectorValue=web&tailLines=10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );

    let body = body_text(response).await;
    assert!(body.contains("w0 one\n"));
    assert!(body.contains("w0 two\n"));
    assert!(body.contains("w1 one\n"));
    assert!(!body.contains("proxy noise"));
    // Interleaving across pods is unspecified, order within one pod is not.
    assert!(body.find("w0 one").unwrap() < body.find("w0 two").unwrap());
}

#[tokio::test]
async fn test_selector_with_no_matches_ends_the_stream_cleanly() {
    let source = Arc::new(FakeSource::new(Vec::new()));
    let app = build_router(test_state(&source));

    let response = app
        .oneshot(authorized("/v1/logs?selectorValue=ghost"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");
}
