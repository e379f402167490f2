use std::convert::Infallible;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::{BufMut, Bytes, BytesMut};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use podtail_streams::{deliver, start_streams, LineSink};
use podtail_types::{GatewayConfig, LogRequest};

use crate::auth::require_api_key;
use crate::error::ApiError;
use crate::state::ApiState;

/// Buffered body chunks per request before the delivery loop blocks
const BODY_CHANNEL_CAPACITY: usize = 16;

/// Build the gateway router. The logs route sits behind the API-key gate;
/// the health probe does not.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/v1/logs", get(stream_logs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .route("/v1/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Query parameters of the logs endpoint. Anything omitted, or sent as an
/// empty string, falls back to the configured default.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsParams {
    selector_key: Option<String>,
    selector_value: Option<String>,
    namespace: Option<String>,
    tail_lines: Option<i64>,
}

fn build_request(params: LogsParams, config: &GatewayConfig) -> Result<LogRequest, ApiError> {
    let selector_value = params
        .selector_value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing selector value".to_string()))?;

    Ok(LogRequest {
        namespace: or_default(params.namespace, &config.default_namespace),
        selector_key: or_default(params.selector_key, &config.default_selector_key),
        selector_value,
        tail_lines: params
            .tail_lines
            .unwrap_or(config.default_tail_lines)
            .max(0),
    })
}

/// Treat an absent or empty parameter as unset
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Stream merged log lines from every source the selector resolves to,
/// until the sources close or the client goes away.
async fn stream_logs(
    State(state): State<ApiState>,
    Query(params): Query<LogsParams>,
) -> Result<Response, ApiError> {
    let request = build_request(params, &state.config)?;
    info!(
        selector = %request.selector(),
        namespace = %request.namespace,
        tail_lines = request.tail_lines,
        "starting log stream"
    );

    let cancel = CancellationToken::new();
    let events = start_streams(
        Arc::clone(&state.source),
        &request,
        state.config.resolve_timeout,
        cancel.clone(),
    )
    .await?;

    let (chunk_tx, chunk_rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        let sink = BodySink { chunks: chunk_tx };
        match deliver(events, sink, cancel).await {
            Ok(delivered) => debug!(delivered, "log stream completed"),
            Err(err) => warn!(error = %err, "log stream aborted"),
        }
    });

    let body = Body::from_stream(ReceiverStream::new(chunk_rx));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body)
        .map_err(|err| ApiError::Internal(err.to_string()))
}

/// Sink that frames each line as one chunk of the response body. Every
/// chunk goes out on the wire as it arrives, which is the per-line flush
/// the client relies on for near-real-time delivery.
struct BodySink {
    chunks: mpsc::Sender<Result<Bytes, Infallible>>,
}

#[async_trait]
impl LineSink for BodySink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut framed = BytesMut::with_capacity(line.len() + 1);
        framed.put_slice(line.as_bytes());
        framed.put_u8(b'\n');
        self.chunks
            .send(Ok(framed.freeze()))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected"))
    }

    async fn closed(&mut self) {
        self.chunks.closed().await
    }
}
