use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::ApiState;

/// Shared-secret gate for the streaming endpoint.
///
/// Accepts the key as `Authorization: Bearer <key>` or `x-api-key: <key>`.
/// Requests with a missing, empty, or mismatched credential are rejected
/// before the handler runs, so no cluster call is made for them.
pub async fn require_api_key(
    State(state): State<ApiState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let header_key = headers.get("x-api-key").and_then(|value| value.to_str().ok());

    let presented = bearer.or(header_key).unwrap_or_default();
    if presented.is_empty() || !secrets_match(presented, &state.config.api_key) {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Compare the presented key against the configured secret, touching every
/// byte so the comparison time does not reveal where the first mismatch is.
fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
