//! Bearer token presence check
//!
//! Tokens are not verified here; the check only rejects requests that carry
//! no `Authorization: Bearer <token>` header when `auth.require_token` is set.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;

use super::{ApiState, AppError};

pub async fn require_bearer_token(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if state.auth.require_token && bearer_token(&request).is_none() {
        tracing::debug!("Rejected {} {}: no bearer token", request.method(), request.uri().path());
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
