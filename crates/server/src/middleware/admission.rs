//! Admission control in front of the handlers.
//!
//! Each tier is a configured `RateLimiter` instance; the middleware picks the
//! tier, derives the caller identity, and either stamps the rate headers on
//! the response or short-circuits with 429 + `Retry-After`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use service::ratelimit::{client_identity, RateDecision, RateLimiter};

use crate::state::AppState;

pub async fn admit_public(State(state): State<AppState>, req: Request, next: Next) -> Response {
    admit(&state.public_limiter, req, next).await
}

pub async fn admit_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    admit(&state.admin_limiter, req, next).await
}

pub async fn admit_form(State(state): State<AppState>, req: Request, next: Next) -> Response {
    admit(&state.form_limiter, req, next).await
}

async fn admit(limiter: &Arc<RateLimiter>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let identity = client_identity(req.headers(), peer);

    match limiter.check(&identity) {
        RateDecision::Allowed { limit, remaining, reset_epoch } => {
            let mut res = next.run(req).await;
            apply_rate_headers(res.headers_mut(), limit, remaining, reset_epoch);
            res
        }
        RateDecision::Rejected { retry_after, limit, reset_epoch, message } => {
            warn!(
                limiter = limiter.config().name,
                %identity,
                retry_after_secs = retry_after.as_secs(),
                "request rejected by rate limiter"
            );
            rejection(retry_after, limit, reset_epoch, &message)
        }
    }
}

fn apply_rate_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_epoch: i64) {
    headers.insert(HeaderName::from_static("x-ratelimit-limit"), HeaderValue::from(limit));
    headers.insert(HeaderName::from_static("x-ratelimit-remaining"), HeaderValue::from(remaining));
    headers.insert(HeaderName::from_static("x-ratelimit-reset"), HeaderValue::from(reset_epoch));
}

fn rejection(retry_after: Duration, limit: u32, reset_epoch: i64, message: &str) -> Response {
    let retry_secs = retry_after.as_secs().max(1);
    let body = Json(serde_json::json!({
        "error": { "kind": "rate_limited", "message": message }
    }));
    let mut res = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    let headers = res.headers_mut();
    headers.insert(RETRY_AFTER, HeaderValue::from(retry_secs));
    apply_rate_headers(headers, limit, 0, reset_epoch);
    res
}
