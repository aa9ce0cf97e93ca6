//! Anti-forgery gate for state-changing requests.
//!
//! The client must present the session cookie plus the issued token in the
//! `x-csrf-token` header. Safe methods pass through so read endpoints under
//! the same router are unaffected.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use service::csrf::{CSRF_COOKIE, CSRF_HEADER};

use crate::errors::ApiError;
use crate::state::AppState;

pub async fn require_csrf(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method();
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return next.run(req).await;
    }

    let jar = CookieJar::from_headers(req.headers());
    let session = jar.get(CSRF_COOKIE).map(|c| c.value().to_string());
    let token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match (session, token) {
        (Some(session), Some(token)) if state.csrf.verify(&session, &token) => next.run(req).await,
        _ => ApiError::csrf_invalid().into_response(),
    }
}
