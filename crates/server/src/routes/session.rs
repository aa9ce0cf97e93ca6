//! Anti-forgery token issuance.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use service::csrf::CSRF_COOKIE;

use crate::state::AppState;

#[derive(Serialize)]
pub struct CsrfIssueResponse {
    pub token: String,
    pub expires_in_secs: u64,
}

/// Issue a token bound to the caller's session; sets the session cookie.
/// The security layer enforces the final cookie attributes either way.
#[utoipa::path(get, path = "/api/csrf", tag = "session", responses((status = 200, description = "OK")))]
pub async fn issue_csrf(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<CsrfIssueResponse>) {
    let existing = jar.get(CSRF_COOKIE).map(|c| c.value().to_string());
    let issued = state.csrf.issue(existing.as_deref());

    let mut cookie = Cookie::new(CSRF_COOKIE, issued.session_id.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(state.production);
    cookie.set_same_site(SameSite::Strict);
    let jar = jar.add(cookie);

    let body = CsrfIssueResponse {
        token: issued.token,
        expires_in_secs: issued.expires_in.as_secs(),
    };
    (jar, Json(body))
}
