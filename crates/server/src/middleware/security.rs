//! Uniform response hardening.
//!
//! Applied as the outermost layer so every response carries the header set
//! and every session-scoped cookie gets the enforced attributes, no matter
//! what a handler did.

use axum::extract::{Request, State};
use axum::http::header::{
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, SET_COOKIE,
    STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;

const PUBLIC_CSP: &str = "default-src 'self'; img-src 'self' data: https:; style-src 'self' 'unsafe-inline'; script-src 'self'; frame-ancestors 'none'; base-uri 'self'";
const ADMIN_CSP: &str = "default-src 'none'; script-src 'self'; style-src 'self'; img-src 'self'; connect-src 'self'; frame-ancestors 'none'; base-uri 'none'; form-action 'self'";

const ADMIN_COOKIE_MAX_AGE: u64 = 8 * 3600;
const PUBLIC_COOKIE_MAX_AGE: u64 = 24 * 3600;

pub async fn security_headers(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let admin_scoped = req.uri().path().starts_with("/admin");
    let mut res = next.run(req).await;

    let headers = res.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(if admin_scoped { ADMIN_CSP } else { PUBLIC_CSP }),
    );
    if admin_scoped {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    enforce_cookie_policy(headers, admin_scoped, state.production);
    res
}

/// Rewrite session-scoped `Set-Cookie` values to the enforced attribute set.
/// Handlers cannot opt out by setting conflicting directives.
fn enforce_cookie_policy(headers: &mut HeaderMap, admin_scoped: bool, production: bool) {
    let cookies: Vec<String> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect();
    if cookies.is_empty() {
        return;
    }

    headers.remove(SET_COOKIE);
    for raw in cookies {
        let value = if is_session_cookie(&raw) {
            rewrite_session_cookie(&raw, admin_scoped, production)
        } else {
            raw
        };
        if let Ok(v) = HeaderValue::from_str(&value) {
            headers.append(SET_COOKIE, v);
        }
    }
}

fn is_session_cookie(raw: &str) -> bool {
    let name = raw
        .split(';')
        .next()
        .and_then(|pair| pair.split('=').next())
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    name == service::csrf::CSRF_COOKIE || name.starts_with("session") || name.starts_with("auth")
}

fn rewrite_session_cookie(raw: &str, admin_scoped: bool, production: bool) -> String {
    // keep only name=value, discard whatever attributes the handler set
    let pair = raw.split(';').next().unwrap_or(raw).trim();
    let max_age = if admin_scoped { ADMIN_COOKIE_MAX_AGE } else { PUBLIC_COOKIE_MAX_AGE };
    let mut out = format!("{pair}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Strict");
    if production {
        out.push_str("; Secure");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookies_are_recognized_by_name() {
        assert!(is_session_cookie("csrf_session=abc; Path=/"));
        assert!(is_session_cookie("session_id=abc"));
        assert!(is_session_cookie("auth_token=abc"));
        assert!(!is_session_cookie("theme=dark"));
    }

    #[test]
    fn rewrite_forces_attributes_and_drops_handler_ones() {
        let raw = "csrf_session=abc; Max-Age=999999; SameSite=None";
        let out = rewrite_session_cookie(raw, false, false);
        assert_eq!(out, "csrf_session=abc; Path=/; Max-Age=86400; HttpOnly; SameSite=Strict");

        let out = rewrite_session_cookie(raw, true, true);
        assert_eq!(out, "csrf_session=abc; Path=/; Max-Age=28800; HttpOnly; SameSite=Strict; Secure");
    }

    #[test]
    fn policy_leaves_plain_cookies_alone() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; Max-Age=5"));
        headers.append(SET_COOKIE, HeaderValue::from_static("auth_token=x; SameSite=None"));
        enforce_cookie_policy(&mut headers, false, false);

        let values: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values.contains(&"theme=dark; Max-Age=5".to_string()));
        assert!(values
            .iter()
            .any(|v| v.starts_with("auth_token=x; Path=/;") && v.contains("SameSite=Strict")));
    }
}
