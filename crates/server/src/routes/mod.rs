use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use common::types::Health;

use crate::middleware::{admission, csrf_guard, security};
use crate::state::AppState;

pub mod admin;
pub mod content;
pub mod session;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public reads, contact form, and the
/// admin mutation surface, each behind its admission tier, with the CSRF
/// gate on state-changing routes and uniform hardening on every response.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // Public routes (health, token issuance, content reads)
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/csrf", get(session::issue_csrf))
        .route("/api/stylists", get(content::list_stylists))
        .route("/api/styles", get(content::list_styles))
        .route("/api/menu", get(content::list_menu))
        .route("/api/news", get(content::list_news))
        .route("/api/salon", get(content::get_salon))
        .route_layer(from_fn_with_state(state.clone(), admission::admit_public));

    // Contact form: anti-spam tier plus the anti-forgery gate
    let form = Router::new()
        .route("/api/contact", post(content::submit_contact))
        .route_layer(from_fn_with_state(state.clone(), csrf_guard::require_csrf))
        .route_layer(from_fn_with_state(state.clone(), admission::admit_form));

    // Admin routes: admission runs first, then the CSRF gate
    let admin_routes = Router::new()
        .route("/admin/api/stylists", post(admin::create_stylist))
        .route(
            "/admin/api/stylists/:id",
            put(admin::update_stylist).delete(admin::delete_stylist),
        )
        .route("/admin/api/styles", post(admin::create_style))
        .route(
            "/admin/api/styles/:id",
            put(admin::update_style).delete(admin::delete_style),
        )
        .route("/admin/api/menu", post(admin::create_menu_item))
        .route(
            "/admin/api/menu/:id",
            put(admin::update_menu_item).delete(admin::delete_menu_item),
        )
        .route("/admin/api/news", post(admin::create_news_item))
        .route(
            "/admin/api/news/:id",
            put(admin::update_news_item).delete(admin::delete_news_item),
        )
        .route("/admin/api/salon", put(admin::update_salon))
        .route("/admin/api/messages", get(admin::list_messages))
        .route_layer(from_fn_with_state(state.clone(), csrf_guard::require_csrf))
        .route_layer(from_fn_with_state(state.clone(), admission::admit_admin));

    // Compose
    public
        .merge(form)
        .merge(admin_routes)
        .with_state(state.clone())
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        // outermost: headers and cookie policy apply to every response
        .layer(from_fn_with_state(state, security::security_headers))
}
