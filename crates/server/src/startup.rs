use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use models::{ContactMessage, MenuItem, NewsItem, Record, SalonInfo, StyleImage, Stylist, SALON_KEY};
use service::csrf::CsrfService;
use service::docstore::{DocumentStore, DocumentStoreConfig};
use service::ratelimit::{RateLimiter, RateLimiterConfig};
use service::runtime;
use service::storage::FsObjectStore;

use crate::routes;
use crate::state::AppState;

const SWEEP_PERIOD: Duration = Duration::from_secs(3600);

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Build the shared application state from configuration.
pub async fn build_state(cfg: &configs::AppConfig) -> anyhow::Result<AppState> {
    let storage = FsObjectStore::new(
        cfg.storage.data_dir.as_str(),
        Duration::from_secs(cfg.storage.op_timeout_secs),
    )
    .await?;
    let docs = DocumentStore::new(
        storage,
        DocumentStoreConfig {
            cache_ttl: Duration::from_secs(cfg.storage.cache_ttl_secs),
            max_update_attempts: cfg.storage.update_max_attempts,
            ..Default::default()
        },
    );
    seed_documents(&docs).await?;

    let csrf = CsrfService::new(Duration::from_secs(cfg.security.csrf_ttl_secs));
    let public_limiter = RateLimiter::new(RateLimiterConfig::public_reads().with_limits(
        Duration::from_secs(cfg.limits.public.window_secs),
        cfg.limits.public.max,
    ));
    let admin_limiter = RateLimiter::new(RateLimiterConfig::admin_mutations().with_limits(
        Duration::from_secs(cfg.limits.admin.window_secs),
        cfg.limits.admin.max,
    ));
    let form_limiter = RateLimiter::new(RateLimiterConfig::form_submissions().with_limits(
        Duration::from_secs(cfg.limits.form.window_secs),
        cfg.limits.form.max,
    ));

    Ok(AppState {
        docs,
        csrf,
        public_limiter,
        admin_limiter,
        form_limiter,
        production: cfg.security.production,
    })
}

/// A fresh bucket gets empty collections and a default profile so the admin
/// surface works from the first request.
async fn seed_documents(docs: &Arc<DocumentStore>) -> anyhow::Result<()> {
    docs.seed_if_absent(Stylist::KEY, &Vec::<Stylist>::new()).await?;
    docs.seed_if_absent(StyleImage::KEY, &Vec::<StyleImage>::new()).await?;
    docs.seed_if_absent(MenuItem::KEY, &Vec::<MenuItem>::new()).await?;
    docs.seed_if_absent(NewsItem::KEY, &Vec::<NewsItem>::new()).await?;
    docs.seed_if_absent(ContactMessage::KEY, &Vec::<ContactMessage>::new()).await?;
    docs.seed_if_absent(SALON_KEY, &SalonInfo::default()).await?;
    Ok(())
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_and_validate()?;
    runtime::ensure_env(&cfg.storage.data_dir).await?;

    let state = build_state(&cfg).await?;

    // background housekeeping for buckets and csrf sessions
    let _sweepers = (
        state.public_limiter.clone().spawn_sweeper(SWEEP_PERIOD),
        state.admin_limiter.clone().spawn_sweeper(SWEEP_PERIOD),
        state.form_limiter.clone().spawn_sweeper(SWEEP_PERIOD),
        state.csrf.clone().spawn_sweeper(SWEEP_PERIOD),
    );

    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting salon cms server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
