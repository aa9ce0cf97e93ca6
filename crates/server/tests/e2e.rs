use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use models::{ContactMessage, MenuItem, NewsItem, Record, SalonInfo, StyleImage, Stylist, SALON_KEY};
use service::csrf::{CsrfService, CSRF_HEADER};
use service::docstore::{DocumentStore, DocumentStoreConfig};
use service::ratelimit::{RateLimiter, RateLimiterConfig};
use service::storage::FsObjectStore;

use server::routes;
use server::state::AppState;

struct Limits {
    public: (Duration, u32),
    admin: (Duration, u32),
    form: (Duration, u32),
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            public: (Duration::from_secs(60), 1000),
            admin: (Duration::from_secs(60), 1000),
            form: (Duration::from_secs(60), 1000),
        }
    }
}

struct TestApp {
    base_url: String,
}

async fn start_server(limits: Limits) -> anyhow::Result<TestApp> {
    // isolated bucket per test run
    let data_dir = std::env::temp_dir().join(format!("salon_e2e_{}", Uuid::new_v4()));
    let storage = FsObjectStore::new(data_dir, Duration::from_secs(5)).await?;
    let docs = DocumentStore::new(storage, DocumentStoreConfig::default());

    docs.seed_if_absent(Stylist::KEY, &Vec::<Stylist>::new()).await?;
    docs.seed_if_absent(StyleImage::KEY, &Vec::<StyleImage>::new()).await?;
    docs.seed_if_absent(MenuItem::KEY, &Vec::<MenuItem>::new()).await?;
    docs.seed_if_absent(NewsItem::KEY, &Vec::<NewsItem>::new()).await?;
    docs.seed_if_absent(ContactMessage::KEY, &Vec::<ContactMessage>::new()).await?;
    docs.seed_if_absent(SALON_KEY, &SalonInfo::default()).await?;

    let state = AppState {
        docs,
        csrf: CsrfService::new(Duration::from_secs(600)),
        public_limiter: RateLimiter::new(
            RateLimiterConfig::public_reads().with_limits(limits.public.0, limits.public.1),
        ),
        admin_limiter: RateLimiter::new(
            RateLimiterConfig::admin_mutations().with_limits(limits.admin.0, limits.admin.1),
        ),
        form_limiter: RateLimiter::new(
            RateLimiterConfig::form_submissions().with_limits(limits.form.0, limits.form.1),
        ),
        production: false,
    };

    let app: Router = routes::build_router(state, CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

async fn fetch_csrf_token(c: &reqwest::Client, base_url: &str) -> anyhow::Result<String> {
    let res = c.get(format!("{}/api/csrf", base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["token"].as_str().expect("token in body").to_string())
}

#[tokio::test]
async fn e2e_health_carries_security_headers() -> anyhow::Result<()> {
    let app = start_server(Limits::default()).await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let headers = res.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_some());
    assert!(headers.get("content-security-policy").is_some());

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_csrf_cookie_attributes_enforced() -> anyhow::Result<()> {
    let app = start_server(Limits::default()).await?;
    let res = client().get(format!("{}/api/csrf", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let set_cookie = res
        .headers()
        .get("set-cookie")
        .expect("session cookie set")
        .to_str()?;
    assert!(set_cookie.starts_with("csrf_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    // public-scoped session cookie: 24h
    assert!(set_cookie.contains("Max-Age=86400"));
    Ok(())
}

#[tokio::test]
async fn e2e_admin_mutation_requires_csrf() -> anyhow::Result<()> {
    let app = start_server(Limits::default()).await?;
    let c = client();

    // no session cookie, no token
    let res = c
        .post(format!("{}/admin/api/stylists", app.base_url))
        .json(&json!({"name": "Aiko", "role": "Director"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::FORBIDDEN);
    // admin responses must not be cached
    assert_eq!(res.headers().get("cache-control").unwrap(), "no-store");
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"]["kind"], "csrf_invalid");

    // wrong token with a valid session is rejected too
    let _ = fetch_csrf_token(&c, &app.base_url).await?;
    let res = c
        .post(format!("{}/admin/api/stylists", app.base_url))
        .header(CSRF_HEADER, "not-the-token")
        .json(&json!({"name": "Aiko", "role": "Director"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn e2e_admin_stylist_crud_flow() -> anyhow::Result<()> {
    let app = start_server(Limits::default()).await?;
    let c = client();
    let token = fetch_csrf_token(&c, &app.base_url).await?;

    // create
    let res = c
        .post(format!("{}/admin/api/stylists", app.base_url))
        .header(CSRF_HEADER, &token)
        .json(&json!({"name": "Aiko", "role": "Director", "bio": "Cuts since 2010"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let created = res.json::<serde_json::Value>().await?;
    let id = created["id"].as_str().expect("id").to_string();

    // public list sees it
    let res = c.get(format!("{}/api/stylists", app.base_url)).send().await?;
    let list = res.json::<serde_json::Value>().await?;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Aiko");

    // patch one field
    let res = c
        .put(format!("{}/admin/api/stylists/{}", app.base_url, id))
        .header(CSRF_HEADER, &token)
        .json(&json!({"role": "Top Stylist"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["role"], "Top Stylist");
    assert_eq!(updated["name"], "Aiko");

    // delete
    let res = c
        .delete(format!("{}/admin/api/stylists/{}", app.base_url, id))
        .header(CSRF_HEADER, &token)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

    // deleting again is a 404
    let res = c
        .delete(format!("{}/admin/api/stylists/{}", app.base_url, id))
        .header(CSRF_HEADER, &token)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_validation_errors_are_machine_readable() -> anyhow::Result<()> {
    let app = start_server(Limits::default()).await?;
    let c = client();
    let token = fetch_csrf_token(&c, &app.base_url).await?;

    let res = c
        .post(format!("{}/admin/api/stylists", app.base_url))
        .header(CSRF_HEADER, &token)
        .json(&json!({"name": "  ", "role": "Director"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"]["kind"], "validation_error");
    Ok(())
}

#[tokio::test]
async fn e2e_concurrent_creates_are_not_lost() -> anyhow::Result<()> {
    let app = start_server(Limits::default()).await?;
    let c = client();
    let token = fetch_csrf_token(&c, &app.base_url).await?;

    let post = |name: &str| {
        let c = c.clone();
        let url = format!("{}/admin/api/menu", app.base_url);
        let token = token.clone();
        let body = json!({"name": name, "price_yen": 5500, "duration_min": 60, "category": "cut"});
        async move {
            c.post(url)
                .header(CSRF_HEADER, &token)
                .json(&body)
                .send()
                .await
        }
    };

    let (a, b) = tokio::join!(post("Cut A"), post("Cut B"));
    assert_eq!(a?.status(), HttpStatusCode::OK);
    assert_eq!(b?.status(), HttpStatusCode::OK);

    let res = c.get(format!("{}/api/menu", app.base_url)).send().await?;
    let list = res.json::<serde_json::Value>().await?;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2, "one concurrent insert was lost: {names:?}");
    assert!(names.contains(&"Cut A"));
    assert!(names.contains(&"Cut B"));
    Ok(())
}

#[tokio::test]
async fn e2e_public_rate_limit_rejects_with_headers() -> anyhow::Result<()> {
    let app = start_server(Limits {
        public: (Duration::from_secs(60), 3),
        ..Default::default()
    })
    .await?;
    let c = client();

    for i in 0..3 {
        let res = c.get(format!("{}/api/stylists", app.base_url)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
        let remaining: u32 = res
            .headers()
            .get("x-ratelimit-remaining")
            .unwrap()
            .to_str()?
            .parse()?;
        assert_eq!(remaining, 2 - i);
    }

    let res = c.get(format!("{}/api/stylists", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::TOO_MANY_REQUESTS);
    let headers = res.headers();
    assert!(headers.get("retry-after").is_some());
    assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "3");
    assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "0");
    assert!(headers.get("x-ratelimit-reset").is_some());
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"]["kind"], "rate_limited");
    Ok(())
}

#[tokio::test]
async fn e2e_contact_form_uses_the_strict_tier() -> anyhow::Result<()> {
    let app = start_server(Limits {
        form: (Duration::from_secs(60), 2),
        ..Default::default()
    })
    .await?;
    let c = client();
    let token = fetch_csrf_token(&c, &app.base_url).await?;

    for _ in 0..2 {
        let res = c
            .post(format!("{}/api/contact", app.base_url))
            .header(CSRF_HEADER, &token)
            .json(&json!({"name": "Guest", "email": "guest@example.com", "message": "Walk-ins?"}))
            .send()
            .await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
    }

    let res = c
        .post(format!("{}/api/contact", app.base_url))
        .header(CSRF_HEADER, &token)
        .json(&json!({"name": "Guest", "email": "guest@example.com", "message": "Walk-ins?"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::TOO_MANY_REQUESTS);

    // messages that did land are visible to the admin
    let res = c
        .get(format!("{}/admin/api/messages", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let list = res.json::<serde_json::Value>().await?;
    assert_eq!(list.as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn e2e_salon_profile_update_round_trips() -> anyhow::Result<()> {
    let app = start_server(Limits::default()).await?;
    let c = client();
    let token = fetch_csrf_token(&c, &app.base_url).await?;

    let res = c
        .put(format!("{}/admin/api/salon", app.base_url))
        .header(CSRF_HEADER, &token)
        .json(&json!({
            "name": "Atelier K",
            "tagline": "Hair with intent",
            "address": "1-2-3 Ebisu, Tokyo",
            "phone": "03-0000-0000",
            "email": "hello@atelierk.example",
            "hours": "10:00-19:00 (closed Tue)",
            "socials": [{"label": "instagram", "url": "https://instagram.com/atelierk"}]
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c.get(format!("{}/api/salon", app.base_url)).send().await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["name"], "Atelier K");
    assert_eq!(body["socials"][0]["label"], "instagram");
    Ok(())
}
