use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use chrono::Utc;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

/// One admission tier: a request budget inside a window that renews
/// wholesale (the counter resets, it does not roll).
#[derive(Clone, Debug)]
pub struct RateLimiterConfig {
    pub name: &'static str,
    pub window: Duration,
    pub max: u32,
    pub message: String,
}

impl RateLimiterConfig {
    pub fn new(name: &'static str, window: Duration, max: u32, message: impl Into<String>) -> Self {
        Self { name, window, max, message: message.into() }
    }

    /// Public read endpoints: generous budget, short window.
    pub fn public_reads() -> Self {
        Self::new("public", Duration::from_secs(60), 300, "too many requests, slow down")
    }

    /// Admin mutation endpoints: tight budget, longer window.
    pub fn admin_mutations() -> Self {
        Self::new("admin", Duration::from_secs(300), 60, "too many admin actions, try again later")
    }

    /// Anti-spam form submissions: very small budget, long window.
    pub fn form_submissions() -> Self {
        Self::new("form", Duration::from_secs(3600), 5, "form submission limit reached")
    }

    pub fn with_limits(mut self, window: Duration, max: u32) -> Self {
        self.window = window;
        self.max = max;
        self
    }
}

struct RateBucket {
    count: u32,
    reset_at: Instant,
    reset_epoch: i64,
}

/// Outcome of an admission check. Rejection is a value, never an error;
/// the caller decides whether to short-circuit the request.
#[derive(Clone, Debug)]
pub enum RateDecision {
    Allowed { limit: u32, remaining: u32, reset_epoch: i64 },
    Rejected { retry_after: Duration, limit: u32, reset_epoch: i64, message: String },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Per-identity sliding-window counter. One bucket per identity; buckets for
/// different identities never contend. The map's per-key entry lock makes
/// check-and-increment atomic under concurrent requests from one identity.
pub struct RateLimiter {
    cfg: RateLimiterConfig,
    buckets: DashMap<String, RateBucket>,
}

impl RateLimiter {
    pub fn new(cfg: RateLimiterConfig) -> Arc<Self> {
        Arc::new(Self { cfg, buckets: DashMap::new() })
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.cfg
    }

    pub fn check(&self, identity: &str) -> RateDecision {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(identity.to_string()).or_insert_with(|| RateBucket {
            count: 0,
            reset_at: now + self.cfg.window,
            reset_epoch: Utc::now().timestamp() + self.cfg.window.as_secs() as i64,
        });

        // window elapsed: renew it wholesale
        if bucket.reset_at <= now {
            bucket.count = 0;
            bucket.reset_at = now + self.cfg.window;
            bucket.reset_epoch = Utc::now().timestamp() + self.cfg.window.as_secs() as i64;
        }

        if bucket.count < self.cfg.max {
            bucket.count += 1;
            RateDecision::Allowed {
                limit: self.cfg.max,
                remaining: self.cfg.max - bucket.count,
                reset_epoch: bucket.reset_epoch,
            }
        } else {
            RateDecision::Rejected {
                retry_after: bucket.reset_at.saturating_duration_since(now),
                limit: self.cfg.max,
                reset_epoch: bucket.reset_epoch,
                message: self.cfg.message.clone(),
            }
        }
    }

    /// Drop buckets whose window has passed; returns how many were removed.
    /// Best-effort housekeeping, not needed for `check` correctness.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets.retain(|_, b| b.reset_at > now);
        before - self.buckets.len()
    }

    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        let limiter = self;
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.tick().await; // first tick completes immediately
            loop {
                tick.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(limiter = limiter.cfg.name, removed, "swept expired rate buckets");
                }
            }
        })
    }
}

/// Derive the limiter identity for a request: first forwarded-for entry,
/// else the peer address, else a shared "unknown" bucket.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = xff.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}
