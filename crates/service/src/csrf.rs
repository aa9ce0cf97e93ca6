use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Header the client echoes the token back in on mutating requests.
pub const CSRF_HEADER: &str = "x-csrf-token";
/// Cookie carrying the session id the token is bound to.
pub const CSRF_COOKIE: &str = "csrf_session";

const TOKEN_BYTES: usize = 32;

struct SessionToken {
    token: String,
    expires_at: Instant,
}

/// A freshly issued token and the session it is bound to. The server layer
/// turns `session_id` into the session cookie.
#[derive(Clone, Debug)]
pub struct IssuedCsrf {
    pub token: String,
    pub session_id: String,
    pub expires_in: Duration,
}

/// Per-session anti-forgery tokens.
///
/// A token only ever validates against the session it was issued to, by
/// constant-time comparison, until it expires. State is in-process; a restart
/// just forces clients through `issue` again.
pub struct CsrfService {
    sessions: DashMap<String, SessionToken>,
    ttl: Duration,
}

impl CsrfService {
    pub fn new(ttl: Duration) -> Arc<Self> {
        Arc::new(Self { sessions: DashMap::new(), ttl })
    }

    /// Bind a fresh token to the given session if it is still known and
    /// unexpired, otherwise to a newly minted session id. Re-issuing replaces
    /// the previous token for that session.
    pub fn issue(&self, existing_session: Option<&str>) -> IssuedCsrf {
        let now = Instant::now();
        let session_id = existing_session
            .filter(|sid| {
                self.sessions
                    .get(*sid)
                    .map(|t| t.expires_at > now)
                    .unwrap_or(false)
            })
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let token = mint_token();
        self.sessions.insert(
            session_id.clone(),
            SessionToken { token: token.clone(), expires_at: now + self.ttl },
        );
        IssuedCsrf { token, session_id, expires_in: self.ttl }
    }

    /// True only for the exact session the token was issued to, unexpired,
    /// and matching in constant time.
    pub fn verify(&self, session_id: &str, submitted: &str) -> bool {
        match self.sessions.get(session_id) {
            Some(entry) if entry.expires_at > Instant::now() => {
                constant_time_eq(entry.token.as_bytes(), submitted.as_bytes())
            }
            _ => false,
        }
    }

    /// Drop expired sessions; returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, t| t.expires_at > now);
        before - self.sessions.len()
    }

    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        let service = self;
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.tick().await;
            loop {
                tick.tick().await;
                let removed = service.sweep();
                if removed > 0 {
                    debug!(removed, "swept expired csrf sessions");
                }
            }
        })
    }
}

fn mint_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let mut out = String::with_capacity(TOKEN_BYTES * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
