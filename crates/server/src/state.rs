use std::sync::Arc;

use models::{ContactMessage, MenuItem, NewsItem, StyleImage, Stylist};
use service::content::{Collection, SalonDocument};
use service::csrf::CsrfService;
use service::docstore::DocumentStore;
use service::ratelimit::RateLimiter;

/// Process-wide singletons shared by every concurrently running handler.
#[derive(Clone)]
pub struct AppState {
    pub docs: Arc<DocumentStore>,
    pub csrf: Arc<CsrfService>,
    pub public_limiter: Arc<RateLimiter>,
    pub admin_limiter: Arc<RateLimiter>,
    pub form_limiter: Arc<RateLimiter>,
    pub production: bool,
}

impl AppState {
    pub fn stylists(&self) -> Collection<Stylist> {
        Collection::new(self.docs.clone())
    }

    pub fn styles(&self) -> Collection<StyleImage> {
        Collection::new(self.docs.clone())
    }

    pub fn menu(&self) -> Collection<MenuItem> {
        Collection::new(self.docs.clone())
    }

    pub fn news(&self) -> Collection<NewsItem> {
        Collection::new(self.docs.clone())
    }

    pub fn messages(&self) -> Collection<ContactMessage> {
        Collection::new(self.docs.clone())
    }

    pub fn salon(&self) -> SalonDocument {
        SalonDocument::new(self.docs.clone())
    }
}
