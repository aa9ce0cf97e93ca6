use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;
use crate::Record;

/// A dated announcement on the news page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub body: String,
    pub published_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Record for NewsItem {
    const KEY: &'static str = "news.json";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewsItemInput {
    pub title: String,
    pub body: String,
    pub published_on: NaiveDate,
}

impl NewsItemInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("title", &self.title, 200)?;
        validate::require_text("body", &self.body, 20_000)?;
        Ok(())
    }

    pub fn into_record(self) -> NewsItem {
        NewsItem {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            body: self.body,
            published_on: self.published_on,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct NewsItemPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published_on: Option<NaiveDate>,
}

impl NewsItemPatch {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::optional_text("title", self.title.as_deref(), 200)?;
        validate::optional_text("body", self.body.as_deref(), 20_000)?;
        Ok(())
    }

    pub fn apply(&self, record: &mut NewsItem) {
        if let Some(v) = &self.title { record.title = v.clone(); }
        if let Some(v) = &self.body { record.body = v.clone(); }
        if let Some(v) = self.published_on { record.published_on = v; }
    }
}
