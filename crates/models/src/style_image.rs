use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;
use crate::Record;

/// One entry in the style gallery.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StyleImage {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl Record for StyleImage {
    const KEY: &'static str = "styles.json";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StyleImageInput {
    pub title: String,
    pub category: String,
    pub image_url: String,
}

impl StyleImageInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("title", &self.title, 120)?;
        validate::require_text("category", &self.category, 60)?;
        validate::require_url("image_url", &self.image_url)?;
        Ok(())
    }

    pub fn into_record(self) -> StyleImage {
        StyleImage {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            category: self.category,
            image_url: self.image_url,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StyleImagePatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl StyleImagePatch {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::optional_text("title", self.title.as_deref(), 120)?;
        validate::optional_text("category", self.category.as_deref(), 60)?;
        validate::optional_url("image_url", self.image_url.as_deref())?;
        Ok(())
    }

    pub fn apply(&self, record: &mut StyleImage) {
        if let Some(v) = &self.title { record.title = v.clone(); }
        if let Some(v) = &self.category { record.category = v.clone(); }
        if let Some(v) = &self.image_url { record.image_url = v.clone(); }
    }
}
