use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;
use crate::Record;

/// A stylist shown on the public team page and managed from the admin surface.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Stylist {
    pub id: String,
    pub name: String,
    pub role: String,
    pub bio: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Record for Stylist {
    const KEY: &'static str = "stylists.json";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Creation input: no id/created_at, those are minted server-side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StylistInput {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl StylistInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("name", &self.name, 100)?;
        validate::require_text("role", &self.role, 100)?;
        if !self.bio.is_empty() {
            validate::require_text("bio", &self.bio, 2000)?;
        }
        validate::optional_url("image_url", self.image_url.as_deref())?;
        Ok(())
    }

    pub fn into_record(self) -> Stylist {
        Stylist {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            role: self.role,
            bio: self.bio,
            image_url: self.image_url,
            sort_order: self.sort_order,
            created_at: Utc::now(),
        }
    }
}

/// Partial update: each present field is validated and applied independently.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StylistPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}

impl StylistPatch {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::optional_text("name", self.name.as_deref(), 100)?;
        validate::optional_text("role", self.role.as_deref(), 100)?;
        validate::optional_text("bio", self.bio.as_deref(), 2000)?;
        validate::optional_url("image_url", self.image_url.as_deref())?;
        Ok(())
    }

    pub fn apply(&self, record: &mut Stylist) {
        if let Some(v) = &self.name { record.name = v.clone(); }
        if let Some(v) = &self.role { record.role = v.clone(); }
        if let Some(v) = &self.bio { record.bio = v.clone(); }
        if let Some(v) = &self.image_url { record.image_url = Some(v.clone()); }
        if let Some(v) = self.sort_order { record.sort_order = v; }
    }
}
