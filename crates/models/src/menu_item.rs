use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;
use crate::Record;

pub const MAX_PRICE_YEN: u32 = 1_000_000;
pub const MAX_DURATION_MIN: u32 = 600;

/// A service on the salon menu (cut, color, treatment, ...).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_yen: u32,
    pub duration_min: u32,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Record for MenuItem {
    const KEY: &'static str = "menu.json";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MenuItemInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_yen: u32,
    pub duration_min: u32,
    pub category: String,
}

impl MenuItemInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("name", &self.name, 120)?;
        if !self.description.is_empty() {
            validate::require_text("description", &self.description, 1000)?;
        }
        validate::require_text("category", &self.category, 60)?;
        validate::bounded_u32("price_yen", self.price_yen, MAX_PRICE_YEN)?;
        validate::bounded_u32("duration_min", self.duration_min, MAX_DURATION_MIN)?;
        Ok(())
    }

    pub fn into_record(self) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            description: self.description,
            price_yen: self.price_yen,
            duration_min: self.duration_min,
            category: self.category,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_yen: Option<u32>,
    pub duration_min: Option<u32>,
    pub category: Option<String>,
}

impl MenuItemPatch {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::optional_text("name", self.name.as_deref(), 120)?;
        validate::optional_text("description", self.description.as_deref(), 1000)?;
        validate::optional_text("category", self.category.as_deref(), 60)?;
        if let Some(p) = self.price_yen {
            validate::bounded_u32("price_yen", p, MAX_PRICE_YEN)?;
        }
        if let Some(d) = self.duration_min {
            validate::bounded_u32("duration_min", d, MAX_DURATION_MIN)?;
        }
        Ok(())
    }

    pub fn apply(&self, record: &mut MenuItem) {
        if let Some(v) = &self.name { record.name = v.clone(); }
        if let Some(v) = &self.description { record.description = v.clone(); }
        if let Some(v) = self.price_yen { record.price_yen = v; }
        if let Some(v) = self.duration_min { record.duration_min = v; }
        if let Some(v) = &self.category { record.category = v.clone(); }
    }
}
