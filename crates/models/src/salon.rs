use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validate;

/// Document key for the single-object salon profile.
pub const SALON_KEY: &str = "salon.json";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

/// The salon profile rendered in the site footer and contact page.
/// Stored as a single object, not an array of records.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SalonInfo {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
}

impl Default for SalonInfo {
    fn default() -> Self {
        Self {
            name: "Salon".to_string(),
            tagline: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            hours: String::new(),
            socials: Vec::new(),
        }
    }
}

impl SalonInfo {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("name", &self.name, 120)?;
        if !self.tagline.is_empty() {
            validate::require_text("tagline", &self.tagline, 200)?;
        }
        if !self.address.is_empty() {
            validate::require_text("address", &self.address, 300)?;
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(ModelError::Validation("email must contain '@'".into()));
        }
        if !self.hours.is_empty() {
            validate::require_text("hours", &self.hours, 500)?;
        }
        for link in &self.socials {
            validate::require_text("socials.label", &link.label, 60)?;
            validate::require_url("socials.url", &link.url)?;
        }
        Ok(())
    }
}
