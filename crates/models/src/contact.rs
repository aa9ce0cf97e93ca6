use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;
use crate::Record;

/// A message submitted through the public contact form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Record for ContactMessage {
    const KEY: &'static str = "messages.json";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactMessageInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessageInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate::require_text("name", &self.name, 100)?;
        validate::require_text("email", &self.email, 200)?;
        if !self.email.contains('@') {
            return Err(ModelError::Validation("email must contain '@'".into()));
        }
        validate::require_text("message", &self.message, 5000)?;
        Ok(())
    }

    pub fn into_record(self) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            email: self.email,
            message: self.message,
            created_at: Utc::now(),
        }
    }
}
