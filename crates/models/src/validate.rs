//! Field validators shared by the record input types.

use crate::errors::ModelError;

pub fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(ModelError::Validation(format!("{field} must be at most {max_len} characters")));
    }
    Ok(())
}

pub fn optional_text(field: &str, value: Option<&str>, max_len: usize) -> Result<(), ModelError> {
    match value {
        Some(v) => require_text(field, v, max_len),
        None => Ok(()),
    }
}

pub fn require_url(field: &str, value: &str) -> Result<(), ModelError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ModelError::Validation(format!("{field} must start with http(s)")));
    }
    Ok(())
}

pub fn optional_url(field: &str, value: Option<&str>) -> Result<(), ModelError> {
    match value {
        Some(v) => require_url(field, v),
        None => Ok(()),
    }
}

pub fn bounded_u32(field: &str, value: u32, max: u32) -> Result<(), ModelError> {
    if value > max {
        return Err(ModelError::Validation(format!("{field} must be at most {max}")));
    }
    Ok(())
}
