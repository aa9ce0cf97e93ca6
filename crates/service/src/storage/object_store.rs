use std::fmt;

use async_trait::async_trait;

use crate::errors::ServiceError;

/// Opaque storage-level version marker (ETag-like). Two tokens compare equal
/// only if the object has not been rewritten between the two observations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw object bytes plus the version they were read at.
#[derive(Clone, Debug)]
pub struct ObjectBody {
    pub bytes: Vec<u8>,
    pub version: VersionToken,
}

/// Outcome of a conditional write.
#[derive(Debug)]
pub enum PutOutcome {
    Committed(VersionToken),
    PreconditionFailed,
}

/// The object-storage boundary: put/get/delete by flat key, with a
/// conditional write keyed on the version token.
///
/// `put_if_match` with `expected = None` means "create only if absent".
/// Implementations are the single serialization point for their bucket;
/// document-level concurrency control is built entirely on this primitive.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ObjectBody>, ServiceError>;

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<VersionToken, ServiceError>;

    async fn put_if_match(
        &self,
        key: &str,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<PutOutcome, ServiceError>;

    async fn delete(&self, key: &str) -> Result<bool, ServiceError>;
}

/// Keys are flat names like `stylists.json`; path separators and dot-dot
/// segments never reach the backing store.
pub(crate) fn validate_key(key: &str) -> Result<(), ServiceError> {
    if key.trim().is_empty() {
        return Err(ServiceError::Validation("document key must not be empty".into()));
    }
    if key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(ServiceError::Validation(format!("invalid document key: {key}")));
    }
    Ok(())
}
