use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::storage::object_store::{validate_key, ObjectBody, ObjectStorage, PutOutcome, VersionToken};

struct StoredObject {
    bytes: Vec<u8>,
    generation: u64,
}

/// In-memory bucket with generation-counter version tokens.
///
/// The map's per-key entry lock makes the compare step and the write step one
/// atomic unit, which is exactly the conditional-write contract. Used by unit
/// and concurrency tests; also works as a throwaway demo backend.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn token(generation: u64) -> VersionToken {
        VersionToken::new(generation.to_string())
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<ObjectBody>, ServiceError> {
        validate_key(key)?;
        Ok(self.objects.get(key).map(|o| ObjectBody {
            bytes: o.bytes.clone(),
            version: Self::token(o.generation),
        }))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<VersionToken, ServiceError> {
        validate_key(key)?;
        match self.objects.entry(key.to_string()) {
            Entry::Occupied(mut e) => {
                let obj = e.get_mut();
                obj.bytes = bytes;
                obj.generation += 1;
                Ok(Self::token(obj.generation))
            }
            Entry::Vacant(v) => {
                v.insert(StoredObject { bytes, generation: 1 });
                Ok(Self::token(1))
            }
        }
    }

    async fn put_if_match(
        &self,
        key: &str,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<PutOutcome, ServiceError> {
        validate_key(key)?;
        match self.objects.entry(key.to_string()) {
            Entry::Occupied(mut e) => {
                let current = Self::token(e.get().generation);
                match expected {
                    Some(want) if *want == current => {
                        let obj = e.get_mut();
                        obj.bytes = bytes;
                        obj.generation += 1;
                        Ok(PutOutcome::Committed(Self::token(obj.generation)))
                    }
                    _ => Ok(PutOutcome::PreconditionFailed),
                }
            }
            Entry::Vacant(v) => match expected {
                None => {
                    v.insert(StoredObject { bytes, generation: 1 });
                    Ok(PutOutcome::Committed(Self::token(1)))
                }
                Some(_) => Ok(PutOutcome::PreconditionFailed),
            },
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, ServiceError> {
        validate_key(key)?;
        Ok(self.objects.remove(key).is_some())
    }
}
