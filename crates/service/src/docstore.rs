use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::storage::{ObjectStorage, PutOutcome, VersionToken};

/// Tuning for the document store; defaults match the production config.
#[derive(Clone, Debug)]
pub struct DocumentStoreConfig {
    pub cache_ttl: Duration,
    pub max_update_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            max_update_attempts: 5,
            backoff_base: Duration::from_millis(25),
            backoff_max: Duration::from_millis(400),
        }
    }
}

struct CacheEntry {
    value: serde_json::Value,
    fetched_at: Instant,
    #[allow(dead_code)]
    version: Option<VersionToken>,
}

/// Whole-document store over object storage.
///
/// `get` serves from an in-process TTL cache; `save` is an unconditional
/// last-writer-wins overwrite; `update` is the conflict-safe read-modify-write
/// used by everything that inserts into a shared document. Concurrent
/// `update`s to one key each land on some consistent predecessor state or the
/// call reports `Conflict` after the retry budget, never a silent lost write.
pub struct DocumentStore {
    storage: Arc<dyn ObjectStorage>,
    cache: DashMap<String, CacheEntry>,
    cfg: DocumentStoreConfig,
}

impl DocumentStore {
    pub fn new(storage: Arc<dyn ObjectStorage>, cfg: DocumentStoreConfig) -> Arc<Self> {
        Arc::new(Self { storage, cache: DashMap::new(), cfg })
    }

    /// Fetch and decode a document, serving from cache within the TTL.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ServiceError> {
        if let Some(entry) = self.cache.get(key) {
            if entry.fetched_at.elapsed() < self.cfg.cache_ttl {
                return serde_json::from_value(entry.value.clone())
                    .map_err(|e| ServiceError::decode(key, e));
            }
        }

        let (value, version) = self.fetch(key).await?;
        let decoded = serde_json::from_value(value.clone()).map_err(|e| ServiceError::decode(key, e))?;
        self.cache.insert(
            key.to_string(),
            CacheEntry { value, fetched_at: Instant::now(), version: Some(version) },
        );
        Ok(decoded)
    }

    /// Serialize and overwrite the whole document, then drop the cache entry.
    pub async fn save<T: Serialize>(&self, key: &str, document: &T) -> Result<(), ServiceError> {
        let bytes = serde_json::to_vec(document)
            .map_err(|e| ServiceError::StorageWrite(format!("serialize {key}: {e}")))?;
        self.storage.put(key, bytes).await?;
        self.cache.remove(key);
        Ok(())
    }

    /// Write the document only if the key does not exist yet.
    /// Returns whether this call created it.
    pub async fn seed_if_absent<T: Serialize>(&self, key: &str, document: &T) -> Result<bool, ServiceError> {
        let bytes = serde_json::to_vec(document)
            .map_err(|e| ServiceError::StorageWrite(format!("serialize {key}: {e}")))?;
        match self.storage.put_if_match(key, bytes, None).await? {
            PutOutcome::Committed(_) => {
                self.cache.remove(key);
                Ok(true)
            }
            PutOutcome::PreconditionFailed => Ok(false),
        }
    }

    /// Atomic-as-possible read-modify-write.
    ///
    /// Reads the current document and its version token straight from storage
    /// (the cache would reintroduce the lost-update hazard), applies `f`, and
    /// commits with a conditional write. On a version mismatch the whole cycle
    /// reruns with jittered exponential backoff, so `f` must be pure over its
    /// input. Exhausting the budget surfaces `Conflict`.
    pub async fn update<T, F>(&self, key: &str, mut f: F) -> Result<T, ServiceError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnMut(T) -> T + Send,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let (value, version) = self.fetch(key).await?;
            let current: T = serde_json::from_value(value).map_err(|e| ServiceError::decode(key, e))?;
            let next = f(current);
            let bytes = serde_json::to_vec(&next)
                .map_err(|e| ServiceError::StorageWrite(format!("serialize {key}: {e}")))?;

            match self.storage.put_if_match(key, bytes, Some(&version)).await? {
                PutOutcome::Committed(_) => {
                    self.cache.remove(key);
                    if attempt > 1 {
                        debug!(%key, attempt, "document update committed after retry");
                    }
                    return Ok(next);
                }
                PutOutcome::PreconditionFailed => {
                    if attempt >= self.cfg.max_update_attempts {
                        warn!(%key, attempts = attempt, "document update retries exhausted");
                        return Err(ServiceError::Conflict(format!(
                            "update of {key} lost {attempt} races"
                        )));
                    }
                    let delay = self.backoff_delay(attempt);
                    debug!(%key, attempt, delay_ms = delay.as_millis() as u64, "document version moved, retrying");
                    sleep(delay).await;
                }
            }
        }
    }

    pub fn invalidate(&self, key: &str) {
        self.cache.remove(key);
    }

    async fn fetch(&self, key: &str) -> Result<(serde_json::Value, VersionToken), ServiceError> {
        let body = self
            .storage
            .get(key)
            .await?
            .ok_or_else(|| ServiceError::not_found(key))?;
        let value = serde_json::from_slice(&body.bytes).map_err(|e| ServiceError::decode(key, e))?;
        Ok((value, body.version))
    }

    /// Exponential backoff capped at `backoff_max`, half fixed half jitter.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = (self.cfg.backoff_base.as_millis() as u64)
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.cfg.backoff_max.as_millis() as u64).max(2);
        let jitter = rand::thread_rng().gen_range(0..=capped / 2);
        Duration::from_millis(capped / 2 + jitter)
    }
}
