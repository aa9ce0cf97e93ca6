use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tokio::sync::Mutex;
use tokio::time::timeout;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::object_store::{validate_key, ObjectBody, ObjectStorage, PutOutcome, VersionToken};

/// File-backed object bucket.
///
/// One file per key under `root`, written via temp file + rename. A per-key
/// async mutex is the serialization point for conditional writes; the version
/// token combines file metadata with an in-process write generation, so a
/// token taken before a concurrent rewrite never matches afterwards. The
/// bucket is owned by a single process.
pub struct FsObjectStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
    generations: DashMap<String, u64>,
    op_timeout: Duration,
}

impl FsObjectStore {
    /// Open (and create if needed) a bucket rooted at the given directory.
    pub async fn new<P: Into<PathBuf>>(root: P, op_timeout: Duration) -> Result<Arc<Self>, ServiceError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| ServiceError::StorageWrite(format!("create bucket dir: {e}")))?;
        Ok(Arc::new(Self {
            root,
            locks: DashMap::new(),
            generations: DashMap::new(),
            op_timeout,
        }))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ServiceError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn generation(&self, key: &str) -> u64 {
        self.generations.get(key).map(|g| *g).unwrap_or(0)
    }

    fn bump_generation(&self, key: &str) -> u64 {
        let mut entry = self.generations.entry(key.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Stat the object and derive its current version token; `None` if absent.
    async fn current_version(&self, key: &str, path: &PathBuf) -> Result<Option<VersionToken>, ServiceError> {
        let md = match timeout(self.op_timeout, fs::metadata(path)).await {
            Err(_) => return Err(ServiceError::StorageRead(format!("stat {key} timed out"))),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Ok(Err(e)) => return Err(ServiceError::StorageRead(format!("stat {key}: {e}"))),
            Ok(Ok(md)) => md,
        };
        let mtime_nanos = md
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Ok(Some(VersionToken::new(format!(
            "{:x}-{:x}-{:x}",
            md.len(),
            mtime_nanos,
            self.generation(key)
        ))))
    }

    /// Write bytes under the caller-held key lock and return the new token.
    async fn write_object(&self, key: &str, path: &PathBuf, bytes: &[u8]) -> Result<VersionToken, ServiceError> {
        let tmp = self.root.join(format!("{key}.{}.tmp", Uuid::new_v4()));
        match timeout(self.op_timeout, fs::write(&tmp, bytes)).await {
            Err(_) => return Err(ServiceError::StorageWrite(format!("write {key} timed out"))),
            Ok(Err(e)) => return Err(ServiceError::StorageWrite(format!("write {key}: {e}"))),
            Ok(Ok(())) => {}
        }
        match timeout(self.op_timeout, fs::rename(&tmp, path)).await {
            Err(_) => {
                let _ = fs::remove_file(&tmp).await;
                return Err(ServiceError::StorageWrite(format!("rename {key} timed out")));
            }
            Ok(Err(e)) => {
                let _ = fs::remove_file(&tmp).await;
                return Err(ServiceError::StorageWrite(format!("rename {key}: {e}")));
            }
            Ok(Ok(())) => {}
        }
        self.bump_generation(key);
        self.current_version(key, path)
            .await?
            .ok_or_else(|| ServiceError::StorageWrite(format!("object {key} vanished after write")))
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStore {
    async fn get(&self, key: &str) -> Result<Option<ObjectBody>, ServiceError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let version = match self.current_version(key, &path).await? {
            Some(v) => v,
            None => return Ok(None),
        };
        let bytes = match timeout(self.op_timeout, fs::read(&path)).await {
            Err(_) => return Err(ServiceError::StorageRead(format!("read {key} timed out"))),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Ok(Err(e)) => return Err(ServiceError::StorageRead(format!("read {key}: {e}"))),
            Ok(Ok(b)) => b,
        };
        Ok(Some(ObjectBody { bytes, version }))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<VersionToken, ServiceError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;
        self.write_object(key, &path, &bytes).await
    }

    async fn put_if_match(
        &self,
        key: &str,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<PutOutcome, ServiceError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let current = self.current_version(key, &path).await?;
        let matches = match (expected, &current) {
            (None, None) => true,
            (Some(e), Some(c)) => e == c,
            _ => false,
        };
        if !matches {
            return Ok(PutOutcome::PreconditionFailed);
        }
        let version = self.write_object(key, &path, &bytes).await?;
        Ok(PutOutcome::Committed(version))
    }

    async fn delete(&self, key: &str) -> Result<bool, ServiceError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        match timeout(self.op_timeout, fs::remove_file(&path)).await {
            Err(_) => Err(ServiceError::StorageWrite(format!("delete {key} timed out"))),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => Ok(false),
            Ok(Err(e)) => Err(ServiceError::StorageWrite(format!("delete {key}: {e}"))),
            Ok(Ok(())) => {
                self.bump_generation(key);
                Ok(true)
            }
        }
    }
}
