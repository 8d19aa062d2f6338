use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

/// Blob capability the record store is built on: whole-object reads and
/// whole-object overwrites, keyed by collection name.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    /// Stores `body` only if `key` does not exist yet. Returns `false` when
    /// the object was already there; it is left untouched.
    async fn create_object(&self, key: &str, body: Bytes) -> anyhow::Result<bool>;
}

/// One `<key>.json` file per object under `root`. Objects are replaced by
/// renaming a fully written temp file over them, so readers never see a
/// truncated object.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
    scratch: Arc<AtomicU64>,
}

impl FileStorage {
    pub async fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create data dir {}", root.display()))?;
        Ok(Self {
            root,
            scratch: Arc::new(AtomicU64::new(0)),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    async fn write_scratch(&self, key: &str, body: &Bytes) -> anyhow::Result<PathBuf> {
        let n = self.scratch.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .root
            .join(format!("{key}.json.{}.{n}.tmp", std::process::id()));
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        Ok(tmp)
    }
}

#[async_trait]
impl StorageClient for FileStorage {
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Some(Bytes::from(body))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.path_for(key);
        let tmp = self.write_scratch(key, &body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e).with_context(|| format!("replace {}", path.display()));
        }
        debug!(path = %path.display(), bytes = body.len(), "object written");
        Ok(())
    }

    async fn create_object(&self, key: &str, body: Bytes) -> anyhow::Result<bool> {
        let path = self.path_for(key);
        let tmp = self.write_scratch(key, &body).await?;
        // hard_link refuses to replace an existing target
        let linked = tokio::fs::hard_link(&tmp, &path).await;
        tokio::fs::remove_file(&tmp).await.ok();
        match linked {
            Ok(()) => {
                debug!(path = %path.display(), "object created");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e).with_context(|| format!("create {}", path.display())),
        }
    }
}

/// Process-local storage, used by tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Bytes>>,
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        self.objects.write().await.insert(key.to_string(), body);
        Ok(())
    }

    async fn create_object(&self, key: &str, body: Bytes) -> anyhow::Result<bool> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(key) {
            return Ok(false);
        }
        objects.insert(key.to_string(), body);
        Ok(true)
    }
}
