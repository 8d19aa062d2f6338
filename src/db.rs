use std::{collections::BTreeMap, sync::Arc};

use anyhow::Context;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::storage::StorageClient;

/// Named blobs kept by the record store. Declaration order is the lock
/// acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Users,
    Products,
    Carts,
    Orders,
    Sequences,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Products => "products",
            Collection::Carts => "carts",
            Collection::Orders => "orders",
            Collection::Sequences => "sequences",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

const COLLECTIONS: usize = 5;

/// Held for the duration of a load-mutate-save cycle.
pub struct CollectionLock {
    _guards: Vec<OwnedMutexGuard<()>>,
}

/// Typed load/save of whole collections on top of a [`StorageClient`].
///
/// Writers serialize through one mutex per collection; see [`RecordStore::lock`].
/// Reads are unlocked and see the last completed save. A read never writes
/// over an existing collection: bootstrapping only creates a missing blob.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn StorageClient>,
    locks: Arc<[Arc<Mutex<()>>; COLLECTIONS]>,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self {
            storage,
            locks: Arc::new(std::array::from_fn(|_| Arc::new(Mutex::new(())))),
        }
    }

    /// Locks every collection in `collections`, in declaration order, so two
    /// writers touching overlapping sets cannot deadlock.
    pub async fn lock(&self, collections: &[Collection]) -> CollectionLock {
        let mut wanted = collections.to_vec();
        wanted.sort();
        wanted.dedup();

        let mut guards = Vec::with_capacity(wanted.len());
        for collection in &wanted {
            guards.push(self.locks[collection.index()].clone().lock_owned().await);
        }
        debug!(collections = ?wanted, "collections locked");
        CollectionLock { _guards: guards }
    }

    /// Loads a collection, persisting an empty one first if it does not exist yet.
    /// If another task saved the collection in the meantime, its contents win.
    pub async fn load<T: DeserializeOwned>(&self, collection: Collection) -> anyhow::Result<Vec<T>> {
        let key = collection.key();
        if let Some(body) = self.storage.get_object(key).await? {
            return decode(collection, &body);
        }

        let created = self
            .storage
            .create_object(key, Bytes::from_static(b"[]"))
            .await
            .with_context(|| format!("bootstrap {key} collection"))?;
        if created {
            debug!(collection = key, "collection bootstrapped");
            return Ok(Vec::new());
        }

        match self.storage.get_object(key).await? {
            Some(body) => decode(collection, &body),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrites the whole collection.
    pub async fn save<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(records)
            .with_context(|| format!("encode {} collection", collection.key()))?;
        self.storage
            .put_object(collection.key(), Bytes::from(body))
            .await
            .with_context(|| format!("save {} collection", collection.key()))
    }

    /// Hands out the next identifier for `collection`: one past the larger of
    /// the last identifier issued and `current_max`. The issued value is
    /// persisted, so identifiers are never reused after deletes or restarts.
    ///
    /// Callers must hold the [`Collection::Sequences`] lock.
    pub async fn next_id(&self, collection: Collection, current_max: u64) -> anyhow::Result<u64> {
        let key = Collection::Sequences.key();
        let mut sequences: BTreeMap<String, u64> = match self.storage.get_object(key).await? {
            Some(body) => serde_json::from_slice(&body).context("decode sequences")?,
            None => BTreeMap::new(),
        };

        let last = sequences.get(collection.key()).copied().unwrap_or(0);
        let id = last.max(current_max) + 1;
        sequences.insert(collection.key().to_string(), id);

        let body = serde_json::to_vec_pretty(&sequences).context("encode sequences")?;
        self.storage
            .put_object(key, Bytes::from(body))
            .await
            .context("save sequences")?;
        debug!(collection = collection.key(), id, "identifier allocated");
        Ok(id)
    }
}

fn decode<T: DeserializeOwned>(collection: Collection, body: &[u8]) -> anyhow::Result<Vec<T>> {
    serde_json::from_slice(body).with_context(|| format!("decode {} collection", collection.key()))
}
