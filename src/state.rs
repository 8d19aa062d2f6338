use crate::config::{AppConfig, StorageBackend};
use crate::db::RecordStore;
use crate::storage::{FileStorage, MemoryStorage, StorageClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: RecordStore,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let storage = match config.storage {
            StorageBackend::File => {
                Arc::new(FileStorage::new(&config.data_dir).await?) as Arc<dyn StorageClient>
            }
            StorageBackend::Memory => {
                tracing::warn!("in-memory storage: nothing will be persisted");
                Arc::new(MemoryStorage::default()) as Arc<dyn StorageClient>
            }
        };

        Ok(Self::from_parts(config, storage))
    }

    pub fn from_parts(config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        Self {
            config,
            store: RecordStore::new(storage),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(MemoryStorage::default()))
    }

    #[cfg(test)]
    pub fn fake_with(storage: Arc<dyn StorageClient>) -> Self {
        let config = Arc::new(AppConfig {
            storage: StorageBackend::Memory,
            data_dir: "unused".into(),
            host: "127.0.0.1".into(),
            port: 0,
            seed_products_file: None,
        });
        Self::from_parts(config, storage)
    }
}
