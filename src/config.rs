use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Scraped product listing imported into an empty catalog at startup.
    pub seed_products_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = match std::env::var("STORAGE").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("file") | Err(_) => StorageBackend::File,
            Ok(other) => anyhow::bail!("unknown STORAGE backend {other:?}"),
        };
        let data_dir: PathBuf = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "backend/data".into())
            .into();
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>()?,
            Err(_) => 5000,
        };
        let seed_products_file = std::env::var("SEED_PRODUCTS_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            storage,
            data_dir,
            host,
            port,
            seed_products_file,
        })
    }
}
