use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use hutch_db::Database;
use hutch_types::{Collection, Settings};
use serde_json::Value;

use crate::backend::StorageBackend;

/// Preferred backend: the SQLite object store. rusqlite is blocking, so
/// every call is moved onto tokio's blocking pool.
pub struct SqliteBackend {
    db: Arc<Database>,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    pub async fn open(path: PathBuf) -> Result<Self> {
        let db = tokio::task::spawn_blocking(move || Database::open(&path)).await??;
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.blocking(move |db| db.get_all(collection)).await
    }

    async fn replace_all(&self, collection: Collection, records: &[Value]) -> Result<()> {
        let records = records.to_vec();
        self.blocking(move |db| db.replace_all(collection, &records))
            .await
    }

    async fn insert_one(&self, collection: Collection, record: &Value) -> Result<()> {
        let record = record.clone();
        self.blocking(move |db| db.insert_one(collection, &record))
            .await
    }

    async fn delete_one(&self, collection: Collection, id: i64) -> Result<()> {
        self.blocking(move |db| db.delete_one(collection, id).map(|_| ()))
            .await
    }

    async fn load_settings(&self) -> Result<Settings> {
        let rows = self.blocking(|db| db.settings_rows()).await?;
        Ok(Settings::from_pairs(
            rows.into_iter().map(|row| (row.key, row.value)),
        ))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let pairs = settings.to_pairs();
        self.blocking(move |db| db.replace_settings(&pairs)).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.blocking(|db| db.clear_all()).await
    }
}
