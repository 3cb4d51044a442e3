//! Storage backend abstraction.
//!
//! The structured SQLite store and the flat key-value store both implement
//! [`StorageBackend`]. Records cross the trait as JSON values and settings as
//! the canonical [`Settings`] record; each backend owns its on-disk shape.

use anyhow::Result;
use async_trait::async_trait;
use hutch_types::{Collection, Settings};
use serde_json::Value;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Every record in a collection. Order is backend-defined.
    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>>;

    /// Replace the whole collection.
    async fn replace_all(&self, collection: Collection, records: &[Value]) -> Result<()>;

    /// Add one record without touching the rest.
    async fn insert_one(&self, collection: Collection, record: &Value) -> Result<()>;

    /// Remove a record by id. Absent ids are a no-op.
    async fn delete_one(&self, collection: Collection, id: i64) -> Result<()>;

    async fn load_settings(&self) -> Result<Settings>;

    async fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Empty every collection and the settings.
    async fn clear_all(&self) -> Result<()>;
}
