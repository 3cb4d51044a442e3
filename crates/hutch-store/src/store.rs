use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use hutch_types::{PhotoEntry, PhotoKind, Record, Settings, WeightEntry};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::backend::StorageBackend;
use crate::config::{DEFAULT_MAX_PHOTO_BYTES, StoreConfig};
use crate::error::{Result, StoreError};
use crate::kv::KvBackend;
use crate::lifecycle::{self, IdGenerator, RecentEntry};
use crate::sqlite::SqliteBackend;
use crate::validate::{PhotoPolicy, parse_weight};

type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// The single entry point to persisted state.
///
/// Holds the key-value fallback and, once [`Store::initialize`] has
/// succeeded, the structured primary. Each call tries the primary first and
/// redirects just that call to the fallback if the primary errors. The
/// primary is tried again on the next call. Only a fallback failure reaches
/// the caller.
pub struct Store {
    fallback: Arc<dyn StorageBackend>,
    primary: OnceCell<Option<Arc<dyn StorageBackend>>>,
    ids: IdGenerator,
    photo_policy: PhotoPolicy,
}

impl Store {
    pub fn new(fallback: Arc<dyn StorageBackend>) -> Self {
        Self {
            fallback,
            primary: OnceCell::new(),
            ids: IdGenerator::new(),
            photo_policy: PhotoPolicy::new(DEFAULT_MAX_PHOTO_BYTES),
        }
    }

    pub fn with_photo_policy(mut self, policy: PhotoPolicy) -> Self {
        self.photo_policy = policy;
        self
    }

    /// Key-value fallback under `{data_dir}/kv`, SQLite primary at
    /// `{data_dir}/{db_file}`. A primary that cannot be opened is logged
    /// and the session runs on the fallback alone.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let kv = KvBackend::open(config.kv_dir(), config.kv_quota_bytes)
            .map_err(|e| StoreError::storage("open", e))?;
        let store = Self::new(Arc::new(kv)).with_photo_policy(PhotoPolicy::new(config.max_photo_bytes));

        let db_path = config.db_path();
        store
            .initialize(|| async move {
                let backend = SqliteBackend::open(db_path).await?;
                Ok::<_, anyhow::Error>(Arc::new(backend) as Arc<dyn StorageBackend>)
            })
            .await;

        Ok(store)
    }

    /// Bring up the primary backend. Runs `open` at most once per store;
    /// later calls return the first outcome without calling `open`.
    pub async fn initialize<F, Fut>(&self, open: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Arc<dyn StorageBackend>>>,
    {
        let primary = self
            .primary
            .get_or_init(|| async move {
                match open().await {
                    Ok(backend) => {
                        info!("Primary storage ready ({})", backend.name());
                        Some(backend)
                    }
                    Err(e) => {
                        warn!("Primary storage unavailable, using fallback for this session: {:#}", e);
                        None
                    }
                }
            })
            .await;
        primary.is_some()
    }

    pub fn photo_policy(&self) -> PhotoPolicy {
        self.photo_policy
    }

    /// Name of the backend asked first.
    pub fn backend_name(&self) -> &'static str {
        self.primary().unwrap_or(&self.fallback).name()
    }

    fn primary(&self) -> Option<&Arc<dyn StorageBackend>> {
        self.primary.get().and_then(Option::as_ref)
    }

    async fn with_fallback<'a, T, F>(&'a self, op: &'static str, f: F) -> Result<T>
    where
        F: Fn(&'a dyn StorageBackend) -> BackendFuture<'a, T>,
    {
        if let Some(primary) = self.primary() {
            match f(primary.as_ref()).await {
                Ok(value) => return Ok(value),
                Err(e) => warn!(
                    backend = primary.name(),
                    op,
                    "Primary storage failed, redirecting to fallback: {:#}",
                    e
                ),
            }
        }

        f(self.fallback.as_ref())
            .await
            .map_err(|e| StoreError::storage(op, e))
    }

    // -- Collections --

    pub async fn read_collection<R: Record>(&self) -> Result<Vec<R>> {
        self.with_fallback("read_collection", |backend| {
            Box::pin(async move { decode::<R>(backend.get_all(R::COLLECTION).await?) })
        })
        .await
    }

    /// Replace a whole collection. Readers see either the old collection or
    /// the new one.
    pub async fn write_collection<R: Record>(&self, records: &[R]) -> Result<()> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::storage("write_collection", e.into()))?;

        debug!("Writing {} records to {}", values.len(), R::COLLECTION);
        self.with_fallback("write_collection", |backend| {
            backend.replace_all(R::COLLECTION, &values)
        })
        .await
    }

    /// Add one record without reading the collection first.
    pub async fn append_record<R: Record>(&self, record: &R) -> Result<()> {
        let value = serde_json::to_value(record)
            .map_err(|e| StoreError::storage("append_record", e.into()))?;

        self.with_fallback("append_record", |backend| {
            backend.insert_one(R::COLLECTION, &value)
        })
        .await
    }

    /// Remove a record by id. Unknown ids are a no-op.
    pub async fn delete_record<R: Record>(&self, id: i64) -> Result<()> {
        self.with_fallback("delete_record", |backend| {
            backend.delete_one(R::COLLECTION, id)
        })
        .await
    }

    // -- Settings --

    pub async fn read_settings(&self) -> Result<Settings> {
        self.with_fallback("read_settings", |backend| backend.load_settings())
            .await
    }

    pub async fn write_settings(&self, settings: &Settings) -> Result<()> {
        self.with_fallback("write_settings", |backend| backend.save_settings(settings))
            .await
    }

    // -- Everything --

    /// Empty both backends. Primary errors are logged; the fallback is
    /// always cleared and its error, if any, is returned.
    pub async fn clear_everything(&self) -> Result<()> {
        if let Some(primary) = self.primary() {
            if let Err(e) = primary.clear_all().await {
                warn!(backend = primary.name(), "Clearing primary storage failed: {:#}", e);
            }
        }

        self.fallback
            .clear_all()
            .await
            .map_err(|e| StoreError::storage("clear_everything", e))?;

        info!("All stored data cleared");
        Ok(())
    }

    // -- User actions --

    /// Validate weight input and append a new entry stamped now.
    pub async fn record_weight(&self, input: &str) -> Result<WeightEntry> {
        let grams = parse_weight(input)?;
        let entry = lifecycle::new_weight_entry(self.ids.next_id(), grams, Utc::now());
        self.append_record(&entry).await?;
        info!(id = entry.id, grams, "Recorded weight");
        Ok(entry)
    }

    /// Validate a photo against the store's policy and append it.
    pub async fn record_photo(&self, kind: PhotoKind, data_url: impl Into<String>) -> Result<PhotoEntry> {
        let data_url = data_url.into();
        self.photo_policy.check(&data_url)?;
        let entry = lifecycle::new_photo_entry(self.ids.next_id(), kind, data_url, Utc::now());
        self.append_record(&entry).await?;
        info!(id = entry.id, kind = kind.as_str(), "Recorded photo");
        Ok(entry)
    }

    /// Weights and photos merged newest first, at most `limit` entries.
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<RecentEntry>> {
        let weights = self.read_collection::<WeightEntry>().await?;
        let photos = self.read_collection::<PhotoEntry>().await?;
        Ok(lifecycle::merge_recent(&weights, &photos, limit))
    }

    /// Weights oldest first, the order a chart plots them in.
    pub async fn weights_chronological(&self) -> Result<Vec<WeightEntry>> {
        let mut weights = self.read_collection::<WeightEntry>().await?;
        weights.sort_by_key(|w| (w.date, w.id));
        Ok(weights)
    }

    /// Photos newest first, optionally limited to one kind.
    pub async fn photos_newest_first(&self, kind: Option<PhotoKind>) -> Result<Vec<PhotoEntry>> {
        let mut photos = self.read_collection::<PhotoEntry>().await?;
        if let Some(kind) = kind {
            photos.retain(|p| p.kind == kind);
        }
        photos.sort_by_key(|p| std::cmp::Reverse((p.date, p.id)));
        Ok(photos)
    }
}

fn decode<R: Record>(values: Vec<Value>) -> anyhow::Result<Vec<R>> {
    values
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<R>, _>>()
        .with_context(|| format!("stored {} record is malformed", R::COLLECTION))
}
