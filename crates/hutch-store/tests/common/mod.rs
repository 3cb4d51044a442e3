#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use hutch_store::{KvBackend, SqliteBackend, StorageBackend, Store};
use hutch_types::{Collection, PhotoEntry, PhotoKind, Settings, WeightEntry};
use serde_json::Value;
use tempfile::TempDir;

pub const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Primary backend that errors on every call.
pub struct FailingBackend;

#[async_trait]
impl StorageBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn get_all(&self, _: Collection) -> Result<Vec<Value>> {
        bail!("get_all refused")
    }

    async fn replace_all(&self, _: Collection, _: &[Value]) -> Result<()> {
        bail!("replace_all refused")
    }

    async fn insert_one(&self, _: Collection, _: &Value) -> Result<()> {
        bail!("insert_one refused")
    }

    async fn delete_one(&self, _: Collection, _: i64) -> Result<()> {
        bail!("delete_one refused")
    }

    async fn load_settings(&self) -> Result<Settings> {
        bail!("load_settings refused")
    }

    async fn save_settings(&self, _: &Settings) -> Result<()> {
        bail!("save_settings refused")
    }

    async fn clear_all(&self) -> Result<()> {
        bail!("clear_all refused")
    }
}

/// Wraps a real backend and fails the first `failures` calls.
pub struct FlakyBackend {
    inner: SqliteBackend,
    failures: AtomicUsize,
}

impl FlakyBackend {
    pub fn new(inner: SqliteBackend, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }

    fn trip(&self) -> Result<()> {
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            bail!("flaky backend tripped");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FlakyBackend {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.trip()?;
        self.inner.get_all(collection).await
    }

    async fn replace_all(&self, collection: Collection, records: &[Value]) -> Result<()> {
        self.trip()?;
        self.inner.replace_all(collection, records).await
    }

    async fn insert_one(&self, collection: Collection, record: &Value) -> Result<()> {
        self.trip()?;
        self.inner.insert_one(collection, record).await
    }

    async fn delete_one(&self, collection: Collection, id: i64) -> Result<()> {
        self.trip()?;
        self.inner.delete_one(collection, id).await
    }

    async fn load_settings(&self) -> Result<Settings> {
        self.trip()?;
        self.inner.load_settings().await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.trip()?;
        self.inner.save_settings(settings).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.trip()?;
        self.inner.clear_all().await
    }
}

/// The three store set-ups every contract test runs against.
#[derive(Debug, Clone, Copy)]
pub enum Setup {
    /// SQLite primary with key-value fallback.
    Structured,
    /// Primary never initialized.
    FallbackOnly,
    /// Primary initialized but failing every call.
    FailingPrimary,
}

pub const ALL_SETUPS: [Setup; 3] = [Setup::Structured, Setup::FallbackOnly, Setup::FailingPrimary];

pub async fn store(setup: Setup) -> (TempDir, Store) {
    hutch_store::logging::init();
    let dir = tempfile::tempdir().unwrap();
    let kv = KvBackend::open(dir.path().join("kv"), 5 * 1024 * 1024).unwrap();
    let store = Store::new(Arc::new(kv));

    match setup {
        Setup::Structured => {
            let path = dir.path().join("hutch.db");
            assert!(
                store
                    .initialize(|| async move {
                        let backend = SqliteBackend::open(path).await?;
                        Ok::<_, anyhow::Error>(Arc::new(backend) as Arc<dyn StorageBackend>)
                    })
                    .await
            );
        }
        Setup::FallbackOnly => {}
        Setup::FailingPrimary => {
            assert!(
                store
                    .initialize(|| async { Ok::<_, anyhow::Error>(Arc::new(FailingBackend) as Arc<dyn StorageBackend>) })
                    .await
            );
        }
    }

    (dir, store)
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 8, 30, 0).unwrap()
}

pub fn weight(id: i64, d: u32, grams: f64) -> WeightEntry {
    hutch_store::lifecycle::new_weight_entry(id, grams, day(d))
}

pub fn photo(id: i64, d: u32, kind: PhotoKind) -> PhotoEntry {
    hutch_store::lifecycle::new_photo_entry(id, kind, PNG.to_string(), day(d))
}

pub fn sorted_ids<T>(items: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    let mut ids: Vec<i64> = items.iter().map(id).collect();
    ids.sort();
    ids
}
