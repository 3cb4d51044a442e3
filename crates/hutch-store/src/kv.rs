use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use hutch_types::{Collection, SETTINGS_KEY, Settings};
use serde_json::Value;
use tracing::{debug, info};

use crate::backend::StorageBackend;
use crate::error::QuotaExceeded;

const BLOB_EXT: &str = "json";

/// Flat key → JSON blob store.
///
/// Each key is a single file `{dir}/{key}.json`. Writes go to a temp file
/// first and are renamed into place, so a reader sees either the old blob
/// or the new one. The sum of all blobs may not exceed `quota` bytes.
pub struct KvStore {
    dir: PathBuf,
    quota: u64,
    lock: Mutex<()>,
}

impl KvStore {
    pub fn open(dir: impl Into<PathBuf>, quota: u64) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating key-value directory {}", dir.display()))?;
        info!("Key-value store at {} (quota {} bytes)", dir.display(), quota);
        Ok(Self {
            dir,
            quota,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.guard()?;
        self.read_blob(key)
    }

    pub fn set(&self, key: &str, value: &Value) -> Result<()> {
        let _guard = self.guard()?;
        self.write_blob(key, value)
    }

    /// Read-modify-write under the store lock. Returning `None` from `f`
    /// leaves the key untouched.
    pub fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<Value>) -> Result<Option<Value>>,
    {
        let _guard = self.guard()?;
        let current = self.read_blob(key)?;
        if let Some(next) = f(current)? {
            self.write_blob(key, &next)?;
        }
        Ok(())
    }

    /// Remove every key. Clearing an empty store is fine.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.guard()?;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        debug!("Cleared key-value store at {}", self.dir.display());
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.guard()?;
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(BLOB_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Bytes currently used by all blobs.
    pub fn usage_bytes(&self) -> Result<u64> {
        let _guard = self.guard()?;
        self.usage_excluding(None)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| anyhow!("key-value lock poisoned: {}", e))
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!("invalid key-value key {:?}", key);
        }
        Ok(self.dir.join(format!("{}.{}", key, BLOB_EXT)))
    }

    fn read_blob(&self, key: &str) -> Result<Option<Value>> {
        let path = self.blob_path(key)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&text)
            .with_context(|| format!("key {:?} does not hold valid JSON", key))?;
        Ok(Some(value))
    }

    fn write_blob(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.blob_path(key)?;
        let bytes = serde_json::to_vec(value)?;

        let needed = self.usage_excluding(Some(&path))? + bytes.len() as u64;
        if needed > self.quota {
            return Err(QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota,
            }
            .into());
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote key {:?} ({} bytes)", key, bytes.len());
        Ok(())
    }

    fn usage_excluding(&self, skip: Option<&Path>) -> Result<u64> {
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if Some(path.as_path()) == skip {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) == Some(BLOB_EXT) {
                total += entry.metadata()?.len();
            }
        }
        Ok(total)
    }
}

/// Fallback backend: collections are JSON arrays and settings one flat
/// blob, all inside a [`KvStore`]. File access and quota scans run on
/// tokio's blocking pool, like [`crate::SqliteBackend`].
pub struct KvBackend {
    store: Arc<KvStore>,
}

impl KvBackend {
    pub fn new(store: KvStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn open(dir: impl Into<PathBuf>, quota: u64) -> Result<Self> {
        Ok(Self::new(KvStore::open(dir, quota)?))
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&KvStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store)).await?
    }
}

fn into_records(collection: Collection, blob: Option<Value>) -> Result<Vec<Value>> {
    match blob {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records),
        Some(_) => bail!("key {:?} does not hold an array", collection.name()),
    }
}

#[async_trait]
impl StorageBackend for KvBackend {
    fn name(&self) -> &'static str {
        "key-value"
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.blocking(move |store| into_records(collection, store.get(collection.name())?))
            .await
    }

    async fn replace_all(&self, collection: Collection, records: &[Value]) -> Result<()> {
        let blob = Value::Array(records.to_vec());
        self.blocking(move |store| store.set(collection.name(), &blob))
            .await
    }

    async fn insert_one(&self, collection: Collection, record: &Value) -> Result<()> {
        let record = record.clone();
        self.blocking(move |store| {
            store.update(collection.name(), |current| {
                let mut records = into_records(collection, current)?;
                records.push(record);
                Ok(Some(Value::Array(records)))
            })
        })
        .await
    }

    async fn delete_one(&self, collection: Collection, id: i64) -> Result<()> {
        self.blocking(move |store| {
            store.update(collection.name(), |current| {
                if current.is_none() {
                    return Ok(None);
                }
                let mut records = into_records(collection, current)?;
                let before = records.len();
                records.retain(|r| r.get("id").and_then(Value::as_i64) != Some(id));
                if records.len() == before {
                    return Ok(None);
                }
                Ok(Some(Value::Array(records)))
            })
        })
        .await
    }

    async fn load_settings(&self) -> Result<Settings> {
        match self.blocking(|store| store.get(SETTINGS_KEY)).await? {
            None | Some(Value::Null) => Ok(Settings::default()),
            Some(blob) => serde_json::from_value(blob).context("settings blob is malformed"),
        }
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let blob = serde_json::to_value(settings)?;
        self.blocking(move |store| store.set(SETTINGS_KEY, &blob)).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.blocking(|store| store.clear()).await
    }
}
