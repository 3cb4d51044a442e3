use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_DATA_DIR: &str = "./hutch-data";
pub const DEFAULT_DB_FILE: &str = "hutch.db";
/// Same ballpark as a browser's local storage allowance.
pub const DEFAULT_KV_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root for both backends: the SQLite file and the `kv/` directory.
    pub data_dir: PathBuf,
    pub db_file: String,
    pub kv_quota_bytes: u64,
    pub max_photo_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            db_file: DEFAULT_DB_FILE.to_string(),
            kv_quota_bytes: DEFAULT_KV_QUOTA_BYTES,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }
}

impl StoreConfig {
    /// Read `HUTCH_*` variables, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("HUTCH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let db_file = lookup("HUTCH_DB_FILE").unwrap_or(defaults.db_file);
        let kv_quota_bytes = match lookup("HUTCH_KV_QUOTA_BYTES") {
            Some(v) => v.parse().context("HUTCH_KV_QUOTA_BYTES must be an integer")?,
            None => defaults.kv_quota_bytes,
        };
        let max_photo_bytes = match lookup("HUTCH_MAX_PHOTO_BYTES") {
            Some(v) => v.parse().context("HUTCH_MAX_PHOTO_BYTES must be an integer")?,
            None => defaults.max_photo_bytes,
        };

        Ok(Self {
            data_dir,
            db_file,
            kv_quota_bytes,
            max_photo_bytes,
        })
    }

    /// Config rooted at `dir` with every other value defaulted.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn kv_dir(&self) -> PathBuf {
        self.data_dir.join("kv")
    }
}
