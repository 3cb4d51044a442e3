//! Local persistence for hutch.
//!
//! [`Store`] is the one thing callers talk to. It fronts two backends with
//! the same [`StorageBackend`] contract: SQLite (preferred) and a flat
//! key-value store of JSON blobs (fallback). Errors from the preferred
//! backend are absorbed by redirecting the call to the fallback; only a
//! fallback failure reaches the caller.

pub mod backend;
pub mod config;
pub mod error;
pub mod kv;
pub mod lifecycle;
pub mod logging;
pub mod sqlite;
pub mod store;
pub mod transfer;
pub mod validate;

pub use backend::StorageBackend;
pub use config::StoreConfig;
pub use error::{QuotaExceeded, Result, StoreError, ValidationError};
pub use kv::{KvBackend, KvStore};
pub use lifecycle::{DEFAULT_RECENT_LIMIT, IdGenerator, RecentEntry, RecentKind, merge_recent};
pub use sqlite::SqliteBackend;
pub use store::Store;
pub use transfer::{ImportSummary, export_file_name};
pub use validate::{PhotoPolicy, check_weight, parse_weight};
