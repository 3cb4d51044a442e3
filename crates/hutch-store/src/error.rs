use hutch_types::Collection;
use thiserror::Error;

/// Raised by the key-value store when a write would push it past its quota.
#[derive(Debug, Error)]
#[error("storage quota exceeded writing {key:?}: {needed} bytes needed, quota is {quota}")]
pub struct QuotaExceeded {
    pub key: String,
    pub needed: u64,
    pub quota: u64,
}

/// Input rejected before any storage call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("weight must be a positive number of grams, got {0:?}")]
    InvalidWeight(String),

    #[error("photo must be a base64 data URI")]
    NotADataUrl,

    #[error("unsupported photo encoding {0:?}")]
    UnsupportedEncoding(String),

    #[error("photo payload is not valid base64")]
    InvalidBase64,

    #[error("photo is empty")]
    EmptyPhoto,

    #[error("photo is {size} bytes, limit is {limit}")]
    PhotoTooLarge { size: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The fallback store failed too; nothing absorbed the error.
    #[error("storage failed during {op}: {cause:#}")]
    Storage { op: &'static str, cause: anyhow::Error },

    #[error("invalid import file: {0}")]
    MalformedImport(#[source] serde_json::Error),

    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: Collection, id: i64 },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn storage(op: &'static str, cause: anyhow::Error) -> Self {
        Self::Storage { op, cause }
    }

    /// True when the final write failed because the fallback store is full.
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Self::Storage { cause, .. } => cause.downcast_ref::<QuotaExceeded>().is_some(),
            _ => false,
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
