use hutch_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("select at least one item to check")]
    NothingSelected,

    #[error("no API key configured; add one in settings")]
    MissingApiKey,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    #[error("response carried no message")]
    EmptyResponse,
}
