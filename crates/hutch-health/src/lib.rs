//! Health check collaborator: turns stored weights and photos into a short
//! summary and asks a chat-completion API for an assessment.

pub mod client;
pub mod config;
pub mod error;
mod schema;
pub mod summary;

pub use client::{HEALTH_CHECK_FAILED_TEXT, HealthClient, SYSTEM_INSTRUCTION};
pub use config::HealthConfig;
pub use error::HealthError;
pub use summary::{HealthCheckOptions, build_summary};
