use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct HealthConfig {
    /// API root without trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HealthConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("HUTCH_OPENAI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let model = lookup("HUTCH_HEALTH_MODEL").unwrap_or(defaults.model);
        let timeout = match lookup("HUTCH_HEALTH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse().context("HUTCH_HEALTH_TIMEOUT_SECS must be an integer")?,
            ),
            None => defaults.timeout,
        };

        Ok(Self {
            base_url,
            model,
            timeout,
            ..defaults
        })
    }

    /// Config pointing at another API root, everything else default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let config = HealthConfig::from_lookup(|k| {
            (k == "HUTCH_OPENAI_BASE_URL").then(|| "http://localhost:9000/v1/".to_string())
        })
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn timeout_override() {
        let config =
            HealthConfig::from_lookup(|k| (k == "HUTCH_HEALTH_TIMEOUT_SECS").then(|| "5".into())).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
