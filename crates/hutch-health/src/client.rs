use hutch_store::Store;
use hutch_types::{PhotoEntry, WeightEntry};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::HealthConfig;
use crate::error::HealthError;
use crate::schema::{ChatMessage, ChatRequest, ChatResponse};
use crate::summary::{HealthCheckOptions, build_summary};

/// Shown in place of the assessment when the request itself fails.
pub const HEALTH_CHECK_FAILED_TEXT: &str =
    "The health check could not be completed. Check your API key and network connection, then try again.";

pub const SYSTEM_INSTRUCTION: &str = "You are a veterinary assistant for pet rabbits. Assess the rabbit's \
     health from the data provided. Do not give a medical diagnosis; offer general care advice and \
     suggest a vet visit when something looks concerning.";

/// Client for an OpenAI-compatible chat-completion API.
#[derive(Clone)]
pub struct HealthClient {
    http: Client,
    config: HealthConfig,
}

impl HealthClient {
    pub fn new(config: HealthConfig) -> Result<Self, HealthError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Send `summary` for assessment and return the reply text.
    pub async fn complete(&self, api_key: &str, summary: &str) -> Result<String, HealthError> {
        let prompt = format!("Please assess the following rabbit health data:\n{}", summary);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(HealthError::Status(resp.status().as_u16()));
        }

        let body: ChatResponse = resp.json().await?;
        body.into_text().ok_or(HealthError::EmptyResponse)
    }

    /// Whether the endpoint accepts `api_key`. Transport failures are errors;
    /// a rejected key is `Ok(false)`.
    pub async fn verify_api_key(&self, api_key: &str) -> Result<bool, HealthError> {
        let resp = self
            .http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(api_key)
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Run a health check against what `store` holds.
    ///
    /// Missing selection or API key fail before any request is made. A
    /// failed request is logged and answered with
    /// [`HEALTH_CHECK_FAILED_TEXT`]. There is no retry.
    pub async fn check(&self, store: &Store, options: &HealthCheckOptions) -> Result<String, HealthError> {
        if !options.has_selection() {
            return Err(HealthError::NothingSelected);
        }

        let settings = store.read_settings().await?;
        if !settings.has_api_key() {
            return Err(HealthError::MissingApiKey);
        }

        let weights = if options.weight {
            store.read_collection::<WeightEntry>().await?
        } else {
            Vec::new()
        };
        let photos = if options.fur || options.poop {
            store.read_collection::<PhotoEntry>().await?
        } else {
            Vec::new()
        };

        let summary = build_summary(options, &weights, &photos)?;

        match self.complete(settings.openai_api_key.trim(), &summary).await {
            Ok(text) => {
                info!(model = %self.config.model, "Health check completed");
                Ok(text)
            }
            Err(e) => {
                warn!("Health check request failed: {}", e);
                Ok(HEALTH_CHECK_FAILED_TEXT.to_string())
            }
        }
    }
}
