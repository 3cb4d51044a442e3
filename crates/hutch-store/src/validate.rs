use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::ValidationError;

/// Image types accepted in photo data URIs.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Parse user weight input in grams. Must be a finite number above zero.
pub fn parse_weight(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(grams) => check_weight(grams),
        Err(_) => Err(ValidationError::InvalidWeight(trimmed.to_string())),
    }
}

/// A stored weight must be a finite number of grams above zero.
pub fn check_weight(grams: f64) -> Result<f64, ValidationError> {
    if grams.is_finite() && grams > 0.0 {
        Ok(grams)
    } else {
        Err(ValidationError::InvalidWeight(grams.to_string()))
    }
}

/// Checks applied to a photo before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoPolicy {
    /// Limit on the full data URI, header included.
    pub max_bytes: usize,
}

impl PhotoPolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn check(&self, data_url: &str) -> Result<(), ValidationError> {
        if data_url.len() > self.max_bytes {
            return Err(ValidationError::PhotoTooLarge {
                size: data_url.len(),
                limit: self.max_bytes,
            });
        }

        let rest = data_url
            .strip_prefix("data:")
            .ok_or(ValidationError::NotADataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(ValidationError::NotADataUrl)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(ValidationError::NotADataUrl)?;

        if !ACCEPTED_IMAGE_TYPES.contains(&mime.to_ascii_lowercase().as_str()) {
            return Err(ValidationError::UnsupportedEncoding(mime.to_string()));
        }
        if payload.is_empty() {
            return Err(ValidationError::EmptyPhoto);
        }
        BASE64
            .decode(payload)
            .map_err(|_| ValidationError::InvalidBase64)?;

        Ok(())
    }
}
