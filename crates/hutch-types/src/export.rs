use serde::{Deserialize, Serialize};

use crate::models::{PhotoEntry, Settings, WeightEntry};

// -- Export --

/// Full dump of stored state, written as pretty-printed JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub weights: Vec<WeightEntry>,
    pub photos: Vec<PhotoEntry>,
    pub settings: Settings,
}

// -- Import --

/// Import payload. Each top-level key is optional and applied on its own,
/// so a file carrying only `weights` leaves photos and settings alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub weights: Option<Vec<WeightEntry>>,
    #[serde(default)]
    pub photos: Option<Vec<PhotoEntry>>,
    #[serde(default)]
    pub settings: Option<Settings>,
}

impl ImportDocument {
    pub fn is_empty(&self) -> bool {
        self.weights.is_none() && self.photos.is_none() && self.settings.is_none()
    }
}

impl From<ExportDocument> for ImportDocument {
    fn from(doc: ExportDocument) -> Self {
        Self {
            weights: Some(doc.weights),
            photos: Some(doc.photos),
            settings: Some(doc.settings),
        }
    }
}
