use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// -- Collections --

/// The two record collections. Settings live beside them under their own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Weights,
    Photos,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Weights, Collection::Photos];

    /// Logical name, shared by the structured store and the flat key-value store.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Weights => "weights",
            Collection::Photos => "photos",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key the settings record is stored under.
pub const SETTINGS_KEY: &str = "settings";

/// A record owned by exactly one collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> i64;
    fn date(&self) -> DateTime<Utc>;
}

// -- Entries --

/// One body-weight measurement, in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub id: i64,
    pub weight: f64,
    pub date: DateTime<Utc>,
    pub date_str: String,
}

impl Record for WeightEntry {
    const COLLECTION: Collection = Collection::Weights;

    fn id(&self) -> i64 {
        self.id
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoKind {
    Fur,
    Poop,
}

impl PhotoKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoKind::Fur => "fur",
            PhotoKind::Poop => "poop",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhotoKind::Fur => "Fur",
            PhotoKind::Poop => "Droppings",
        }
    }
}

/// A categorized photo. `data_url` is an embedded `data:` URI and is
/// otherwise opaque to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: PhotoKind,
    pub data_url: String,
    pub date: DateTime<Utc>,
    pub date_str: String,
    pub time_str: String,
}

impl Record for PhotoEntry {
    const COLLECTION: Collection = Collection::Photos;

    fn id(&self) -> i64 {
        self.id
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

// -- Settings --

/// Profile settings. A single record, never a collection.
///
/// Absent fields deserialize to the empty string so readers always see
/// all four.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub rabbit_name: String,
    pub rabbit_breed: String,
    pub rabbit_birthday: String,
    pub openai_api_key: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.openai_api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Settings")
            .field("rabbit_name", &self.rabbit_name)
            .field("rabbit_breed", &self.rabbit_breed)
            .field("rabbit_birthday", &self.rabbit_birthday)
            .field("openai_api_key", &key)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    RabbitName,
    RabbitBreed,
    RabbitBirthday,
    OpenaiApiKey,
}

impl SettingsField {
    pub const ALL: [SettingsField; 4] = [
        SettingsField::RabbitName,
        SettingsField::RabbitBreed,
        SettingsField::RabbitBirthday,
        SettingsField::OpenaiApiKey,
    ];

    /// Row key used when settings are stored one row per field.
    pub fn key(self) -> &'static str {
        match self {
            SettingsField::RabbitName => "rabbitName",
            SettingsField::RabbitBreed => "rabbitBreed",
            SettingsField::RabbitBirthday => "rabbitBirthday",
            SettingsField::OpenaiApiKey => "openaiApiKey",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl Settings {
    pub fn get(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::RabbitName => &self.rabbit_name,
            SettingsField::RabbitBreed => &self.rabbit_breed,
            SettingsField::RabbitBirthday => &self.rabbit_birthday,
            SettingsField::OpenaiApiKey => &self.openai_api_key,
        }
    }

    pub fn set(&mut self, field: SettingsField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SettingsField::RabbitName => self.rabbit_name = value,
            SettingsField::RabbitBreed => self.rabbit_breed = value,
            SettingsField::RabbitBirthday => self.rabbit_birthday = value,
            SettingsField::OpenaiApiKey => self.openai_api_key = value,
        }
    }

    /// Unfold into `(key, value)` rows, one per field.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        SettingsField::ALL
            .into_iter()
            .map(|field| (field.key().to_string(), self.get(field).to_string()))
            .collect()
    }

    /// Fold `(key, value)` rows back into one record. Unknown keys are
    /// ignored, missing ones stay empty.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Settings::default();
        for (key, value) in pairs {
            if let Some(field) = SettingsField::from_key(key.as_ref()) {
                settings.set(field, value);
            }
        }
        settings
    }

    pub fn has_api_key(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }
}
