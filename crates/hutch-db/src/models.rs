//! Row shapes for the record and settings tables. Records keep their full
//! JSON in `body`; the other columns are lifted copies used for indexing
//! and ordering.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat};
use hutch_types::Collection;
use serde_json::Value;

pub struct RecordRow {
    pub id: i64,
    pub kind: Option<String>,
    pub date: String,
    pub body: String,
}

pub struct SettingRow {
    pub key: String,
    pub value: String,
}

impl RecordRow {
    /// Lift the indexed fields out of a record. Dates are normalized to
    /// millisecond UTC so that text ordering matches time ordering.
    pub fn from_value(collection: Collection, record: &Value) -> Result<Self> {
        let id = record
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("{} record has no integer id", collection))?;

        let raw_date = record
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("{} record {} has no date", collection, id))?;
        let date = DateTime::parse_from_rfc3339(raw_date)
            .with_context(|| format!("{} record {} has invalid date {:?}", collection, id, raw_date))?
            .to_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let kind = match collection {
            Collection::Weights => None,
            Collection::Photos => Some(
                record
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow!("photo record {} has no type", id))?
                    .to_string(),
            ),
        };

        Ok(Self {
            id,
            kind,
            date,
            body: serde_json::to_string(record)?,
        })
    }

    pub fn into_value(self) -> Result<Value> {
        serde_json::from_str(&self.body)
            .with_context(|| format!("stored record {} is not valid JSON", self.id))
    }
}
