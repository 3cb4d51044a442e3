//! JSON export and import of everything the store holds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hutch_types::{ExportDocument, ImportDocument, PhotoEntry, Record, WeightEntry};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::validate::check_weight;

/// What an import actually replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub weights: Option<usize>,
    pub photos: Option<usize>,
    pub settings: bool,
}

/// `rabbit-health-data-2024-01-03.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("rabbit-health-data-{}.json", date.format("%Y-%m-%d"))
}

impl Store {
    pub async fn export_document(&self) -> Result<ExportDocument> {
        Ok(ExportDocument {
            weights: self.read_collection::<WeightEntry>().await?,
            photos: self.read_collection::<PhotoEntry>().await?,
            settings: self.read_settings().await?,
        })
    }

    /// Pretty-printed export document.
    pub async fn export_json(&self) -> Result<String> {
        let doc = self.export_document().await?;
        serde_json::to_string_pretty(&doc).map_err(|e| StoreError::storage("export", e.into()))
    }

    /// Write the export into `dir` under the dated file name. Returns the path.
    pub async fn export_to_dir(&self, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
        let json = self.export_json().await?;
        let path = dir.join(export_file_name(date));
        tokio::fs::write(&path, json).await?;
        info!("Exported data to {}", path.display());
        Ok(path)
    }

    /// Parse `text` in full, then apply each key it carries. Nothing is
    /// written unless the whole payload parses.
    pub async fn import_json(&self, text: &str) -> Result<ImportSummary> {
        let doc: ImportDocument = serde_json::from_str(text).map_err(StoreError::MalformedImport)?;
        self.import_document(doc).await
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary> {
        let text = tokio::fs::read_to_string(path).await?;
        self.import_json(&text).await
    }

    /// Apply an already parsed document. Every entry is checked before the
    /// first write; a rejected document changes nothing.
    pub async fn import_document(&self, doc: ImportDocument) -> Result<ImportSummary> {
        if doc.is_empty() {
            info!("Import carried no weights, photos or settings");
            return Ok(ImportSummary::default());
        }

        if let Some(weights) = &doc.weights {
            ensure_unique_ids(weights)?;
            for entry in weights {
                check_weight(entry.weight)?;
            }
        }
        if let Some(photos) = &doc.photos {
            ensure_unique_ids(photos)?;
            let policy = self.photo_policy();
            for entry in photos {
                policy.check(&entry.data_url)?;
            }
        }

        let mut summary = ImportSummary::default();

        if let Some(weights) = &doc.weights {
            self.write_collection(weights).await?;
            summary.weights = Some(weights.len());
        }
        if let Some(photos) = &doc.photos {
            self.write_collection(photos).await?;
            summary.photos = Some(photos.len());
        }
        if let Some(settings) = &doc.settings {
            self.write_settings(settings).await?;
            summary.settings = true;
        }

        info!(
            weights = ?summary.weights,
            photos = ?summary.photos,
            settings = summary.settings,
            "Import applied"
        );
        Ok(summary)
    }
}

fn ensure_unique_ids<R: Record>(records: &[R]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(StoreError::DuplicateId {
                collection: R::COLLECTION,
                id: record.id(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hutch_types::Collection;

    #[test]
    fn file_name_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(export_file_name(date), "rabbit-health-data-2024-01-03.json");
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let json = r#"[
            {"id": 5, "weight": 1500, "date": "2024-01-01T00:00:00Z", "dateStr": ""},
            {"id": 5, "weight": 1510, "date": "2024-01-02T00:00:00Z", "dateStr": ""}
        ]"#;
        let weights: Vec<WeightEntry> = serde_json::from_str(json).unwrap();

        let err = ensure_unique_ids(&weights).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateId { collection: Collection::Weights, id: 5 }
        ));
    }
}
