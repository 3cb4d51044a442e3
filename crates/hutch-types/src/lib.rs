//! Shared data model for the hutch workspace: weight and photo entries,
//! the settings record, and the import/export document shapes.

pub mod export;
pub mod models;

pub use export::{ExportDocument, ImportDocument};
pub use models::{
    Collection, PhotoEntry, PhotoKind, Record, SETTINGS_KEY, Settings, SettingsField, WeightEntry,
};
