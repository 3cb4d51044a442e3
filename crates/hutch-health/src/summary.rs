//! The plain-text data summary sent along with a health check.

use hutch_types::{PhotoEntry, PhotoKind, WeightEntry};

use crate::error::HealthError;

/// Weight entries included in a summary, most recent last.
pub const SUMMARY_WEIGHT_COUNT: usize = 5;
/// Photo counts are capped at this many per kind.
pub const SUMMARY_PHOTO_CAP: usize = 3;

/// What the user ticked before asking for a check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheckOptions {
    pub weight: bool,
    pub fur: bool,
    pub poop: bool,
    pub question: Option<String>,
}

impl HealthCheckOptions {
    fn question(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// At least one data category ticked. A question alone is not enough.
    pub fn has_selection(&self) -> bool {
        self.weight || self.fur || self.poop
    }
}

/// Assemble the summary for the selected sources.
///
/// `weights` may be in any order; the newest [`SUMMARY_WEIGHT_COUNT`] are
/// listed oldest first. Photos are reported as counts only, never content.
/// Every selected category gets its line, even with nothing recorded.
pub fn build_summary(
    options: &HealthCheckOptions,
    weights: &[WeightEntry],
    photos: &[PhotoEntry],
) -> Result<String, HealthError> {
    if !options.has_selection() {
        return Err(HealthError::NothingSelected);
    }

    let mut summary = String::new();

    if options.weight {
        let mut ordered: Vec<&WeightEntry> = weights.iter().collect();
        ordered.sort_by_key(|w| (w.date, w.id));
        let tail = &ordered[ordered.len().saturating_sub(SUMMARY_WEIGHT_COUNT)..];
        let listed: Vec<String> = tail
            .iter()
            .map(|w| format!("{}: {}g", w.date_str, w.weight))
            .collect();
        if listed.is_empty() {
            summary.push_str("Weight data: none recorded\n");
        } else {
            summary.push_str(&format!("Weight data: {}\n", listed.join(", ")));
        }
    }

    for (selected, kind) in [(options.fur, PhotoKind::Fur), (options.poop, PhotoKind::Poop)] {
        if !selected {
            continue;
        }
        let count = photos.iter().filter(|p| p.kind == kind).count();
        summary.push_str(&format!(
            "{} photos: {} recent photos on file\n",
            kind.label(),
            count.min(SUMMARY_PHOTO_CAP)
        ));
    }

    if let Some(question) = options.question() {
        summary.push_str(&format!("Additional question: {}\n", question));
    }

    Ok(summary)
}
