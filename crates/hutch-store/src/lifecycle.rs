//! Record lifecycle: id assignment, entry construction and the merged
//! "recent activity" view.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, Utc};
use hutch_types::{PhotoEntry, PhotoKind, WeightEntry};

/// Entries shown in the recent activity view by default.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Hands out ids from the current time in milliseconds.
///
/// Ids are strictly increasing per generator: two entries created in the
/// same millisecond get consecutive values instead of colliding.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        self.next_id_at(Utc::now())
    }

    pub fn next_id_at(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

/// Display date, e.g. `2024/1/3`, in local time.
pub fn display_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y/%-m/%-d").to_string()
}

/// Display time, e.g. `9:05:00`, in local time.
pub fn display_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-H:%M:%S").to_string()
}

pub fn new_weight_entry(id: i64, grams: f64, at: DateTime<Utc>) -> WeightEntry {
    WeightEntry {
        id,
        weight: grams,
        date: at,
        date_str: display_date(at),
    }
}

pub fn new_photo_entry(id: i64, kind: PhotoKind, data_url: String, at: DateTime<Utc>) -> PhotoEntry {
    PhotoEntry {
        id,
        kind,
        data_url,
        date: at,
        date_str: display_date(at),
        time_str: display_time(at),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecentKind {
    Weight { grams: f64 },
    Photo { kind: PhotoKind },
}

/// One line of the recent activity view.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentEntry {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub date_str: String,
    pub kind: RecentKind,
}

impl RecentEntry {
    pub fn summary(&self) -> String {
        match self.kind {
            RecentKind::Weight { grams } => format!("Weight: {}g ({})", grams, self.date_str),
            RecentKind::Photo { kind } => format!("{} photo ({})", kind.label(), self.date_str),
        }
    }
}

impl From<&WeightEntry> for RecentEntry {
    fn from(entry: &WeightEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            date_str: entry.date_str.clone(),
            kind: RecentKind::Weight { grams: entry.weight },
        }
    }
}

impl From<&PhotoEntry> for RecentEntry {
    fn from(entry: &PhotoEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            date_str: entry.date_str.clone(),
            kind: RecentKind::Photo { kind: entry.kind },
        }
    }
}

/// Merge both collections newest first and keep the `limit` most recent.
/// Equal timestamps fall back to the larger id first.
pub fn merge_recent(weights: &[WeightEntry], photos: &[PhotoEntry], limit: usize) -> Vec<RecentEntry> {
    let mut merged: Vec<RecentEntry> = weights
        .iter()
        .map(RecentEntry::from)
        .chain(photos.iter().map(RecentEntry::from))
        .collect();

    merged.sort_by_key(|entry| Reverse((entry.date, entry.id)));
    merged.truncate(limit);
    merged
}
