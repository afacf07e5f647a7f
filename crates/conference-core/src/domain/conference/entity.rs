//! Conference entity and partial-update merge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A conference record
///
/// `id` is assigned by the primary store on insert and never changes after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub date: DateTime<Utc>,
}

impl Conference {
    /// Create a conference that has not been stored yet
    pub fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: name.into(),
            date,
        }
    }

    /// Set the identifier
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Apply a merge patch to this conference
    pub fn merged_with(&self, patch: &ConferencePatch) -> Self {
        merge(self, patch)
    }
}

/// Sparse update for a conference
///
/// A field left out of the patch (or sent as `null`) leaves the stored value
/// alone. An empty string is a value and overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferencePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl ConferencePatch {
    /// Patch targeting the given id with no field changes
    pub fn for_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Whether the patch changes any field
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date.is_none()
    }
}

impl From<Conference> for ConferencePatch {
    fn from(conference: Conference) -> Self {
        Self {
            id: conference.id,
            name: Some(conference.name),
            date: Some(conference.date),
        }
    }
}

/// Compute the new state of `existing` after applying `patch`.
///
/// The id of `existing` is kept as is; callers check the patch id beforehand.
pub fn merge(existing: &Conference, patch: &ConferencePatch) -> Conference {
    let mut merged = existing.clone();
    if let Some(name) = &patch.name {
        merged.name = name.clone();
    }
    if let Some(date) = patch.date {
        merged.date = date;
    }
    merged
}
