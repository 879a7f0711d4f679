//! Monthly submission checklist kept on each organization's master report.
//!
//! An academic year runs from August to May. OSAS ticks a month once the
//! organization's report for it has been received, and the report status
//! follows from how many months are ticked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
mod tests;

/// Checklist keys in academic order.
pub const ACADEMIC_MONTHS: [&str; 10] = [
    "august",
    "september",
    "october",
    "november",
    "december",
    "january",
    "february",
    "march",
    "april",
    "may",
];

/// Lifecycle status of a financial report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Nothing received yet, or a snapshot waiting to be submitted.
    #[serde(rename = "Pending Review")]
    PendingReview,
    /// Some months received.
    #[serde(rename = "In Review")]
    InReview,
    /// Every academic month received.
    #[serde(rename = "Completed")]
    Completed,
    /// Snapshot submitted by the organization.
    #[serde(rename = "Submitted")]
    Submitted,
}

impl ReportStatus {
    /// Returns the status as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "Pending Review",
            Self::InReview => "In Review",
            Self::Completed => "Completed",
            Self::Submitted => "Submitted",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending Review" => Ok(Self::PendingReview),
            "In Review" => Ok(Self::InReview),
            "Completed" => Ok(Self::Completed),
            "Submitted" => Ok(Self::Submitted),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// Month key → received flag.
///
/// Unknown keys survive a round trip but never count toward the status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist(BTreeMap<String, bool>);

impl Checklist {
    /// Creates an empty checklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a checklist from its stored JSON.
    ///
    /// Anything other than an object yields an empty checklist, and
    /// non-boolean values are read as unticked.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self(
            map.iter()
                .map(|(k, v)| (k.clone(), v.as_bool().unwrap_or(false)))
                .collect(),
        )
    }

    /// Serializes the checklist for storage.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::Bool(*v)))
                .collect(),
        )
    }

    /// Returns whether a month has been received.
    #[must_use]
    pub fn is_received(&self, month: &str) -> bool {
        self.0
            .get(&month.to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// Ticks a month. Returns false when the name is not an academic month.
    pub fn mark_received(&mut self, month: &str) -> bool {
        let key = month.trim().to_lowercase();
        if !ACADEMIC_MONTHS.contains(&key.as_str()) {
            return false;
        }
        self.0.insert(key, true);
        true
    }

    /// Ticks any key, lowercased. Keys outside the academic months are
    /// stored but not counted.
    pub fn tick(&mut self, key: &str) {
        let key = key.trim().to_lowercase();
        if !key.is_empty() {
            self.0.insert(key, true);
        }
    }

    /// Ticks every academic month.
    pub fn complete_all(&mut self) {
        for month in ACADEMIC_MONTHS {
            self.0.insert(month.to_string(), true);
        }
    }

    /// Number of academic months ticked.
    #[must_use]
    pub fn received_count(&self) -> usize {
        ACADEMIC_MONTHS
            .iter()
            .filter(|m| self.0.get(**m).copied().unwrap_or(false))
            .count()
    }

    /// Derives the master report status from the ticked months.
    #[must_use]
    pub fn status(&self) -> ReportStatus {
        match self.received_count() {
            0 => ReportStatus::PendingReview,
            n if n < ACADEMIC_MONTHS.len() => ReportStatus::InReview,
            _ => ReportStatus::Completed,
        }
    }
}

impl FromIterator<(String, bool)> for Checklist {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Reads an optional checklist field the way stored checklists are read:
/// a non-object becomes an empty checklist and `null` means absent.
///
/// # Errors
///
/// Only fails when the input is not valid JSON.
pub fn lenient_checklist<'de, D>(deserializer: D) -> Result<Option<Checklist>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| !v.is_null())
        .map(|v| Checklist::from_json(&v)))
}

/// Edits OSAS can make to a checklist in one request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistUpdate {
    /// Replaces the whole checklist.
    #[serde(default, deserialize_with = "lenient_checklist")]
    pub checklist: Option<Checklist>,
    /// Ticks one month.
    #[serde(default)]
    pub receive_month: Option<String>,
    /// Ticks every month.
    #[serde(default)]
    pub complete_all: bool,
}

impl ChecklistUpdate {
    /// Returns true when the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checklist.is_none() && self.receive_month.is_none() && !self.complete_all
    }

    /// Applies the update: overwrite first, then the single month, then everything.
    #[must_use]
    pub fn apply(&self, current: Checklist) -> Checklist {
        let mut checklist = self.checklist.clone().unwrap_or(current);
        if let Some(month) = &self.receive_month {
            checklist.tick(month);
        }
        if self.complete_all {
            checklist.complete_all();
        }
        checklist
    }
}
