//! Per-record outcomes and the batch report.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to a record that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// Entry created and published.
    #[serde(rename = "created")]
    Created,
    /// Entry created but publishing failed; it exists as a draft.
    #[serde(rename = "created (draft only)")]
    DraftOnly,
    /// Title already present in the CMS; nothing was sent.
    #[serde(rename = "skipped (already exists)")]
    Skipped,
}

impl OutcomeStatus {
    /// Wire form of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::DraftOnly => "created (draft only)",
            Self::Skipped => "skipped (already exists)",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one successfully processed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub title: String,
    pub status: OutcomeStatus,

    /// Degraded sub-steps, e.g. an image that could not be published.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ImportOutcome {
    pub fn new(title: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            title: title.into(),
            status,
            warnings: Vec::new(),
        }
    }

    pub fn skipped(title: impl Into<String>) -> Self {
        Self::new(title, OutcomeStatus::Skipped)
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// A record that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    pub title: String,
    pub error: String,
}

impl RecordError {
    /// Create a record error; an empty message becomes `"Unknown error"`.
    pub fn new(title: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            title: title.into(),
            error: if error.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                error
            },
        }
    }
}

/// Aggregate result of one import batch.
///
/// Counters are kept in step with the lists by [`ImportReport::push_outcome`]
/// and [`ImportReport::push_error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Always `true`; fatal failures never produce a report.
    pub success: bool,

    /// Records that were processed without failing, skipped duplicates
    /// included. Always equal to `results.len()`.
    pub created: usize,

    /// Records skipped as duplicates.
    pub skipped: usize,

    /// Records that failed.
    pub failed: usize,

    /// Outcomes in batch order.
    pub results: Vec<ImportOutcome>,

    /// Failures in batch order.
    pub errors: Vec<RecordError>,
}

impl Default for ImportReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportReport {
    /// Empty report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            success: true,
            created: 0,
            skipped: 0,
            failed: 0,
            results: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record a processed record.
    pub fn push_outcome(&mut self, outcome: ImportOutcome) {
        if outcome.status == OutcomeStatus::Skipped {
            self.skipped += 1;
        }
        self.results.push(outcome);
        self.created = self.results.len();
    }

    /// Record a failed record.
    pub fn push_error(&mut self, error: RecordError) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Number of records the report covers.
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len() + self.errors.len()
    }

    /// Outcomes with the given status.
    pub fn with_status(&self, status: OutcomeStatus) -> impl Iterator<Item = &ImportOutcome> {
        self.results.iter().filter(move |o| o.status == status)
    }
}
