//! Activity domain model.
//!
//! # Responsibility
//! - Define the time-blocked activity record and its write model.
//! - Validate activity fields before they reach persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another activity.
//! - `end_ms` must not be earlier than `start_ms`.
//! - `title` must not be blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned identifier for an activity.
pub type ActivityId = Uuid;

/// Progress state of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    /// Not started.
    Todo,
    /// Work has started.
    InProgress,
    /// Finished.
    Completed,
}

/// Validation failures for activity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityValidationError {
    /// Title is empty after trimming.
    BlankTitle,
    /// `end_ms` is earlier than `start_ms`.
    InvalidTimeRange { start_ms: i64, end_ms: i64 },
}

impl Display for ActivityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "activity title must not be blank"),
            Self::InvalidTimeRange { start_ms, end_ms } => {
                write!(f, "end_ms ({end_ms}) must be >= start_ms ({start_ms})")
            }
        }
    }
}

impl Error for ActivityValidationError {}

/// Persisted activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Store-assigned stable ID.
    pub id: ActivityId,
    pub title: String,
    pub description: String,
    pub status: ActivityStatus,
    /// Unix epoch milliseconds.
    pub start_ms: i64,
    /// Unix epoch milliseconds. Should be >= `start_ms`.
    pub end_ms: i64,
}

impl Activity {
    /// Returns whether this activity strictly overlaps `other`.
    ///
    /// Touching endpoints (`self.end_ms == other.start_ms`) do not overlap.
    pub fn overlaps(&self, other: &Activity) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    /// Checks field invariants on an already persisted record.
    pub fn validate(&self) -> Result<(), ActivityValidationError> {
        validate_fields(self.title.as_str(), self.start_ms, self.end_ms)
    }
}

/// Write model for creating an activity; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub status: ActivityStatus,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl NewActivity {
    /// Creates a write model with the given window.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: ActivityStatus,
        start_ms: i64,
        end_ms: i64,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
            start_ms,
            end_ms,
        }
    }

    /// Validates fields before persistence.
    pub fn validate(&self) -> Result<(), ActivityValidationError> {
        validate_fields(self.title.as_str(), self.start_ms, self.end_ms)
    }

    /// Materializes a persisted record with the store-assigned id.
    pub fn into_activity(self, id: ActivityId) -> Activity {
        Activity {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            start_ms: self.start_ms,
            end_ms: self.end_ms,
        }
    }
}

fn validate_fields(title: &str, start_ms: i64, end_ms: i64) -> Result<(), ActivityValidationError> {
    if title.trim().is_empty() {
        return Err(ActivityValidationError::BlankTitle);
    }
    if end_ms < start_ms {
        return Err(ActivityValidationError::InvalidTimeRange { start_ms, end_ms });
    }
    Ok(())
}
