use crate::substitution::RotationSlot;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DutyError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Substitution {id} not found")]
    NotFound { id: i64 },

    /// Every date of a range request fell on a slot that does not exist that day.
    #[error("Nothing to apply: all {} date(s) in the range were skipped", skipped.len())]
    EmptyRange { skipped: Vec<NaiveDate> },

    #[error("Duplicate substitutions stored for {date} ({slot})")]
    Conflict { date: NaiveDate, slot: RotationSlot },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DutyError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation { reason: reason.into() }
    }
}

pub type DutyResult<T> = Result<T, DutyError>;
