//! Duty clock — maps instants onto calendar dates in the target zone.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyClock {
    offset: FixedOffset,
}

impl DutyClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Calendar date in the target zone right now.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Calendar date in the target zone at `instant`.
    pub fn date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}
