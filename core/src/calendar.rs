//! Month grid: 6 weeks × 7 days starting on the Monday on or before the 1st.

use crate::{
    error::{DutyError, DutyResult},
    resolver::DutyAssignment,
    rotation::monday_of,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const GRID_WEEKS: usize = 6;
pub const GRID_CELLS: usize = GRID_WEEKS * 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    /// Leading or trailing day of a neighbouring month.
    Placeholder,
    Day(DutyAssignment),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year:  i32,
    pub month: u32,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    /// Lay `days` (one per in-month date, in order) into the grid.
    pub fn assemble(span: &MonthSpan, days: Vec<DutyAssignment>) -> DutyResult<Self> {
        let mut days = days.into_iter().peekable();
        let mut cells = Vec::with_capacity(GRID_CELLS);
        for offset in 0..GRID_CELLS as i64 {
            let date = span.grid_start + Duration::days(offset);
            match days.next_if(|d| d.date == date) {
                Some(day) => cells.push(CalendarCell::Day(day)),
                None if span.contains(date) => {
                    return Err(DutyError::validation(format!("no assignment resolved for {date}")));
                }
                None => cells.push(CalendarCell::Placeholder),
            }
        }
        Ok(Self { year: span.year, month: span.month, cells })
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    pub fn days(&self) -> impl Iterator<Item = &DutyAssignment> {
        self.cells.iter().filter_map(|cell| match cell {
            CalendarCell::Day(day) => Some(day),
            CalendarCell::Placeholder => None,
        })
    }
}

/// First and last day of a month plus where its grid begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSpan {
    pub year:       i32,
    pub month:      u32,
    pub first:      NaiveDate,
    pub last:       NaiveDate,
    pub grid_start: NaiveDate,
}

impl MonthSpan {
    pub fn new(year: i32, month: u32) -> DutyResult<Self> {
        let invalid = || DutyError::validation(format!("invalid month {year}-{month:02}"));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        Ok(Self {
            year,
            month,
            first,
            last: next_first - Duration::days(1),
            grid_start: monday_of(first),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}
