//! Rotation calculator — which roster members hold the week.
//!
//! RULE: the schedule below is hand-curated data. Do not regenerate it from
//! its properties. Tests pin the table and the properties it actually has:
//! a secondary never becomes primary the following week, nobody is primary
//! twice in a row.

use crate::types::WeekIndex;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of employees the schedule rotates over.
pub const ROTATION_SIZE: usize = 3;

/// Length of the repeating cycle in weeks.
pub const CYCLE_WEEKS: i64 = 6;

/// (primary, secondary) roster indices per `week_index mod 6`.
const WEEKLY_SCHEDULE: [(usize, usize); CYCLE_WEEKS as usize] = [
    (0, 1),
    (2, 1),
    (0, 2),
    (1, 0),
    (2, 0),
    (1, 2),
];

/// Roster indices holding duty for one week.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyDuty {
    pub primary:   usize,
    pub secondary: usize,
}

/// Base pair for a week. Negative indices wrap with floor-mod.
pub fn weekly_duty(week_index: WeekIndex) -> WeeklyDuty {
    let (primary, secondary) = WEEKLY_SCHEDULE[week_index.rem_euclid(CYCLE_WEEKS) as usize];
    WeeklyDuty { primary, secondary }
}

/// Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Whole weeks between the anchor's Monday and `date`'s Monday.
pub fn week_number(anchor: NaiveDate, date: NaiveDate) -> WeekIndex {
    let days = (monday_of(date) - monday_of(anchor)).num_days();
    days.div_euclid(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn schedule_repeats_every_six_weeks() {
        for w in -24..24 {
            assert_eq!(weekly_duty(w), weekly_duty(w + CYCLE_WEEKS), "week {w}");
        }
    }

    #[test]
    fn primary_and_secondary_differ() {
        for w in 0..CYCLE_WEEKS {
            let duty = weekly_duty(w);
            assert_ne!(duty.primary, duty.secondary, "week {w}");
            assert!(duty.primary < ROTATION_SIZE && duty.secondary < ROTATION_SIZE);
        }
    }

    #[test]
    fn secondary_is_never_promoted_next_week() {
        for w in -6..12 {
            let this = weekly_duty(w);
            let next = weekly_duty(w + 1);
            assert_ne!(this.secondary, next.primary, "secondary→primary at week {w}");
            assert_ne!(this.primary, next.primary, "primary twice in a row at week {w}");
        }
    }

    #[test]
    fn each_member_serves_each_role_twice_per_cycle() {
        for member in 0..ROTATION_SIZE {
            let duties: Vec<_> = (0..CYCLE_WEEKS).map(weekly_duty).collect();
            let primary = duties.iter().filter(|d| d.primary == member).count();
            let secondary = duties.iter().filter(|d| d.secondary == member).count();
            assert_eq!((primary, secondary), (2, 2), "member {member}");
        }
    }

    #[test]
    fn schedule_matches_literal_table() {
        let expected = [(0, 1), (2, 1), (0, 2), (1, 0), (2, 0), (1, 2)];
        for (w, (p, s)) in expected.into_iter().enumerate() {
            assert_eq!(weekly_duty(w as i64), WeeklyDuty { primary: p, secondary: s });
        }
    }

    #[test]
    fn negative_weeks_use_floor_mod() {
        // Week -1 is the last entry of the previous cycle, not the first.
        assert_eq!(weekly_duty(-1), weekly_duty(5));
        assert_eq!(weekly_duty(-6), weekly_duty(0));
        assert_eq!(weekly_duty(-7), weekly_duty(5));
    }

    #[test]
    fn week_number_counts_from_anchor_monday() {
        let anchor = date(2026, 1, 19);
        assert_eq!(week_number(anchor, date(2026, 1, 19)), 0);
        assert_eq!(week_number(anchor, date(2026, 1, 25)), 0);
        assert_eq!(week_number(anchor, date(2026, 1, 26)), 1);
        assert_eq!(week_number(anchor, date(2026, 1, 18)), -1);
        assert_eq!(week_number(anchor, date(2026, 1, 12)), -1);
        assert_eq!(week_number(anchor, date(2026, 1, 11)), -2);
    }

    #[test]
    fn mid_week_anchor_is_normalised() {
        // A Thursday anchor behaves like the Monday of its week.
        let anchor = date(2026, 1, 22);
        assert_eq!(week_number(anchor, date(2026, 1, 19)), 0);
        assert_eq!(week_number(anchor, date(2026, 1, 26)), 1);
    }
}
