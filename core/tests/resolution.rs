//! Duty resolution tests — rotation, weekend policy, batch views.
//!
//! Roster for every test: pavel, sergey, maxim; week 0 starts Monday 2026-01-19.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use duty_core::{
    calendar::{CalendarCell, GRID_CELLS},
    engine::DutyEngine,
    rotation::weekly_duty,
};

fn build() -> DutyEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    DutyEngine::build_test().expect("build test engine")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ids(engine: &DutyEngine, day: NaiveDate) -> (Option<String>, Option<String>) {
    let duty = engine.resolve(day).expect("resolve");
    (duty.primary_id().map(String::from), duty.secondary_id().map(String::from))
}

fn pair(p: Option<&str>, s: Option<&str>) -> (Option<String>, Option<String>) {
    (p.map(String::from), s.map(String::from))
}

#[test]
fn anchor_week_scenario() {
    let engine = build();

    assert_eq!(ids(&engine, date(2026, 1, 19)), pair(Some("pavel"), Some("sergey")));
    assert_eq!(ids(&engine, date(2026, 1, 24)), pair(Some("pavel"), None));
    assert_eq!(ids(&engine, date(2026, 1, 25)), pair(Some("sergey"), None));
    assert_eq!(ids(&engine, date(2026, 1, 26)), pair(Some("maxim"), Some("sergey")));
}

/// Saturday shows the weekly primary alone; Sunday shows the weekly secondary
/// in the primary slot. Checked over a full year on both sides of the anchor.
#[test]
fn weekend_rules_hold_for_every_week() {
    let engine = build();
    let start = date(2025, 7, 1);
    let days = engine
        .resolve_range(start, start + Duration::days(365))
        .expect("resolve range");

    let roster: Vec<String> = engine.config.rotation.iter().map(|e| e.id.clone()).collect();
    for duty in days {
        let week = weekly_duty(duty.week_index);
        let weekly_primary = roster[week.primary].as_str();
        let weekly_secondary = roster[week.secondary].as_str();
        match duty.date.weekday() {
            Weekday::Sat => {
                assert_eq!(duty.primary_id(), Some(weekly_primary), "{}", duty.date);
                assert_eq!(duty.secondary_id(), None, "{}", duty.date);
            }
            Weekday::Sun => {
                assert_eq!(duty.primary_id(), Some(weekly_secondary), "{}", duty.date);
                assert_eq!(duty.secondary_id(), None, "{}", duty.date);
            }
            _ => {
                assert_eq!(duty.primary_id(), Some(weekly_primary), "{}", duty.date);
                assert_eq!(duty.secondary_id(), Some(weekly_secondary), "{}", duty.date);
            }
        }
    }
}

/// Dates before the anchor have negative week indices and still resolve.
#[test]
fn dates_before_anchor_wrap_backwards() {
    let engine = build();

    // Week -1 is the sixth table entry: (sergey, maxim).
    let day = date(2026, 1, 13);
    assert_eq!(engine.week_number(day), -1);
    assert_eq!(ids(&engine, day), pair(Some("sergey"), Some("maxim")));

    // Six weeks earlier the schedule repeats.
    let earlier = day - Duration::weeks(6);
    assert_eq!(engine.week_number(earlier), -7);
    assert_eq!(ids(&engine, earlier), ids(&engine, day));
}

#[test]
fn resolve_range_is_ordered_and_inclusive() {
    let engine = build();
    let days = engine
        .resolve_range(date(2026, 1, 19), date(2026, 2, 1))
        .expect("resolve range");

    assert_eq!(days.len(), 14);
    for (n, duty) in days.iter().enumerate() {
        assert_eq!(duty.date, date(2026, 1, 19) + Duration::days(n as i64));
        assert_eq!(*duty, engine.resolve(duty.date).unwrap());
    }
}

#[test]
fn resolve_range_rejects_reversed_bounds() {
    let engine = build();
    assert!(engine.resolve_range(date(2026, 2, 1), date(2026, 1, 1)).is_err());
}

#[test]
fn week_of_covers_monday_to_sunday() {
    let engine = build();
    let week = engine.week_of(date(2026, 1, 29)).expect("week view");

    assert_eq!(week.len(), 7);
    assert_eq!(week[0].date, date(2026, 1, 26));
    assert_eq!(week[6].date, date(2026, 2, 1));
    assert!(week.iter().all(|d| d.week_index == 1));
}

#[test]
fn upcoming_weeks_follow_the_table() {
    let engine = build();
    let weeks = engine.upcoming_weeks(date(2026, 1, 21), 7).expect("upcoming");

    let got: Vec<(i64, String, String)> = weeks
        .iter()
        .map(|w| {
            (
                w.week_index,
                w.primary.as_ref().unwrap().id.clone(),
                w.secondary.as_ref().unwrap().id.clone(),
            )
        })
        .collect();
    let expected = [
        (0, "pavel", "sergey"),
        (1, "maxim", "sergey"),
        (2, "pavel", "maxim"),
        (3, "sergey", "pavel"),
        (4, "maxim", "pavel"),
        (5, "sergey", "maxim"),
        (6, "pavel", "sergey"),
    ];
    for (g, e) in got.iter().zip(expected) {
        assert_eq!((g.0, g.1.as_str(), g.2.as_str()), e);
    }
    assert_eq!(weeks[1].monday, date(2026, 1, 26));
}

#[test]
fn month_grid_has_placeholders_around_the_month() {
    let engine = build();
    let grid = engine.month_grid(2026, 2).expect("month grid");

    assert_eq!(grid.cells.len(), GRID_CELLS);
    assert_eq!(grid.weeks().count(), 6);

    // 2026-02-01 is a Sunday: six leading placeholders.
    assert!(grid.cells[..6].iter().all(|c| *c == CalendarCell::Placeholder));
    match &grid.cells[6] {
        CalendarCell::Day(day) => {
            assert_eq!(day.date, date(2026, 2, 1));
            assert_eq!(day.primary_id(), Some("sergey"));
            assert_eq!(day.secondary_id(), None);
        }
        CalendarCell::Placeholder => panic!("expected Feb 1st in cell 6"),
    }

    let days: Vec<_> = grid.days().collect();
    assert_eq!(days.len(), 28);
    assert_eq!(days.last().unwrap().date, date(2026, 2, 28));
    assert!(grid.cells[6 + 28..].iter().all(|c| *c == CalendarCell::Placeholder));
}

#[test]
fn month_grid_rejects_invalid_month() {
    let engine = build();
    assert!(engine.month_grid(2026, 13).is_err());
}

#[test]
fn today_resolves_in_target_zone() {
    let engine = build();
    let today = engine.today().expect("today");
    assert_eq!(today.date, engine.clock.today());
    assert!(today.primary.is_some());
}
