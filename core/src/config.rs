//! Immutable engine configuration: anchor week, target zone, roster.

use crate::{
    employee::Employee,
    rotation::{monday_of, ROTATION_SIZE},
};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// On-disk shape of `data/roster.json`.
#[derive(Debug, Clone, Deserialize)]
struct RosterFile {
    anchor_date:        NaiveDate,
    utc_offset_minutes: i32,
    rotation:           Vec<Employee>,
    escalation:         Employee,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyConfig {
    /// Monday of week 0.
    pub anchor_date:        NaiveDate,
    /// Offset of the one target zone every date is computed in.
    pub utc_offset_minutes: i32,
    /// Rotation members; order is the schedule's index order.
    pub rotation:           Vec<Employee>,
    pub escalation:         Employee,
}

impl DutyConfig {
    /// Load from the data/ directory.
    /// In tests, use DutyConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/roster.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: RosterFile = serde_json::from_str(&content)?;
        let config = Self::new(
            file.anchor_date,
            file.utc_offset_minutes,
            file.rotation,
            file.escalation,
        )?;
        log::info!(
            "config: anchor week {} (utc{:+}min), rotation [{}]",
            config.anchor_date,
            config.utc_offset_minutes,
            config.rotation.iter().map(|e| e.id.as_str()).collect::<Vec<_>>().join(", "),
        );
        Ok(config)
    }

    /// Validate and normalise. The anchor is moved back to its Monday.
    pub fn new(
        anchor_date: NaiveDate,
        utc_offset_minutes: i32,
        rotation: Vec<Employee>,
        escalation: Employee,
    ) -> anyhow::Result<Self> {
        if rotation.len() != ROTATION_SIZE {
            anyhow::bail!(
                "rotation must list exactly {ROTATION_SIZE} employees, got {}",
                rotation.len()
            );
        }
        let mut seen = HashSet::new();
        for employee in rotation.iter().chain(std::iter::once(&escalation)) {
            if employee.id.trim().is_empty() {
                anyhow::bail!("employee '{}' has an empty id", employee.name);
            }
            if !seen.insert(employee.id.as_str()) {
                anyhow::bail!("duplicate employee id '{}'", employee.id);
            }
        }
        if offset_from_minutes(utc_offset_minutes).is_none() {
            anyhow::bail!("utc_offset_minutes out of range: {utc_offset_minutes}");
        }
        Ok(Self {
            anchor_date: monday_of(anchor_date),
            utc_offset_minutes,
            rotation,
            escalation,
        })
    }

    pub fn offset(&self) -> FixedOffset {
        // Range checked in new().
        offset_from_minutes(self.utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }

    /// Three-person roster anchored on Monday 2026-01-19, Moscow time.
    pub fn default_test() -> Self {
        let employee = |id: &str, name: &str, phone: &str| Employee {
            id:       id.to_string(),
            name:     name.to_string(),
            phone:    Some(phone.to_string()),
            telegram: None,
        };
        Self {
            anchor_date: NaiveDate::from_ymd_opt(2026, 1, 19).unwrap(),
            utc_offset_minutes: 180,
            rotation: vec![
                employee("pavel", "Pavel", "+7 900 000 0001"),
                employee("sergey", "Sergey", "+7 900 000 0002"),
                employee("maxim", "Maxim", "+7 900 000 0003"),
            ],
            escalation: employee("lead", "Team Lead", "+7 900 000 0099"),
        }
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> Employee {
        Employee { id: id.into(), name: id.to_uppercase(), phone: None, telegram: None }
    }

    #[test]
    fn anchor_is_moved_to_monday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        let config = DutyConfig::new(
            sunday, 0, vec![person("a"), person("b"), person("c")], person("d"),
        ).unwrap();
        assert_eq!(config.anchor_date, NaiveDate::from_ymd_opt(2026, 1, 19).unwrap());
    }

    #[test]
    fn rejects_wrong_roster_size_and_duplicates() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 19).unwrap();
        assert!(DutyConfig::new(day, 0, vec![person("a"), person("b")], person("d")).is_err());
        assert!(DutyConfig::new(
            day, 0, vec![person("a"), person("b"), person("c")], person("a"),
        ).is_err());
    }

    #[test]
    fn rejects_impossible_offset() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 19).unwrap();
        let roster = vec![person("a"), person("b"), person("c")];
        assert!(DutyConfig::new(day, 24 * 60, roster, person("d")).is_err());
    }

    #[test]
    fn test_config_is_already_valid() {
        let c = DutyConfig::default_test();
        let again = DutyConfig::new(c.anchor_date, c.utc_offset_minutes, c.rotation.clone(), c.escalation.clone())
            .unwrap();
        assert_eq!(again.anchor_date, c.anchor_date);
        assert_eq!(c.offset().local_minus_utc(), 3 * 3600);
    }
}
