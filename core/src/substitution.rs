//! Substitution records and their display derivations.

use crate::types::{EmployeeId, SubstitutionId};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RotationSlot {
    Primary,
    Secondary,
}

impl RotationSlot {
    pub const ALL: [RotationSlot; 2] = [RotationSlot::Primary, RotationSlot::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            RotationSlot::Primary   => "primary",
            RotationSlot::Secondary => "secondary",
        }
    }
}

impl fmt::Display for RotationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RotationSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary"   => Ok(RotationSlot::Primary),
            "secondary" => Ok(RotationSlot::Secondary),
            other       => Err(format!("unknown rotation slot '{other}'")),
        }
    }
}

/// One stored override of the rotation for a (date, slot).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Substitution {
    pub id:                     SubstitutionId,
    pub date:                   NaiveDate,
    pub slot:                   RotationSlot,
    /// Who the rotation assigned when the record was created. Never recomputed.
    pub original_employee_id:   EmployeeId,
    pub substitute_employee_id: EmployeeId,
    pub reason:                 Option<String>,
}

/// A substitution about to be written; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionDraft {
    pub date:                   NaiveDate,
    pub slot:                   RotationSlot,
    pub original_employee_id:   EmployeeId,
    pub substitute_employee_id: EmployeeId,
    pub reason:                 Option<String>,
}

/// Substitutions stored for a single date, by slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotSubstitutions {
    pub primary:   Option<Substitution>,
    pub secondary: Option<Substitution>,
}

impl SlotSubstitutions {
    pub fn get(&self, slot: RotationSlot) -> Option<&Substitution> {
        match slot {
            RotationSlot::Primary   => self.primary.as_ref(),
            RotationSlot::Secondary => self.secondary.as_ref(),
        }
    }

    /// Place `sub` in its slot. Returns false if the slot was already taken.
    pub fn insert(&mut self, sub: Substitution) -> bool {
        let target = match sub.slot {
            RotationSlot::Primary   => &mut self.primary,
            RotationSlot::Secondary => &mut self.secondary,
        };
        if target.is_some() {
            return false;
        }
        *target = Some(sub);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// Result of a range assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeOutcome {
    pub applied: Vec<Substitution>,
    /// Dates whose slot does not exist that day (secondary on weekends).
    pub skipped: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RangeType {
    Range,
    Single,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoalescedSubstitution {
    #[serde(flatten)]
    pub substitution: Substitution,
    pub range_type:   RangeType,
}

type GroupKey<'a> = (RotationSlot, &'a str, &'a str, Option<&'a str>);

fn group_key(sub: &Substitution) -> GroupKey<'_> {
    (
        sub.slot,
        sub.original_employee_id.as_str(),
        sub.substitute_employee_id.as_str(),
        sub.reason.as_deref(),
    )
}

/// Mark each record "range" when a neighbouring day carries an identical
/// (slot, original, substitute, reason) record, else "single".
/// Output order follows the input order.
pub fn coalesce(subs: &[Substitution]) -> Vec<CoalescedSubstitution> {
    let present: HashSet<(GroupKey<'_>, NaiveDate)> =
        subs.iter().map(|s| (group_key(s), s.date)).collect();

    subs.iter()
        .map(|sub| {
            let key = group_key(sub);
            let before = (key, sub.date - Duration::days(1));
            let after = (key, sub.date + Duration::days(1));
            let range_type = if present.contains(&before) || present.contains(&after) {
                RangeType::Range
            } else {
                RangeType::Single
            };
            CoalescedSubstitution { substitution: sub.clone(), range_type }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(id: i64, day: u32, slot: RotationSlot, orig: &str, with: &str, reason: Option<&str>) -> Substitution {
        Substitution {
            id,
            date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            slot,
            original_employee_id: orig.to_string(),
            substitute_employee_id: with.to_string(),
            reason: reason.map(String::from),
        }
    }

    fn types(subs: &[Substitution]) -> Vec<RangeType> {
        coalesce(subs).into_iter().map(|c| c.range_type).collect()
    }

    #[test]
    fn adjacent_identical_records_form_a_range() {
        let subs = vec![
            sub(1, 2, RotationSlot::Primary, "pavel", "maxim", Some("vacation")),
            sub(2, 3, RotationSlot::Primary, "pavel", "maxim", Some("vacation")),
            sub(3, 4, RotationSlot::Primary, "pavel", "maxim", Some("vacation")),
        ];
        assert_eq!(types(&subs), vec![RangeType::Range; 3]);
    }

    #[test]
    fn isolated_record_is_single() {
        let subs = vec![
            sub(1, 2, RotationSlot::Primary, "pavel", "maxim", None),
            sub(2, 5, RotationSlot::Primary, "pavel", "maxim", None),
        ];
        assert_eq!(types(&subs), vec![RangeType::Single, RangeType::Single]);
    }

    #[test]
    fn neighbours_with_different_keys_do_not_merge() {
        let subs = vec![
            sub(1, 2, RotationSlot::Primary, "pavel", "maxim", Some("vacation")),
            sub(2, 3, RotationSlot::Primary, "pavel", "maxim", Some("sick")),
            sub(3, 4, RotationSlot::Secondary, "pavel", "maxim", Some("sick")),
            sub(4, 5, RotationSlot::Primary, "pavel", "sergey", Some("sick")),
        ];
        assert_eq!(types(&subs), vec![RangeType::Single; 4]);
    }

    #[test]
    fn slot_round_trips_through_str() {
        for slot in RotationSlot::ALL {
            assert_eq!(slot.as_str().parse::<RotationSlot>(), Ok(slot));
        }
        assert!("backup".parse::<RotationSlot>().is_err());
    }

    #[test]
    fn slot_map_rejects_second_record_for_same_slot() {
        let mut slots = SlotSubstitutions::default();
        assert!(slots.insert(sub(1, 2, RotationSlot::Primary, "pavel", "maxim", None)));
        assert!(!slots.insert(sub(2, 2, RotationSlot::Primary, "pavel", "sergey", None)));
        assert_eq!(slots.get(RotationSlot::Primary).map(|s| s.id), Some(1));
        assert!(slots.get(RotationSlot::Secondary).is_none());
    }
}
