//! Duty resolver — rotation, weekend policy and substitutions combined.
//!
//! RULE: the resolver never touches the store. Callers fetch substitutions
//! (one date or a whole batch) and hand them in.

use crate::{
    employee::{Employee, EmployeeDirectory},
    rotation::{week_number, weekly_duty},
    substitution::{RotationSlot, SlotSubstitutions},
    types::{SubstitutionId, WeekIndex},
    weekend::{display_pair, is_slot_active, DisplayPair},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Effective on-call people for one date. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DutyAssignment {
    pub date:       NaiveDate,
    pub week_index: WeekIndex,
    pub primary:    Option<Employee>,
    pub secondary:  Option<Employee>,
    /// Substitution that replaced the rotation's primary, if any.
    pub primary_substitution:   Option<SubstitutionId>,
    pub secondary_substitution: Option<SubstitutionId>,
}

impl DutyAssignment {
    pub fn primary_id(&self) -> Option<&str> {
        self.primary.as_ref().map(|e| e.id.as_str())
    }

    pub fn secondary_id(&self) -> Option<&str> {
        self.secondary.as_ref().map(|e| e.id.as_str())
    }
}

/// Roster indices shown on `date` before any substitution.
pub fn base_pair(anchor: NaiveDate, date: NaiveDate) -> DisplayPair {
    display_pair(date.weekday(), weekly_duty(week_number(anchor, date)))
}

pub struct Resolver<'a> {
    anchor:    NaiveDate,
    directory: &'a EmployeeDirectory,
}

impl<'a> Resolver<'a> {
    pub fn new(anchor: NaiveDate, directory: &'a EmployeeDirectory) -> Self {
        Self { anchor, directory }
    }

    /// Who the rotation puts in `slot` on `date`, ignoring substitutions.
    /// `None` when the slot does not exist that day.
    pub fn original_assignee(&self, date: NaiveDate, slot: RotationSlot) -> Option<&'a Employee> {
        let directory = self.directory;
        base_pair(self.anchor, date)
            .get(slot)
            .and_then(|index| directory.member(index))
    }

    pub fn resolve(&self, date: NaiveDate, subs: Option<&SlotSubstitutions>) -> DutyAssignment {
        let week_index = week_number(self.anchor, date);
        let weekday = date.weekday();

        let mut assignment = DutyAssignment {
            date,
            week_index,
            primary: self.original_assignee(date, RotationSlot::Primary).cloned(),
            secondary: self.original_assignee(date, RotationSlot::Secondary).cloned(),
            primary_substitution: None,
            secondary_substitution: None,
        };

        let Some(subs) = subs else {
            return assignment;
        };

        for slot in RotationSlot::ALL {
            let Some(sub) = subs.get(slot) else { continue };
            if !is_slot_active(weekday, slot) {
                log::debug!("{date}: {slot} substitution {} is inert on a weekend", sub.id);
                continue;
            }
            let Some(substitute) = self.directory.find(&sub.substitute_employee_id) else {
                log::warn!(
                    "{date}: substitution {} names unknown employee '{}', keeping rotation",
                    sub.id,
                    sub.substitute_employee_id
                );
                continue;
            };
            match slot {
                RotationSlot::Primary => {
                    assignment.primary = Some(substitute.clone());
                    assignment.primary_substitution = Some(sub.id);
                }
                RotationSlot::Secondary => {
                    assignment.secondary = Some(substitute.clone());
                    assignment.secondary_substitution = Some(sub.id);
                }
            }
        }
        assignment
    }
}
