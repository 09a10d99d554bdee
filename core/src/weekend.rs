//! Weekend policy — narrows the week's pair to what a single date shows.
//!
//!   Mon–Fri:  (primary, secondary)
//!   Saturday: (primary, –)
//!   Sunday:   (secondary, –)   the week's secondary is shown as primary
//!
//! The Sunday promotion also decides who a Sunday substitution replaces.

use crate::{rotation::WeeklyDuty, substitution::RotationSlot};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Roster indices shown on one date before substitutions are applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayPair {
    pub primary:   Option<usize>,
    pub secondary: Option<usize>,
}

impl DisplayPair {
    pub fn get(&self, slot: RotationSlot) -> Option<usize> {
        match slot {
            RotationSlot::Primary   => self.primary,
            RotationSlot::Secondary => self.secondary,
        }
    }
}

pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Whether `slot` exists on a date falling on `weekday`.
pub fn is_slot_active(weekday: Weekday, slot: RotationSlot) -> bool {
    match slot {
        RotationSlot::Primary   => true,
        RotationSlot::Secondary => !is_weekend(weekday),
    }
}

pub fn display_pair(weekday: Weekday, duty: WeeklyDuty) -> DisplayPair {
    match weekday {
        Weekday::Sat => DisplayPair { primary: Some(duty.primary),   secondary: None },
        Weekday::Sun => DisplayPair { primary: Some(duty.secondary), secondary: None },
        _ => DisplayPair {
            primary:   Some(duty.primary),
            secondary: Some(duty.secondary),
        },
    }
}
