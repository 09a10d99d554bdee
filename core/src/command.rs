//! Operator commands — the write side of the engine, as tagged JSON.

use crate::{
    employee::{EmployeeProfile, ProfileField},
    substitution::{RangeOutcome, RotationSlot, Substitution},
    types::{EmployeeId, SubstitutionId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// All operator-issued writes.
/// Callers are expected to have authenticated the operator already.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    // ── Substitutions ─────────────────────────────
    AssignRange {
        start:         NaiveDate,
        end:           NaiveDate,
        slot:          RotationSlot,
        substitute_id: EmployeeId,
        #[serde(default)]
        reason:        Option<String>,
    },
    Reassign {
        id:            SubstitutionId,
        substitute_id: EmployeeId,
        #[serde(default)]
        reason:        Option<String>,
    },
    DeleteSubstitution {
        id: SubstitutionId,
    },

    // ── Directory ─────────────────────────────────
    SetProfile {
        employee_id: EmployeeId,
        #[serde(flatten)]
        profile:     EmployeeProfile,
    },
    ResetProfileField {
        employee_id: EmployeeId,
        field:       ProfileField,
    },
}

/// What a successfully applied command changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    RangeAssigned(RangeOutcome),
    Reassigned(Substitution),
    Deleted { id: SubstitutionId },
    ProfileUpdated { employee_id: EmployeeId },
}
