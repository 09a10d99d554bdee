//! Employee directory — built-in roster merged with persisted profile patches.

use crate::{rotation::WeeklyDuty, types::EmployeeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    pub id:       EmployeeId,
    pub name:     String,
    #[serde(default)]
    pub phone:    Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// Sparse per-field patch over a built-in employee. `None` keeps the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeProfile {
    #[serde(default)]
    pub name:     Option<String>,
    #[serde(default)]
    pub phone:    Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// One overridable profile field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Phone,
    Telegram,
}

impl EmployeeProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.telegram.is_none()
    }
}

impl Employee {
    /// Built-in fields patched by whatever the profile sets. The id never changes.
    pub fn with_profile(&self, profile: &EmployeeProfile) -> Employee {
        Employee {
            id:       self.id.clone(),
            name:     profile.name.clone().unwrap_or_else(|| self.name.clone()),
            phone:    profile.phone.clone().or_else(|| self.phone.clone()),
            telegram: profile.telegram.clone().or_else(|| self.telegram.clone()),
        }
    }
}

/// The effective directory for one query: rotation members in rotation
/// order plus the escalation contact, all with profile patches applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDirectory {
    pub rotation:   Vec<Employee>,
    pub escalation: Employee,
}

impl EmployeeDirectory {
    pub fn build(
        rotation: &[Employee],
        escalation: &Employee,
        profiles: &HashMap<EmployeeId, EmployeeProfile>,
    ) -> Self {
        let merge = |e: &Employee| match profiles.get(&e.id) {
            Some(profile) => e.with_profile(profile),
            None => e.clone(),
        };
        Self {
            rotation:   rotation.iter().map(merge).collect(),
            escalation: merge(escalation),
        }
    }

    /// Rotation member at a schedule index.
    pub fn member(&self, index: usize) -> Option<&Employee> {
        self.rotation.get(index)
    }

    /// Any known employee, escalation contact included.
    pub fn find(&self, id: &str) -> Option<&Employee> {
        self.rotation
            .iter()
            .chain(std::iter::once(&self.escalation))
            .find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Every known employee in directory order.
    pub fn all(&self) -> Vec<Employee> {
        let mut all = self.rotation.clone();
        all.push(self.escalation.clone());
        all
    }

    pub fn weekly_pair(&self, duty: WeeklyDuty) -> (Option<&Employee>, Option<&Employee>) {
        (self.member(duty.primary), self.member(duty.secondary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pavel() -> Employee {
        Employee {
            id: "pavel".into(),
            name: "Pavel".into(),
            phone: Some("+7 900 000 0001".into()),
            telegram: None,
        }
    }

    #[test]
    fn empty_profile_keeps_defaults() {
        assert_eq!(pavel().with_profile(&EmployeeProfile::default()), pavel());
    }

    #[test]
    fn profile_overrides_only_set_fields() {
        let profile = EmployeeProfile {
            name: None,
            phone: Some("+7 900 111 2233".into()),
            telegram: Some("@pavel".into()),
        };
        let merged = pavel().with_profile(&profile);
        assert_eq!(merged.id, "pavel");
        assert_eq!(merged.name, "Pavel");
        assert_eq!(merged.phone.as_deref(), Some("+7 900 111 2233"));
        assert_eq!(merged.telegram.as_deref(), Some("@pavel"));
    }

    #[test]
    fn directory_applies_profiles_and_finds_escalation() {
        let lead = Employee { id: "lead".into(), name: "Lead".into(), phone: None, telegram: None };
        let mut profiles = HashMap::new();
        profiles.insert(
            "lead".to_string(),
            EmployeeProfile { name: Some("Team Lead".into()), ..Default::default() },
        );
        let dir = EmployeeDirectory::build(&[pavel()], &lead, &profiles);
        assert_eq!(dir.find("lead").map(|e| e.name.as_str()), Some("Team Lead"));
        assert!(dir.contains("pavel"));
        assert!(!dir.contains("nobody"));
        assert_eq!(dir.all().len(), 2);
    }
}
