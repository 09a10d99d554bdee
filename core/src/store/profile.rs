//! Store methods for employee profile overrides.

use super::DutyStore;
use crate::{
    employee::{EmployeeProfile, ProfileField},
    error::DutyResult,
    types::EmployeeId,
};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;

impl DutyStore {
    pub fn profile(&self, employee_id: &str) -> DutyResult<Option<EmployeeProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT name, phone, telegram FROM employee_profile WHERE employee_id = ?1",
                params![employee_id],
                |row| {
                    Ok(EmployeeProfile {
                        name:     row.get(0)?,
                        phone:    row.get(1)?,
                        telegram: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    pub fn all_profiles(&self) -> DutyResult<HashMap<EmployeeId, EmployeeProfile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT employee_id, name, phone, telegram FROM employee_profile")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                EmployeeProfile {
                    name:     row.get(1)?,
                    phone:    row.get(2)?,
                    telegram: row.get(3)?,
                },
            ))
        })?;
        rows.collect::<Result<HashMap<_, _>, _>>().map_err(Into::into)
    }

    /// Patch the stored profile. Fields left `None` keep their stored value;
    /// use `clear_profile_field` to drop one.
    pub fn set_profile(&self, employee_id: &str, patch: &EmployeeProfile) -> DutyResult<()> {
        self.conn.execute(
            "INSERT INTO employee_profile (employee_id, name, phone, telegram, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (employee_id) DO UPDATE SET
                name       = COALESCE(excluded.name,     employee_profile.name),
                phone      = COALESCE(excluded.phone,    employee_profile.phone),
                telegram   = COALESCE(excluded.telegram, employee_profile.telegram),
                updated_at = excluded.updated_at",
            params![employee_id, patch.name, patch.phone, patch.telegram, Utc::now()],
        )?;
        Ok(())
    }

    /// Forget one stored field; the built-in default applies again.
    /// A missing profile row is left missing.
    pub fn clear_profile_field(&self, employee_id: &str, field: ProfileField) -> DutyResult<()> {
        let column = match field {
            ProfileField::Name     => "name",
            ProfileField::Phone    => "phone",
            ProfileField::Telegram => "telegram",
        };
        self.conn.execute(
            &format!(
                "UPDATE employee_profile SET {column} = NULL, updated_at = ?1
                 WHERE employee_id = ?2"
            ),
            params![Utc::now(), employee_id],
        )?;
        Ok(())
    }
}
