//! Substitution queries.

use super::{substitution_from_row, DutyStore, SUBSTITUTION_COLUMNS};
use crate::{
    error::{DutyError, DutyResult},
    substitution::{RotationSlot, SlotSubstitutions, Substitution, SubstitutionDraft},
    types::SubstitutionId,
};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

impl DutyStore {
    /// Write each draft keyed by (date, slot): update in place when a record
    /// exists, insert otherwise. All drafts share one IMMEDIATE transaction,
    /// so the read-modify-write of every (date, slot) is atomic.
    ///
    /// An existing record keeps its stored original assignee.
    pub fn upsert_substitutions(
        &self,
        drafts: &[SubstitutionDraft],
    ) -> DutyResult<Vec<Substitution>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let now = Utc::now();
        let mut written = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let existing: Vec<SubstitutionId> = {
                let mut stmt = tx.prepare_cached(
                    "SELECT id FROM substitution WHERE date = ?1 AND slot = ?2",
                )?;
                let ids = stmt
                    .query_map(params![draft.date, draft.slot], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                ids
            };

            let id = match existing.as_slice() {
                [] => {
                    let inserted = tx.execute(
                        "INSERT INTO substitution
                            (date, slot, original_employee_id, substitute_employee_id,
                             reason, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                        params![
                            draft.date,
                            draft.slot,
                            draft.original_employee_id,
                            draft.substitute_employee_id,
                            draft.reason,
                            now,
                        ],
                    );
                    match inserted {
                        Ok(_) => tx.last_insert_rowid(),
                        Err(rusqlite::Error::SqliteFailure(e, _))
                            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                        {
                            return Err(DutyError::Conflict { date: draft.date, slot: draft.slot });
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                [id] => {
                    tx.execute(
                        "UPDATE substitution
                         SET substitute_employee_id = ?1, reason = ?2, updated_at = ?3
                         WHERE id = ?4",
                        params![draft.substitute_employee_id, draft.reason, now, id],
                    )?;
                    *id
                }
                _ => return Err(DutyError::Conflict { date: draft.date, slot: draft.slot }),
            };

            let record = tx.query_row(
                &format!("SELECT {SUBSTITUTION_COLUMNS} FROM substitution WHERE id = ?1"),
                params![id],
                substitution_from_row,
            )?;
            written.push(record);
        }

        tx.commit()?;
        Ok(written)
    }

    /// Substitutions stored for `date`, by slot.
    pub fn substitutions_on(&self, date: NaiveDate) -> DutyResult<SlotSubstitutions> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBSTITUTION_COLUMNS} FROM substitution WHERE date = ?1 ORDER BY id ASC"
        ))?;
        let rows = stmt
            .query_map(params![date], substitution_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut slots = SlotSubstitutions::default();
        for sub in rows {
            let slot = sub.slot;
            if !slots.insert(sub) {
                return Err(DutyError::Conflict { date, slot });
            }
        }
        Ok(slots)
    }

    /// Substitutions for every date in `[start, end]` in one query.
    /// Dates without records are absent from the map.
    pub fn substitutions_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DutyResult<BTreeMap<NaiveDate, SlotSubstitutions>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBSTITUTION_COLUMNS} FROM substitution
             WHERE date BETWEEN ?1 AND ?2
             ORDER BY date ASC, id ASC"
        ))?;
        let rows = stmt
            .query_map(params![start, end], substitution_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_date: BTreeMap<NaiveDate, SlotSubstitutions> = BTreeMap::new();
        for sub in rows {
            let (date, slot) = (sub.date, sub.slot);
            if !by_date.entry(date).or_default().insert(sub) {
                return Err(DutyError::Conflict { date, slot });
            }
        }
        Ok(by_date)
    }

    /// Every stored substitution ordered by date, then slot.
    pub fn all_substitutions(&self) -> DutyResult<Vec<Substitution>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBSTITUTION_COLUMNS} FROM substitution ORDER BY date ASC, slot ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], substitution_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn substitution(&self, id: SubstitutionId) -> DutyResult<Option<Substitution>> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT {SUBSTITUTION_COLUMNS} FROM substitution WHERE id = ?1"),
                params![id],
                substitution_from_row,
            )
            .optional()?;
        Ok(found)
    }

    /// Change who covers an existing record. The original assignee is kept.
    pub fn update_substitute(
        &self,
        id: SubstitutionId,
        substitute_employee_id: &str,
        reason: Option<&str>,
    ) -> DutyResult<Substitution> {
        let changed = self.conn.execute(
            "UPDATE substitution
             SET substitute_employee_id = ?1, reason = ?2, updated_at = ?3
             WHERE id = ?4",
            params![substitute_employee_id, reason, Utc::now(), id],
        )?;
        if changed == 0 {
            return Err(DutyError::NotFound { id });
        }
        self.substitution(id)?.ok_or(DutyError::NotFound { id })
    }

    pub fn delete_substitution(&self, id: SubstitutionId) -> DutyResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM substitution WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(DutyError::NotFound { id });
        }
        Ok(())
    }

    /// Number of records stored for (date, slot). Used by tests to check
    /// the one-record-per-slot invariant.
    pub fn substitution_count_for(&self, date: NaiveDate, slot: RotationSlot) -> DutyResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM substitution WHERE date = ?1 AND slot = ?2",
            params![date, slot],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn substitution_count(&self) -> DutyResult<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM substitution", [], |row| row.get(0))?;
        Ok(count)
    }
}
