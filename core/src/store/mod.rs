//! SQLite persistence layer.
//!
//! RULE: Only the store module talks to the database.
//! The engine calls store methods — it never executes SQL directly.

use crate::{
    error::DutyResult,
    substitution::{RotationSlot, Substitution},
};
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
    Connection, Row,
};

mod profile;
mod substitution;

pub struct DutyStore {
    conn: Connection,
}

impl DutyStore {
    pub fn open(path: &str) -> DutyResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // Concurrent writers wait for the lock instead of failing fast.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DutyResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Whether SQLite enforces foreign keys on this connection.
    pub fn foreign_keys_enabled(&self) -> DutyResult<bool> {
        let on: bool = self.conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        Ok(on)
    }

    /// Apply all schema migrations in order. Safe to run on every start.
    pub fn migrate(&self) -> DutyResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_substitutions.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_employee_profiles.sql"))?;
        Ok(())
    }
}

impl ToSql for RotationSlot {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RotationSlot {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

const SUBSTITUTION_COLUMNS: &str =
    "id, date, slot, original_employee_id, substitute_employee_id, reason";

fn substitution_from_row(row: &Row<'_>) -> rusqlite::Result<Substitution> {
    Ok(Substitution {
        id:                     row.get(0)?,
        date:                   row.get(1)?,
        slot:                   row.get(2)?,
        original_employee_id:   row.get(3)?,
        substitute_employee_id: row.get(4)?,
        reason:                 row.get(5)?,
    })
}
