//! Shared primitive types used across the duty engine.

/// Stable key of a directory entry, e.g. `"pavel"`.
pub type EmployeeId = String;

/// Store-assigned identifier of a substitution record.
pub type SubstitutionId = i64;

/// Weeks elapsed since the anchor Monday. Negative before the anchor.
pub type WeekIndex = i64;
