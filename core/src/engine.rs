//! The duty engine — the one entry point UI and API layers talk to.
//!
//! QUERY PATH (every call, nothing cached):
//!   1. Directory   built-in roster + stored profile patches
//!   2. Rotation    week index → weekly (primary, secondary)
//!   3. Weekend     narrow the pair to the date's active slots
//!   4. Overrides   stored substitutions replace active slots
//!
//! RULES:
//!   - Configuration is immutable for the engine's lifetime.
//!   - Range queries fetch substitutions once, never per day.
//!   - Original assignees are computed from the rotation alone, never
//!     from existing substitutions.

use crate::{
    calendar::{MonthGrid, MonthSpan},
    clock::DutyClock,
    command::{AdminCommand, CommandOutcome},
    config::DutyConfig,
    employee::{Employee, EmployeeDirectory, EmployeeProfile, ProfileField},
    error::{DutyError, DutyResult},
    resolver::{DutyAssignment, Resolver},
    rotation::{monday_of, week_number, weekly_duty},
    store::DutyStore,
    substitution::{
        coalesce, CoalescedSubstitution, RangeOutcome, RotationSlot, SlotSubstitutions,
        Substitution, SubstitutionDraft,
    },
    types::{SubstitutionId, WeekIndex},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Longest range a single assignment request may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Longest look-ahead `upcoming_weeks` will produce.
pub const MAX_UPCOMING_WEEKS: usize = 520;

/// Dates outside these years have no `YYYY-MM-DD` form in the store.
const FIRST_YEAR: i32 = 1;
const LAST_YEAR: i32 = 9999;

/// Base rotation for one week, before weekend rules and substitutions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekSummary {
    pub week_index: WeekIndex,
    pub monday:     NaiveDate,
    pub primary:    Option<Employee>,
    pub secondary:  Option<Employee>,
}

pub struct DutyEngine {
    pub config: DutyConfig,
    pub clock:  DutyClock,
    pub store:  DutyStore,
}

impl DutyEngine {
    pub fn new(config: DutyConfig, store: DutyStore) -> Self {
        Self {
            clock: DutyClock::new(config.offset()),
            config,
            store,
        }
    }

    /// Engine over a fresh, migrated in-memory store with the test roster.
    pub fn build_test() -> DutyResult<Self> {
        let store = DutyStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(DutyConfig::default_test(), store))
    }

    // ── Directory ──────────────────────────────────────────────

    pub fn directory(&self) -> DutyResult<EmployeeDirectory> {
        let profiles = self.store.all_profiles()?;
        Ok(EmployeeDirectory::build(
            &self.config.rotation,
            &self.config.escalation,
            &profiles,
        ))
    }

    pub fn set_profile(&self, employee_id: &str, patch: &EmployeeProfile) -> DutyResult<()> {
        if !self.is_known_employee(employee_id) {
            return Err(DutyError::validation(format!("unknown employee '{employee_id}'")));
        }
        if patch.is_empty() {
            return Err(DutyError::validation("profile patch sets no fields"));
        }
        self.store.set_profile(employee_id, patch)?;
        log::info!("profile: updated {employee_id}");
        Ok(())
    }

    /// Drop one stored field so the built-in default shows again.
    pub fn reset_profile_field(&self, employee_id: &str, field: ProfileField) -> DutyResult<()> {
        if !self.is_known_employee(employee_id) {
            return Err(DutyError::validation(format!("unknown employee '{employee_id}'")));
        }
        self.store.clear_profile_field(employee_id, field)?;
        log::info!("profile: reset {employee_id} {field:?}");
        Ok(())
    }

    fn is_known_employee(&self, id: &str) -> bool {
        self.config
            .rotation
            .iter()
            .chain(std::iter::once(&self.config.escalation))
            .any(|e| e.id == id)
    }

    // ── Resolution ─────────────────────────────────────────────

    pub fn week_number(&self, date: NaiveDate) -> WeekIndex {
        week_number(self.config.anchor_date, date)
    }

    pub fn resolve(&self, date: NaiveDate) -> DutyResult<DutyAssignment> {
        check_date(date)?;
        let directory = self.directory()?;
        let subs = self.store.substitutions_on(date)?;
        Ok(Resolver::new(self.config.anchor_date, &directory).resolve(date, Some(&subs)))
    }

    /// One assignment per day of `[start, end]`, in date order.
    pub fn resolve_range(&self, start: NaiveDate, end: NaiveDate) -> DutyResult<Vec<DutyAssignment>> {
        check_range(start, end)?;
        let directory = self.directory()?;
        let subs = self.store.substitutions_between(start, end)?;
        let resolver = Resolver::new(self.config.anchor_date, &directory);

        let days = days_between(start, end)
            .map(|date| resolver.resolve(date, subs.get(&date)))
            .collect();
        Ok(days)
    }

    /// Who is on call today in the target zone.
    pub fn today(&self) -> DutyResult<DutyAssignment> {
        self.resolve(self.clock.today())
    }

    /// Monday through Sunday of the week containing `date`.
    pub fn week_of(&self, date: NaiveDate) -> DutyResult<Vec<DutyAssignment>> {
        check_date(date)?;
        let monday = monday_of(date);
        let sunday = monday
            .checked_add_signed(Duration::days(6))
            .ok_or_else(|| DutyError::validation(format!("week of {date} is out of range")))?;
        self.resolve_range(monday, sunday)
    }

    /// Base rotation for `count` weeks starting with the week of `from`.
    pub fn upcoming_weeks(&self, from: NaiveDate, count: usize) -> DutyResult<Vec<WeekSummary>> {
        if count > MAX_UPCOMING_WEEKS {
            return Err(DutyError::validation(format!(
                "{count} weeks requested, at most {MAX_UPCOMING_WEEKS} allowed"
            )));
        }
        check_date(from)?;
        let directory = self.directory()?;
        let first = monday_of(from);
        (0..count as i64)
            .map(|n| {
                let monday = first
                    .checked_add_signed(Duration::weeks(n))
                    .filter(|m| in_store_range(*m))
                    .ok_or_else(|| {
                        DutyError::validation(format!("week {n} after {from} is out of range"))
                    })?;
                let week_index = self.week_number(monday);
                let (primary, secondary) = directory.weekly_pair(weekly_duty(week_index));
                Ok(WeekSummary {
                    week_index,
                    monday,
                    primary: primary.cloned(),
                    secondary: secondary.cloned(),
                })
            })
            .collect()
    }

    pub fn month_grid(&self, year: i32, month: u32) -> DutyResult<MonthGrid> {
        let span = MonthSpan::new(year, month)?;
        let days = self.resolve_range(span.first, span.last)?;
        MonthGrid::assemble(&span, days)
    }

    // ── Substitutions ──────────────────────────────────────────

    pub fn lookup(&self, date: NaiveDate) -> DutyResult<SlotSubstitutions> {
        self.store.substitutions_on(date)
    }

    pub fn lookup_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DutyResult<std::collections::BTreeMap<NaiveDate, SlotSubstitutions>> {
        self.store.substitutions_between(start, end)
    }

    /// Put `substitute_id` in `slot` for every date of `[start, end]`.
    ///
    /// Dates where the slot does not exist (secondary on weekends) are
    /// skipped and reported. Re-running the same request updates the
    /// existing records instead of adding new ones.
    pub fn insert_or_update_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        slot: RotationSlot,
        substitute_id: &str,
        reason: Option<&str>,
    ) -> DutyResult<RangeOutcome> {
        check_range(start, end)?;
        if (end - start).num_days() >= MAX_RANGE_DAYS {
            return Err(DutyError::validation(format!(
                "range {start}..{end} exceeds {MAX_RANGE_DAYS} days"
            )));
        }
        if !self.is_known_employee(substitute_id) {
            return Err(DutyError::validation(format!("unknown employee '{substitute_id}'")));
        }
        let reason = clean_reason(reason);

        // Built-ins only: originals are keyed by id, profile patches don't matter.
        let directory = EmployeeDirectory::build(
            &self.config.rotation,
            &self.config.escalation,
            &Default::default(),
        );
        let resolver = Resolver::new(self.config.anchor_date, &directory);

        let mut drafts = Vec::new();
        let mut skipped = Vec::new();
        for date in days_between(start, end) {
            match resolver.original_assignee(date, slot) {
                Some(original) => drafts.push(SubstitutionDraft {
                    date,
                    slot,
                    original_employee_id: original.id.clone(),
                    substitute_employee_id: substitute_id.to_string(),
                    reason: reason.map(String::from),
                }),
                None => skipped.push(date),
            }
        }

        if drafts.is_empty() {
            log::info!("substitution: {start}..{end} {slot} → {substitute_id}: every date skipped");
            return Err(DutyError::EmptyRange { skipped });
        }

        let applied = self.store.upsert_substitutions(&drafts)?;
        log::info!(
            "substitution: {start}..{end} {slot} → {substitute_id}: {} applied, {} skipped",
            applied.len(),
            skipped.len()
        );
        Ok(RangeOutcome { applied, skipped })
    }

    pub fn reassign_substitution(
        &self,
        id: SubstitutionId,
        substitute_id: &str,
        reason: Option<&str>,
    ) -> DutyResult<Substitution> {
        if !self.is_known_employee(substitute_id) {
            return Err(DutyError::validation(format!("unknown employee '{substitute_id}'")));
        }
        let updated = self.store.update_substitute(id, substitute_id, clean_reason(reason))?;
        log::info!("substitution: {id} reassigned to {substitute_id}");
        Ok(updated)
    }

    pub fn delete_substitution(&self, id: SubstitutionId) -> DutyResult<()> {
        self.store.delete_substitution(id)?;
        log::info!("substitution: {id} deleted");
        Ok(())
    }

    /// All stored substitutions marked "range" or "single" for review.
    pub fn list_coalesced(&self) -> DutyResult<Vec<CoalescedSubstitution>> {
        let all = self.store.all_substitutions()?;
        Ok(coalesce(&all))
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn apply(&self, command: AdminCommand) -> DutyResult<CommandOutcome> {
        match command {
            AdminCommand::AssignRange { start, end, slot, substitute_id, reason } => self
                .insert_or_update_range(start, end, slot, &substitute_id, reason.as_deref())
                .map(CommandOutcome::RangeAssigned),
            AdminCommand::Reassign { id, substitute_id, reason } => self
                .reassign_substitution(id, &substitute_id, reason.as_deref())
                .map(CommandOutcome::Reassigned),
            AdminCommand::DeleteSubstitution { id } => {
                self.delete_substitution(id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            AdminCommand::SetProfile { employee_id, profile } => {
                self.set_profile(&employee_id, &profile)?;
                Ok(CommandOutcome::ProfileUpdated { employee_id })
            }
            AdminCommand::ResetProfileField { employee_id, field } => {
                self.reset_profile_field(&employee_id, field)?;
                Ok(CommandOutcome::ProfileUpdated { employee_id })
            }
        }
    }
}

fn in_store_range(date: NaiveDate) -> bool {
    (FIRST_YEAR..=LAST_YEAR).contains(&date.year())
}

fn check_date(date: NaiveDate) -> DutyResult<()> {
    if in_store_range(date) {
        Ok(())
    } else {
        Err(DutyError::validation(format!(
            "date {date} is outside years {FIRST_YEAR}..={LAST_YEAR}"
        )))
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> DutyResult<()> {
    check_date(start)?;
    check_date(end)?;
    if end < start {
        return Err(DutyError::validation(format!("range end {end} is before start {start}")));
    }
    Ok(())
}

/// Every date of `[start, end]`, `end` included even at the calendar's edge.
fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), move |d| d.succ_opt().filter(|next| *next <= end))
        .take_while(move |d| *d <= end)
}

/// Blank reasons are stored as no reason so they coalesce with `None`.
fn clean_reason(reason: Option<&str>) -> Option<&str> {
    reason.map(str::trim).filter(|r| !r.is_empty())
}
