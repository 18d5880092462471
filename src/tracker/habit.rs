use std::{collections::BTreeSet, fmt::Display};

use chrono::NaiveDate;

use crate::utils::{
    percentage::Percentage,
    time::{in_month, in_week_window, weeks_in_month},
};

/// Weekly target used when none, or an invalid one, was given.
pub const DEFAULT_TARGET_PER_WEEK: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HabitId(pub i64);

impl Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked recurring behavior. Completions are calendar days, so marking the same day twice is
/// the same as marking it once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    id: HabitId,
    name: String,
    target_per_week: u32,
    completions: BTreeSet<NaiveDate>,
    created_at: NaiveDate,
    note: Option<String>,
}

/// Progress of a habit within one calendar month. Counts are `u64` since a weekly target near
/// `u32::MAX` times five weeks doesn't fit in `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthProgress {
    pub completions: u64,
    pub monthly_target: u64,
    pub percent: Percentage,
}

impl MonthProgress {
    pub fn is_met(&self) -> bool {
        self.completions >= self.monthly_target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitStatus {
    Active,
    Finished,
}

impl Display for HabitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HabitStatus::Active => write!(f, "Aktif"),
            HabitStatus::Finished => write!(f, "Selesai"),
        }
    }
}

fn normalize_target(target: Option<u32>) -> u32 {
    match target {
        Some(v) if v >= 1 => v,
        _ => DEFAULT_TARGET_PER_WEEK,
    }
}

impl Habit {
    pub fn new(
        id: HabitId,
        name: String,
        target_per_week: Option<u32>,
        created_at: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Self::restore(id, name, target_per_week, std::iter::empty(), created_at, note)
    }

    /// Rebuilds a habit from stored parts, dropping duplicate days.
    pub fn restore(
        id: HabitId,
        name: String,
        target_per_week: Option<u32>,
        completions: impl IntoIterator<Item = NaiveDate>,
        created_at: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            target_per_week: normalize_target(target_per_week),
            completions: completions.into_iter().collect(),
            created_at,
            note: note.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn id(&self) -> HabitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_per_week(&self) -> u32 {
        self.target_per_week
    }

    pub fn completions(&self) -> &BTreeSet<NaiveDate> {
        &self.completions
    }

    pub fn created_at(&self) -> NaiveDate {
        self.created_at
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Records `day`. Returns false if it was already recorded.
    pub fn mark_complete(&mut self, day: NaiveDate) -> bool {
        self.completions.insert(day)
    }

    pub(crate) fn unmark(&mut self, day: NaiveDate) -> bool {
        self.completions.remove(&day)
    }

    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completions.contains(&day)
    }

    /// Completions in the 7 calendar days ending at `reference`, both ends included.
    pub fn this_week_completions(&self, reference: NaiveDate) -> Vec<NaiveDate> {
        self.completions
            .iter()
            .copied()
            .filter(|day| in_week_window(*day, reference))
            .collect()
    }

    /// A single completion in the window is enough, regardless of the weekly target.
    pub fn is_completed_this_week(&self, reference: NaiveDate) -> bool {
        self.completions
            .iter()
            .any(|day| in_week_window(*day, reference))
    }

    /// Projects the weekly target onto `month` (1-based) of `year`.
    pub fn progress(&self, year: i32, month: u32) -> MonthProgress {
        let monthly_target =
            u64::from(self.target_per_week) * u64::from(weeks_in_month(year, month));
        let completions = self
            .completions
            .iter()
            .filter(|day| in_month(**day, year, month))
            .count() as u64;

        MonthProgress {
            completions,
            monthly_target,
            percent: Percentage::of(completions, monthly_target),
        }
    }

    pub fn status(&self, year: i32, month: u32) -> HabitStatus {
        if self.progress(year, month).is_met() {
            HabitStatus::Finished
        } else {
            HabitStatus::Active
        }
    }
}
