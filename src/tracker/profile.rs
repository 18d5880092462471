use chrono::NaiveDate;

use super::habit::Habit;

/// Name the profile gets when a data file is created without one.
pub const DEFAULT_PROFILE_NAME: &str = "Adit";

/// User profile. Only `name` and `join_date` are stored, the counters are derived from the habit
/// list through [Profile::update_stats].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub join_date: NaiveDate,
    pub total_habits: usize,
    pub completed_this_week: usize,
}

impl Profile {
    pub fn new(name: String, join_date: NaiveDate) -> Self {
        Self {
            name,
            join_date,
            total_habits: 0,
            completed_this_week: 0,
        }
    }

    /// Counts habits, and habits with at least one completion in the week ending at `today`.
    pub fn update_stats(&mut self, habits: &[Habit], today: NaiveDate) {
        self.total_habits = habits.len();
        self.completed_this_week = habits
            .iter()
            .filter(|h| h.is_completed_this_week(today))
            .count();
    }

    pub fn days_joined(&self, today: NaiveDate) -> i64 {
        (today - self.join_date).num_days().max(0)
    }
}
