use chrono::{Datelike, NaiveDate};

use crate::utils::percentage::Percentage;

use super::habit::{Habit, HabitStatus, MonthProgress};

/// How many habits are shown at each end of the ranking.
pub const RANKING_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitProgress {
    /// Position in the tracker's list.
    pub index: usize,
    pub name: String,
    pub progress: MonthProgress,
    pub status: HabitStatus,
}

/// Monthly statistics for the whole tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStats {
    pub year: i32,
    pub month: u32,
    pub entries: Vec<HabitProgress>,
    pub average: Percentage,
    pub top: Vec<HabitProgress>,
    pub bottom: Vec<HabitProgress>,
    pub finished: usize,
    pub active: usize,
}

/// Computes statistics for the month containing `today`. Habits with equal percentages keep the
/// order of the tracker list in both rankings.
pub fn compute_stats(habits: &[Habit], today: NaiveDate) -> TrackerStats {
    let (year, month) = (today.year(), today.month());
    let entries = habits
        .iter()
        .enumerate()
        .map(|(index, habit)| {
            let progress = habit.progress(year, month);
            HabitProgress {
                index,
                name: habit.name().to_string(),
                progress,
                status: if progress.is_met() {
                    HabitStatus::Finished
                } else {
                    HabitStatus::Active
                },
            }
        })
        .collect::<Vec<_>>();

    let average = Percentage::average(entries.iter().map(|v| v.progress.percent));

    // sort_by is stable, which keeps ties in list order.
    let mut descending = entries.clone();
    descending.sort_by(|a, b| b.progress.percent.cmp(&a.progress.percent));
    let top = descending.into_iter().take(RANKING_SIZE).collect();

    let mut ascending = entries.clone();
    ascending.sort_by(|a, b| a.progress.percent.cmp(&b.progress.percent));
    let bottom = ascending.into_iter().take(RANKING_SIZE).collect();

    let finished = entries
        .iter()
        .filter(|v| v.status == HabitStatus::Finished)
        .count();

    TrackerStats {
        year,
        month,
        active: entries.len() - finished,
        finished,
        entries,
        average,
        top,
        bottom,
    }
}
