use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::tracker::{
    habit::{Habit, HabitId},
    profile::Profile,
};

/// The whole persisted state of a tracker.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TrackerRecord {
    pub profile: ProfileEntity,
    #[serde(default)]
    pub habits: Vec<HabitEntity>,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntity {
    pub name: String,
    pub join_date: NaiveDate,
}

/// A habit as it's stored on disk. `target_per_week` is signed and defaulted so that a hand
/// edited record with a missing or negative target still loads.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntity {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub target_per_week: i64,
    #[serde(default)]
    pub completions: Vec<NaiveDate>,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<&Habit> for HabitEntity {
    fn from(habit: &Habit) -> Self {
        HabitEntity {
            id: habit.id().0,
            name: habit.name().to_string(),
            target_per_week: habit.target_per_week() as i64,
            completions: habit.completions().iter().copied().collect(),
            created_at: habit.created_at(),
            note: habit.note().map(str::to_string),
        }
    }
}

impl From<HabitEntity> for Habit {
    fn from(
        HabitEntity {
            id,
            name,
            target_per_week,
            completions,
            created_at,
            note,
        }: HabitEntity,
    ) -> Self {
        let target = u32::try_from(target_per_week).ok();
        Habit::restore(HabitId(id), name, target, completions, created_at, note)
    }
}

impl From<&Profile> for ProfileEntity {
    fn from(profile: &Profile) -> Self {
        ProfileEntity {
            name: profile.name.clone(),
            join_date: profile.join_date,
        }
    }
}

impl From<ProfileEntity> for Profile {
    fn from(ProfileEntity { name, join_date }: ProfileEntity) -> Self {
        Profile::new(name, join_date)
    }
}
