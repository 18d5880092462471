//! The tracker owns the ordered habit list, the profile and the reminder, and writes everything
//! back to [TrackerStorage] after each mutation. A failed write rolls the mutation back, so what
//! is in memory always matches what was last stored successfully.

pub mod habit;
pub mod profile;
pub mod reminder;
pub mod stats;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use clap::ValueEnum;
use habit::{Habit, HabitId, HabitStatus};
use profile::{Profile, DEFAULT_PROFILE_NAME};
use reminder::{Reminder, DEFAULT_REMINDER_INTERVAL, MAX_REMINDED_HABITS};
use stats::{compute_stats, TrackerStats};
use tracing::{error, info, warn};

use crate::{
    storage::{
        entities::{HabitEntity, TrackerRecord},
        record_storage::TrackerStorage,
    },
    utils::clock::Clock,
};

/// Habits a new user starts with under [InitPolicy::SeedDefaults].
pub const DEFAULT_HABITS: [(&str, u32); 8] = [
    ("Minum 8 gelas air", 7),
    ("Olahraga 30 menit", 3),
    ("Membaca buku", 5),
    ("Tidur sebelum jam 11", 7),
    ("Menulis jurnal", 4),
    ("Jalan kaki 10.000 langkah", 5),
    ("Belajar hal baru", 3),
    ("Merapikan kamar", 2),
];

/// What to do when storage holds no record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPolicy {
    SeedDefaults,
    Empty,
}

/// How [Tracker::open] found the storage.
#[derive(Debug)]
pub enum StartupState {
    /// A stored record was loaded.
    Restored,
    /// Nothing was stored, default habits were created. `save_error` is set when the first
    /// write failed and nothing is on disk yet.
    Seeded { save_error: Option<anyhow::Error> },
    /// Nothing was stored, the tracker starts empty.
    Created { save_error: Option<anyhow::Error> },
    /// The stored record couldn't be read. The tracker starts empty and the unreadable file was
    /// moved to `moved_to` when possible.
    Recovered {
        error: anyhow::Error,
        moved_to: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HabitFilter {
    All,
    Active,
    Finished,
}

pub struct TrackerConfig {
    /// Profile name used when nothing was stored yet.
    pub profile_name: String,
    pub init_policy: InitPolicy,
    pub reminder_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            profile_name: DEFAULT_PROFILE_NAME.into(),
            init_policy: InitPolicy::SeedDefaults,
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
        }
    }
}

pub struct Tracker {
    habits: Vec<Habit>,
    profile: Profile,
    storage: Box<dyn TrackerStorage>,
    clock: Box<dyn Clock>,
    reminder: Reminder,
    last_id: i64,
}

impl Tracker {
    /// Loads the tracker from `storage`. Storage problems never fail the start-up, they are
    /// reported through [StartupState] instead.
    pub async fn open(
        storage: Box<dyn TrackerStorage>,
        clock: Box<dyn Clock>,
        config: TrackerConfig,
    ) -> (Self, StartupState) {
        let today = clock.today();
        let loaded = storage.load().await;
        let mut tracker = Tracker {
            habits: vec![],
            profile: Profile::new(config.profile_name, today),
            storage,
            clock,
            reminder: Reminder::new(config.reminder_interval),
            last_id: 0,
        };

        let state = match loaded {
            Ok(Some(record)) => {
                tracker.restore(record);
                info!("Restored {} habits", tracker.habits.len());
                StartupState::Restored
            }
            Ok(None) => {
                let seeded = config.init_policy == InitPolicy::SeedDefaults;
                if seeded {
                    for (name, target) in DEFAULT_HABITS {
                        let id = tracker.next_id();
                        tracker
                            .habits
                            .push(Habit::new(id, name.into(), Some(target), today, None));
                    }
                    info!("Seeded {} default habits", tracker.habits.len());
                }
                // The in-memory tracker stays usable even if this first write fails.
                let save_error = tracker.save().await.err();
                if seeded {
                    StartupState::Seeded { save_error }
                } else {
                    StartupState::Created { save_error }
                }
            }
            Err(error) => {
                error!("Failed to load stored habits {error:?}");
                let moved_to = tracker
                    .storage
                    .quarantine()
                    .await
                    .inspect_err(|e| error!("Failed to move unreadable record aside {e:?}"))
                    .ok()
                    .flatten();
                StartupState::Recovered { error, moved_to }
            }
        };

        (tracker, state)
    }

    fn restore(&mut self, record: TrackerRecord) {
        self.profile = record.profile.into();
        self.habits = record.habits.into_iter().map(Habit::from).collect();
        self.last_id = self.habits.iter().map(|h| h.id().0).max().unwrap_or(0);
    }

    fn to_record(&self) -> TrackerRecord {
        TrackerRecord {
            profile: (&self.profile).into(),
            habits: self.habits.iter().map(HabitEntity::from).collect(),
        }
    }

    /// Writes the current state to storage.
    pub async fn save(&self) -> Result<()> {
        self.storage
            .save(&self.to_record())
            .await
            .inspect_err(|e| error!("Failed to save habits {e:?}"))
    }

    /// Millisecond timestamp ids, bumped when several habits are created within one millisecond.
    fn next_id(&mut self) -> HabitId {
        let id = self.clock.time().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        HabitId(id)
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.time()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Profile with counters recomputed for `today`.
    pub fn profile(&self, today: NaiveDate) -> Profile {
        let mut profile = self.profile.clone();
        profile.update_stats(&self.habits, today);
        profile
    }

    pub fn reminder(&self) -> &Reminder {
        &self.reminder
    }

    pub fn reminder_mut(&mut self) -> &mut Reminder {
        &mut self.reminder
    }

    /// Appends a habit. A missing or zero target becomes the daily default.
    pub async fn add_habit(
        &mut self,
        name: &str,
        target_per_week: Option<u32>,
        note: Option<String>,
    ) -> Result<&Habit> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Habit name can't be empty");
        }
        let id = self.next_id();
        let habit = Habit::new(id, name.to_string(), target_per_week, self.today(), note);
        self.habits.push(habit);

        if let Err(e) = self.save().await {
            self.habits.pop();
            return Err(e);
        }
        info!("Added habit {name:?} with id {id}");
        Ok(&self.habits[self.habits.len() - 1])
    }

    /// Marks the habit at `index` (0-based) as done on `day`, today by default. Returns false
    /// without touching anything when `index` is out of range.
    pub async fn complete_habit(&mut self, index: usize, day: Option<NaiveDate>) -> Result<bool> {
        let day = day.unwrap_or_else(|| self.today());
        let Some(habit) = self.habits.get_mut(index) else {
            warn!("No habit at index {index}");
            return Ok(false);
        };
        if !habit.mark_complete(day) {
            return Ok(true);
        }

        if let Err(e) = self.save().await {
            self.habits[index].unmark(day);
            return Err(e);
        }
        info!("Completed habit at index {index} for {day}");
        Ok(true)
    }

    /// Removes and returns the habit at `index` (0-based), `None` when out of range.
    pub async fn delete_habit(&mut self, index: usize) -> Result<Option<Habit>> {
        if index >= self.habits.len() {
            warn!("No habit at index {index}");
            return Ok(None);
        }
        let removed = self.habits.remove(index);

        if let Err(e) = self.save().await {
            self.habits.insert(index, removed);
            return Err(e);
        }
        info!("Deleted habit {:?}", removed.name());
        Ok(Some(removed))
    }

    /// Removes every habit. The profile is kept.
    pub async fn clear_all(&mut self) -> Result<Vec<Habit>> {
        let removed = std::mem::take(&mut self.habits);

        if let Err(e) = self.save().await {
            self.habits = removed;
            return Err(e);
        }
        info!("Cleared {} habits", removed.len());
        Ok(removed)
    }

    pub async fn rename_profile(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Profile name can't be empty");
        }
        let previous = std::mem::replace(&mut self.profile.name, name.to_string());

        if let Err(e) = self.save().await {
            self.profile.name = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Habits matching `filter` together with their position in the full list. Active and
    /// finished refer to the status in the month of `today`.
    pub fn habits_filtered(&self, filter: HabitFilter, today: NaiveDate) -> Vec<(usize, &Habit)> {
        let (year, month) = (today.year(), today.month());
        self.habits
            .iter()
            .enumerate()
            .filter(|(_, habit)| match filter {
                HabitFilter::All => true,
                HabitFilter::Active => habit.status(year, month) == HabitStatus::Active,
                HabitFilter::Finished => habit.status(year, month) == HabitStatus::Finished,
            })
            .collect()
    }

    pub fn stats(&self, today: NaiveDate) -> TrackerStats {
        compute_stats(&self.habits, today)
    }

    /// Up to [MAX_REMINDED_HABITS] habits that have no completion for `today`.
    pub fn pending_today(&self, today: NaiveDate) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|habit| !habit.is_completed_on(today))
            .take(MAX_REMINDED_HABITS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::TrackerRecord,
            record_storage::{JsonFileStorage, MockTrackerStorage, TrackerStorage},
        },
        utils::{clock::FixedClock, logging::TEST_LOGGING},
    };

    use super::{
        habit::HabitStatus, HabitFilter, InitPolicy, StartupState, Tracker, TrackerConfig,
        DEFAULT_HABITS,
    };

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// In-memory storage that shares its record with the test.
    #[derive(Clone, Default)]
    struct MemoryStorage {
        record: Arc<Mutex<Option<TrackerRecord>>>,
    }

    #[async_trait]
    impl TrackerStorage for MemoryStorage {
        async fn load(&self) -> Result<Option<TrackerRecord>> {
            Ok(self.record.lock().unwrap().clone())
        }

        async fn save(&self, record: &TrackerRecord) -> Result<()> {
            *self.record.lock().unwrap() = Some(record.clone());
            Ok(())
        }

        async fn quarantine(&self) -> Result<Option<std::path::PathBuf>> {
            Ok(None)
        }
    }

    fn empty_config() -> TrackerConfig {
        TrackerConfig {
            init_policy: InitPolicy::Empty,
            ..TrackerConfig::default()
        }
    }

    async fn open_with(
        storage: impl TrackerStorage + 'static,
        today: NaiveDate,
        config: TrackerConfig,
    ) -> (Tracker, StartupState) {
        *TEST_LOGGING;
        Tracker::open(Box::new(storage), Box::new(FixedClock::at_day(today)), config).await
    }

    #[tokio::test]
    async fn test_seeds_defaults_and_appends() -> Result<()> {
        let storage = MemoryStorage::default();
        let (mut tracker, state) =
            open_with(storage.clone(), day(2025, 4, 9), TrackerConfig::default()).await;

        assert!(matches!(state, StartupState::Seeded { save_error: None }));
        assert_eq!(tracker.habits().len(), DEFAULT_HABITS.len());
        assert_eq!(tracker.habits().len(), 8);
        assert_eq!(
            storage.record.lock().unwrap().as_ref().map(|r| r.habits.len()),
            Some(8)
        );

        let added = tracker.add_habit("Meditate", Some(3), None).await?;
        assert_eq!(added.target_per_week(), 3);
        assert_eq!(tracker.habits().len(), 9);
        assert_eq!(tracker.habits()[8].name(), "Meditate");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_policy_starts_without_habits() {
        let storage = MemoryStorage::default();
        let (tracker, state) = open_with(storage.clone(), day(2025, 4, 9), empty_config()).await;

        assert!(matches!(state, StartupState::Created { save_error: None }));
        assert!(tracker.habits().is_empty());
        let stored = storage.record.lock().unwrap().clone().unwrap();
        assert_eq!(stored.profile.join_date, day(2025, 4, 9));
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let (tracker, _) =
            open_with(MemoryStorage::default(), day(2025, 4, 9), TrackerConfig::default()).await;
        let mut ids = tracker.habits().iter().map(|h| h.id()).collect::<Vec<_>>();
        ids.dedup();
        assert_eq!(ids.len(), DEFAULT_HABITS.len());
    }

    #[tokio::test]
    async fn test_add_habit_defaults_target_and_rejects_blank_name() -> Result<()> {
        let (mut tracker, _) =
            open_with(MemoryStorage::default(), day(2025, 4, 9), empty_config()).await;

        let habit = tracker
            .add_habit("  Stretch  ", None, Some("after waking up".into()))
            .await?;
        assert_eq!(habit.name(), "Stretch");
        assert_eq!(habit.target_per_week(), 7);
        assert_eq!(habit.created_at(), day(2025, 4, 9));

        assert!(tracker.add_habit("   ", Some(3), None).await.is_err());
        assert_eq!(tracker.habits().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_out_of_range() -> Result<()> {
        let (mut tracker, _) =
            open_with(MemoryStorage::default(), day(2025, 4, 9), empty_config()).await;
        tracker.add_habit("Read", Some(3), None).await?;
        tracker.add_habit("Walk", Some(3), None).await?;
        let before = tracker.habits().to_vec();

        assert!(!tracker.complete_habit(2, None).await?);
        assert_eq!(tracker.habits(), before.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_defaults_to_today_and_is_idempotent() -> Result<()> {
        let storage = MemoryStorage::default();
        let (mut tracker, _) = open_with(storage.clone(), day(2025, 4, 9), empty_config()).await;
        tracker.add_habit("Read", Some(3), None).await?;

        assert!(tracker.complete_habit(0, None).await?);
        assert!(tracker.complete_habit(0, None).await?);
        assert!(tracker.complete_habit(0, Some(day(2025, 4, 7))).await?);

        let completions = tracker.habits()[0].completions().iter().copied().collect::<Vec<_>>();
        assert_eq!(completions, vec![day(2025, 4, 7), day(2025, 4, 9)]);
        let stored = storage.record.lock().unwrap().clone().unwrap();
        assert_eq!(stored.habits[0].completions, completions);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_habit() -> Result<()> {
        let (mut tracker, _) =
            open_with(MemoryStorage::default(), day(2025, 4, 9), empty_config()).await;
        tracker.add_habit("Read", Some(3), None).await?;
        tracker.add_habit("Walk", Some(3), None).await?;

        assert!(tracker.delete_habit(2).await?.is_none());
        assert_eq!(tracker.habits().len(), 2);

        let removed = tracker.delete_habit(0).await?.expect("Habit should exist");
        assert_eq!(removed.name(), "Read");
        assert_eq!(tracker.habits().len(), 1);
        assert_eq!(tracker.habits()[0].name(), "Walk");
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_all_and_rename() -> Result<()> {
        let storage = MemoryStorage::default();
        let (mut tracker, _) =
            open_with(storage.clone(), day(2025, 4, 9), TrackerConfig::default()).await;

        assert_eq!(tracker.clear_all().await?.len(), 8);
        tracker.rename_profile("Budi").await?;
        assert!(tracker.habits().is_empty());

        let stored = storage.record.lock().unwrap().clone().unwrap();
        assert!(stored.habits.is_empty());
        assert_eq!(stored.profile.name, "Budi");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_save_keeps_state() -> Result<()> {
        let mut storage = MockTrackerStorage::new();
        storage.expect_load().returning(|| Ok(None));
        let mut saves = 0;
        storage.expect_save().returning(move |_| {
            saves += 1;
            if saves <= 2 {
                Ok(())
            } else {
                Err(anyhow!("disk full"))
            }
        });
        let (mut tracker, _) = open_with(storage, day(2025, 4, 9), empty_config()).await;
        tracker.add_habit("Read", Some(3), None).await?;
        let before = tracker.habits().to_vec();

        assert!(tracker.add_habit("Walk", Some(3), None).await.is_err());
        assert!(tracker.complete_habit(0, None).await.is_err());
        assert!(tracker.delete_habit(0).await.is_err());
        assert!(tracker.clear_all().await.is_err());
        assert!(tracker.rename_profile("Budi").await.is_err());

        assert_eq!(tracker.habits(), before.as_slice());
        assert_eq!(tracker.profile(day(2025, 4, 9)).name, "Adit");
        Ok(())
    }

    #[tokio::test]
    async fn test_first_save_failure_is_reported() {
        let mut storage = MockTrackerStorage::new();
        storage.expect_load().returning(|| Ok(None));
        storage
            .expect_save()
            .times(1)
            .returning(|_| Err(anyhow!("read-only file system")));

        let (tracker, state) = open_with(storage, day(2025, 4, 9), TrackerConfig::default()).await;

        assert_eq!(tracker.habits().len(), DEFAULT_HABITS.len());
        match state {
            StartupState::Seeded {
                save_error: Some(error),
            } => assert!(error.to_string().contains("read-only")),
            other => panic!("Unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_storage_is_recovered() {
        let mut storage = MockTrackerStorage::new();
        storage
            .expect_load()
            .returning(|| Err(anyhow!("expected value at line 1 column 1")));
        storage
            .expect_quarantine()
            .times(1)
            .returning(|| Ok(Some("habits-data.json.corrupt".into())));
        storage.expect_save().never();

        let (tracker, state) = open_with(storage, day(2025, 4, 9), TrackerConfig::default()).await;

        assert!(tracker.habits().is_empty());
        match state {
            StartupState::Recovered { moved_to, .. } => {
                assert_eq!(moved_to, Some("habits-data.json.corrupt".into()))
            }
            other => panic!("Unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("habits-data.json");
        let today = day(2025, 4, 9);

        let (mut tracker, _) = open_with(
            JsonFileStorage::new(path.clone())?,
            today,
            TrackerConfig::default(),
        )
        .await;
        tracker
            .add_habit("Meditate", Some(3), Some("10 minutes".into()))
            .await?;
        tracker.complete_habit(8, Some(day(2025, 4, 8))).await?;
        tracker.complete_habit(8, None).await?;
        tracker.complete_habit(1, None).await?;
        tracker.delete_habit(0).await?;

        let (reloaded, state) =
            open_with(JsonFileStorage::new(path)?, day(2025, 5, 1), TrackerConfig::default()).await;

        assert!(matches!(state, StartupState::Restored));
        assert_eq!(reloaded.habits(), tracker.habits());
        let profile = reloaded.profile(today);
        assert_eq!(profile.name, "Adit");
        assert_eq!(profile.join_date, today);
        Ok(())
    }

    #[tokio::test]
    async fn test_new_ids_follow_restored_ones() -> Result<()> {
        let storage = MemoryStorage::default();
        let (mut first, _) = open_with(storage.clone(), day(2025, 4, 9), empty_config()).await;
        first.add_habit("Read", None, None).await?;
        let first_id = first.habits()[0].id();

        // Same frozen clock, so the timestamp alone would collide.
        let (mut second, _) = open_with(storage, day(2025, 4, 9), empty_config()).await;
        let added = second.add_habit("Walk", None, None).await?;
        assert!(added.id() > first_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_filters_use_current_month() -> Result<()> {
        let today = day(2025, 2, 20);
        let (mut tracker, _) = open_with(MemoryStorage::default(), today, empty_config()).await;
        tracker.add_habit("Weekly", Some(1), None).await?;
        tracker.add_habit("Daily", Some(7), None).await?;
        for d in [3, 10, 17, 18] {
            tracker.complete_habit(0, Some(day(2025, 2, d))).await?;
            tracker.complete_habit(1, Some(day(2025, 2, d))).await?;
        }
        // Done in January doesn't count for February.
        tracker.complete_habit(1, Some(day(2025, 1, 31))).await?;

        assert_eq!(tracker.habits()[0].status(2025, 2), HabitStatus::Finished);

        let finished = tracker.habits_filtered(HabitFilter::Finished, today);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].0, 0);

        let active = tracker.habits_filtered(HabitFilter::Active, today);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, 1);
        assert_eq!(active[0].1.name(), "Daily");

        assert_eq!(tracker.habits_filtered(HabitFilter::All, today).len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_today_limits_to_five() -> Result<()> {
        let today = day(2025, 4, 9);
        let (mut tracker, _) =
            open_with(MemoryStorage::default(), today, TrackerConfig::default()).await;
        tracker.complete_habit(0, None).await?;
        tracker.complete_habit(2, Some(day(2025, 4, 8))).await?;

        let pending = tracker.pending_today(today);
        assert_eq!(pending.len(), 5);
        assert_eq!(pending[0].name(), DEFAULT_HABITS[1].0);

        let count = tracker.habits().len();
        for index in 0..count {
            tracker.complete_habit(index, None).await?;
        }
        assert!(tracker.pending_today(today).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_counts() -> Result<()> {
        let today = day(2025, 4, 20);
        let storage = MemoryStorage::default();
        let (mut tracker, _) = open_with(storage.clone(), day(2025, 4, 9), empty_config()).await;
        tracker.add_habit("Read", Some(3), None).await?;
        tracker.add_habit("Walk", Some(3), None).await?;
        tracker.complete_habit(0, Some(day(2025, 4, 18))).await?;
        tracker.complete_habit(1, Some(day(2025, 4, 10))).await?;

        let profile = tracker.profile(today);
        assert_eq!(profile.total_habits, 2);
        assert_eq!(profile.completed_this_week, 1);
        assert_eq!(profile.days_joined(today), 11);
        Ok(())
    }
}
