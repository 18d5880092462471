use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_REMINDER_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum number of habits listed by a single reminder.
pub const MAX_REMINDED_HABITS: usize = 5;

/// Periodic reminder timer owned by the tracker. It does nothing on its own: whoever waits for
/// input also awaits [Reminder::tick] and prints the reminder when it resolves. Both
/// [Reminder::start] and [Reminder::stop] are no-ops when already in the requested state.
#[derive(Debug)]
pub struct Reminder {
    period: Duration,
    interval: Option<Interval>,
}

impl Reminder {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Arms the timer. The first tick comes one full period from now.
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        // A reminder that was missed while a command ran shouldn't fire twice in a row.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        debug!("Reminder started with period {:?}", self.period);
    }

    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            debug!("Reminder stopped");
        }
    }

    /// Resolves on the next tick. Never resolves while the reminder is stopped.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

impl Default for Reminder {
    fn default() -> Self {
        Self::new(DEFAULT_REMINDER_INTERVAL)
    }
}
