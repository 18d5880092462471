use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing dates across application. Every "today" used by
/// the tracker goes through it so tests can pin the calendar.
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Local>;

    /// Local calendar day of [Clock::time].
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a single moment.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Local>);

#[cfg(test)]
impl FixedClock {
    /// Noon of `day` in local time, far away from any DST transition edge.
    pub fn at_day(day: NaiveDate) -> Self {
        let noon = day
            .and_hms_opt(12, 0, 0)
            .expect("Noon is always a valid time")
            .and_local_timezone(Local)
            .earliest()
            .unwrap_or_else(Local::now);
        Self(noon)
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn time(&self) -> DateTime<Local> {
        self.0
    }
}
