use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Once-per-day trigger keyed on a UTC wall-clock time.
///
/// Starting the process after today's trigger time does not fire the
/// schedule immediately; the first run happens at the next occurrence.
#[derive(Debug)]
pub struct DailySchedule {
    at: NaiveTime,
    last_fired: Option<NaiveDate>,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, now: DateTime<Utc>) -> Self {
        let last_fired = if now.time() >= at { Some(now.date_naive()) } else { None };
        Self { at, last_fired }
    }

    /// Returns true at most once per UTC day, the first time `now` reaches
    /// the configured time.
    pub fn due(&mut self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        if self.last_fired == Some(today) || now.time() < self.at {
            return false;
        }
        self.last_fired = Some(today);
        true
    }
}
