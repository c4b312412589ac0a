use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Source of the calendar date that decides which rotated file is "today's".
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock date in either the host's local timezone or UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemClock {
    #[default]
    Local,
    Utc,
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self {
            SystemClock::Local => Local::now().date_naive(),
            SystemClock::Utc => Utc::now().date_naive(),
        }
    }
}

/// Clock whose date only changes when told to. Clones share the same date.
#[derive(Debug, Clone)]
pub struct ManualClock {
    date: Arc<Mutex<NaiveDate>>,
}

impl ManualClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(Mutex::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        match self.date.lock() {
            Ok(mut guard) => *guard = date,
            Err(poisoned) => *poisoned.into_inner() = date,
        }
    }

    /// Move the date forward by `days` calendar days.
    pub fn advance_days(&self, days: u64) {
        let next = self.today() + chrono::Days::new(days);
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        match self.date.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
