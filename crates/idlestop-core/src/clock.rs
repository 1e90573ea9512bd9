//! Time source for the schedule gate and the sampling window

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    /// Today's date (UTC) at `hour:minute:00`
    pub fn today_at(hour: u32, minute: u32) -> Option<Self> {
        Utc::now()
            .date_naive()
            .and_hms_opt(hour, minute, 0)
            .map(|naive| Self(naive.and_utc()))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
