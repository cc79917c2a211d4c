//! Wall-clock port, so cycle timestamps can be pinned in tests.

use chrono::{NaiveDateTime, Utc};

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Current UTC time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}
