//! Session boundary detection.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// Decides whether a tick opens a new trading session.
pub trait SessionOracle {
    /// Returns true if a tick at `timestamp` starts a new session.
    fn is_new_session(&mut self, timestamp: DateTime<Utc>) -> bool;
}

/// Sessions that roll over once a day at a fixed UTC time.
///
/// The first tick observed never counts as a boundary: it seeds the stream
/// anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySession {
    start: NaiveTime,
    current: Option<DateTime<Utc>>,
}

impl DailySession {
    /// Creates sessions starting each day at `start` (UTC).
    #[must_use]
    pub const fn new(start: NaiveTime) -> Self {
        Self {
            start,
            current: None,
        }
    }

    /// Creates sessions starting at midnight UTC.
    #[must_use]
    pub const fn midnight() -> Self {
        Self::new(NaiveTime::MIN)
    }

    /// Returns the daily start time.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the start of the session containing `timestamp`.
    #[must_use]
    pub fn session_start_for(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let candidate = timestamp.date_naive().and_time(self.start).and_utc();
        if timestamp >= candidate {
            candidate
        } else {
            candidate - TimeDelta::days(1)
        }
    }
}

impl Default for DailySession {
    fn default() -> Self {
        Self::midnight()
    }
}

impl SessionOracle for DailySession {
    fn is_new_session(&mut self, timestamp: DateTime<Utc>) -> bool {
        let start = self.session_start_for(timestamp);
        match self.current {
            Some(current) if start <= current => false,
            Some(_) => {
                self.current = Some(start);
                true
            }
            None => {
                self.current = Some(start);
                false
            }
        }
    }
}

/// A single session spanning the whole stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoSession;

impl SessionOracle for NoSession {
    fn is_new_session(&mut self, _timestamp: DateTime<Utc>) -> bool {
        false
    }
}
