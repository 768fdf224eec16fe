//! In-memory notifications and the clock that stamps them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type given to notifications added without one.
pub const DEFAULT_NOTIFICATION_TYPE: &str = "info";

/// A user-visible notification.
///
/// Notifications only live in memory; they are never written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Creation time in Unix milliseconds. Two notifications created in the
    /// same millisecond share an id.
    pub id: i64,
    pub message: String,
    /// Free-form category such as `"info"` or `"error"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped at `now`.
    pub fn new(message: impl Into<String>, kind: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis(),
            message: message.into(),
            kind: kind.into(),
            timestamp: now,
        }
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}
