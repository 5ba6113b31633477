//! The in-memory, session-scoped notification log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identifier of a notification event.
///
/// Ids are derived from the creation timestamp (milliseconds since the epoch) and bumped
/// on collision, so they are unique and monotonic within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(i64);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A notification event, consumed by the presentation layer.
///
/// Notifications are transient: they are never persisted and are lost when the
/// session ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    message: String,
    date: DateTime<Utc>,
}

impl Notification {
    pub fn id(&self) -> NotificationId { self.id }
    pub fn message(&self) -> &str { &self.message }
    pub fn date(&self) -> &DateTime<Utc> { &self.date }
}

/// An append-only log of notification events.
///
/// The core only ever appends; entries are removed by explicit user dismissal or a
/// bulk clear, never by the core itself.
#[derive(Clone, Debug, Default)]
pub struct NotificationCenter {
    entries: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification created at `date`, and return its id
    pub fn push<S: ToString>(&mut self, message: S, date: DateTime<Utc>) -> NotificationId {
        let mut id = NotificationId(date.timestamp_millis());
        // Two notifications in the same millisecond must not share an id
        if let Some(last) = self.entries.last() {
            if last.id >= id {
                id = NotificationId(last.id.0 + 1);
            }
        }
        log::debug!("Notification {}: {}", id, message.to_string());
        self.entries.push(Notification {
            id,
            message: message.to_string(),
            date,
        });
        id
    }

    /// Remove the entry with this id. Dismissing an id that is not in the log is a no-op.
    pub fn dismiss(&mut self, id: NotificationId) {
        self.entries.retain(|notification| notification.id != id);
    }

    /// Drop every entry ("Clear All")
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The entries, in the order they were appended
    pub fn as_slice(&self) -> &[Notification] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
