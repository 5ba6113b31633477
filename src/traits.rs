//! The seams between the derived-state engine and its collaborators

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};

/// The authoritative task store, reachable over the network.
///
/// The engine treats it as a black box with fetch-and-replace semantics: it never
/// caches store state beyond the current task list, and any successful mutation
/// returns the store's view of the record.
///
/// Implementations must map a credentials rejection to [`Error::Unauthorized`]: the
/// caller relies on that variant to trigger the logout path.
#[async_trait]
pub trait TaskStore {
    /// Fetch the full task list
    async fn list_tasks(&self) -> Result<Vec<Task>, Error>;

    /// Create a task; the store assigns its id and returns the stored record
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, Error>;

    /// Apply a partial update and return the updated record
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, Error>;

    async fn delete_task(&self, id: &TaskId) -> Result<(), Error>;

    /// Ask the store to plan tomorrow's tasks from historical completion patterns.
    /// Returns whether any planning occurred; the engine only branches on that boolean.
    async fn plan_tomorrow(&self) -> Result<bool, Error>;
}

/// A source of wall-clock time.
///
/// The scheduler and the tracker read time through this trait so that tests can drive
/// them with a controllable clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
