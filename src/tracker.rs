//! The application state and its lifecycle: session, task list, notification log
//!
//! This replaces ambient global state with one explicit object. All reads of the derived
//! views ([`stats`](crate::stats), [`calendar`](crate::calendar)) go through it, and all
//! mutations of the task list flow through the remote store first: the store is the
//! source of truth, the local list is a fetch-and-replace mirror.

use std::sync::Arc;

use chrono::{NaiveDate, Timelike};

use crate::calendar::MonthGrid;
use crate::error::Error;
use crate::notification::{NotificationCenter, NotificationId};
use crate::session::Session;
use crate::stats::Snapshot;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::traits::{Clock, SystemClock, TaskStore};

/// The hour (0-23) at which the end-of-day summary fires.
///
/// Defaults to 5:00 PM; use [`TaskTracker::set_end_of_day_hour`] to override it.
pub const DEFAULT_END_OF_DAY_HOUR: u32 = 17;

/// The engine around one user's task collection.
///
/// All computations are inert until a token is stored in the [`Session`]; on logout the
/// task list is cleared, while the notification log survives (it is separate,
/// presentation-facing state).
pub struct TaskTracker<S: TaskStore> {
    store: S,
    session: Session,
    clock: Arc<dyn Clock>,

    tasks: Vec<Task>,
    notifications: NotificationCenter,

    end_of_day_hour: u32,
    /// Gate so the end-of-day summary fires at most once per calendar day
    last_summary_date: Option<NaiveDate>,
}

impl<S: TaskStore> TaskTracker<S> {
    pub fn new(store: S, session: Session) -> Self {
        Self::new_with_clock(store, session, Arc::new(SystemClock))
    }

    /// Create a tracker that reads time through a custom [`Clock`] (used by tests)
    pub fn new_with_clock(store: S, session: Session, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            session,
            clock,
            tasks: Vec::new(),
            notifications: NotificationCenter::new(),
            end_of_day_hour: DEFAULT_END_OF_DAY_HOUR,
            last_summary_date: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Override the end-of-day trigger hour. Must be a real hour (0-23): the whole point
    /// of making this configurable is that an impossible value silently disables the
    /// summary path.
    pub fn set_end_of_day_hour(&mut self, hour: u32) -> Result<(), Error> {
        if hour > 23 {
            return Err(Error::InvalidConfig(format!(
                "{} is not a valid hour (expected 0-23)",
                hour
            )));
        }
        self.end_of_day_hour = hour;
        Ok(())
    }

    /// Clear the session and the task list.
    ///
    /// The notification log is deliberately retained: it is separate, transient state
    /// that the user may still want to read.
    pub fn logout(&mut self) {
        log::info!("Logging out: clearing the session token and the task list");
        self.session.logout();
        self.tasks.clear();
    }

    /// Log the failure of a store operation and, on a credentials rejection, run the
    /// logout path before handing the error back
    fn store_failure(&mut self, what: &str, err: Error) -> Error {
        match err {
            Error::Unauthorized => {
                log::warn!("Unable to {}: the store rejected our credentials", what);
                self.logout();
            }
            ref other => {
                // No automatic retry: the operation is abandoned and the user re-triggers it
                log::warn!("Unable to {}: {}", what, other);
            }
        }
        err
    }

    /// Fetch-and-replace the task list from the store
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let result = self.store.list_tasks().await;
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => Err(self.store_failure("fetch the task list", err)),
        }
    }

    /// Validate and create a task. An invalid draft (empty title, malformed reminder
    /// address) is rejected locally: the store is not called at all.
    pub async fn add_task(&mut self, draft: &TaskDraft) -> Result<TaskId, Error> {
        draft.validate()?;

        let result = self.store.create_task(draft).await;
        match result {
            Ok(task) => {
                let id = task.id().clone();
                self.tasks.push(task);
                Ok(id)
            }
            Err(err) => Err(self.store_failure("create the task", err)),
        }
    }

    /// Apply a partial update to a task.
    ///
    /// When the patch transitions the task from pending to completed, a
    /// "Task completed" notification is appended.
    pub async fn update_task(&mut self, id: &TaskId, patch: &TaskPatch) -> Result<(), Error> {
        patch.validate()?;

        let was_completed = self
            .tasks
            .iter()
            .find(|task| task.id() == id)
            .map(|task| task.completed())
            .unwrap_or(false);

        let result = self.store.update_task(id, patch).await;
        match result {
            Ok(updated) => {
                if updated.completed() && was_completed == false {
                    let message = format!("Task completed: {}", updated.title());
                    self.notifications.push(message, self.clock.now());
                }
                match self.tasks.iter_mut().find(|task| task.id() == id) {
                    Some(task) => *task = updated,
                    // The record was not in our mirror; the next refresh will reconcile
                    None => log::debug!("Updated task {} is not in the local list", id),
                }
                Ok(())
            }
            Err(err) => Err(self.store_failure("update the task", err)),
        }
    }

    /// Flip a task's completion state, stamping or clearing its completion timestamp
    pub async fn toggle_completion(&mut self, id: &TaskId) -> Result<(), Error> {
        let patch = match self.tasks.iter().find(|task| task.id() == id) {
            Some(task) => TaskPatch::toggling_completion(task, self.clock.now()),
            None => {
                return Err(Error::InvalidTask(format!("no task with id {}", id)));
            }
        };
        self.update_task(id, &patch).await
    }

    pub async fn delete_task(&mut self, id: &TaskId) -> Result<(), Error> {
        let result = self.store.delete_task(id).await;
        match result {
            Ok(()) => {
                self.tasks.retain(|task| task.id() != id);
                Ok(())
            }
            Err(err) => Err(self.store_failure("delete the task", err)),
        }
    }

    /// Trigger the remote auto-planner once.
    ///
    /// When the store reports that tasks were planned, a notification is appended and
    /// the task list is re-fetched so the new records show up.
    pub async fn plan_tomorrow(&mut self) -> Result<bool, Error> {
        let result = self.store.plan_tomorrow().await;
        match result {
            Ok(false) => Ok(false),
            Ok(true) => {
                self.notifications.push(
                    "Tomorrow's tasks have been automatically planned based on your completion patterns.",
                    self.clock.now(),
                );
                self.refresh().await?;
                Ok(true)
            }
            Err(err) => Err(self.store_failure("plan tomorrow", err)),
        }
    }

    pub fn dismiss_notification(&mut self, id: NotificationId) {
        self.notifications.dismiss(id);
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    /// The analytics snapshot for the current task list
    pub fn stats(&self) -> Snapshot {
        Snapshot::compute(&self.tasks)
    }

    /// The calendar grid for the given displayed month
    pub fn month_grid(&self, year: i32, month: u32) -> MonthGrid {
        MonthGrid::build(&self.tasks, year, month, self.clock.now().date_naive())
    }

    /// One scheduler tick: fire the end-of-day summary when the clock says so.
    ///
    /// The summary fires during the first minute of the configured hour, at most once
    /// per calendar day (a 60-second tick can land in the same minute twice). It counts
    /// the tasks completed today and the tasks still pending, then triggers the
    /// auto-planner; a planner failure never halts subsequent ticks.
    ///
    /// Returns whether the summary fired.
    pub async fn end_of_day_tick(&mut self) -> Result<bool, Error> {
        if self.session.is_authenticated() == false {
            // A tick racing a logout must not resurrect anything
            return Ok(false);
        }

        let now = self.clock.now();
        if now.hour() != self.end_of_day_hour || now.minute() != 0 {
            return Ok(false);
        }

        let today = now.date_naive();
        if self.last_summary_date == Some(today) {
            return Ok(false);
        }
        self.last_summary_date = Some(today);

        let completed_today = self
            .tasks
            .iter()
            .filter(|task| match task.completed_at() {
                Some(completed_at) => completed_at.date_naive() == today,
                None => false,
            })
            .count();
        let pending = self.tasks.iter().filter(|task| task.completed() == false).count();

        self.notifications.push(
            format!(
                "End of day summary: {} tasks completed, {} tasks pending.",
                completed_today, pending
            ),
            now,
        );

        if let Err(err) = self.plan_tomorrow().await {
            log::warn!("Auto-planning after the end-of-day summary failed: {}", err);
        }

        Ok(true)
    }
}
