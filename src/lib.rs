//! This crate is the derived-state engine of a personal task tracker.
//!
//! It maintains a mirror of the task records held by a remote store (the [`client`]
//! module talks to its REST API) and derives three things from it:
//!
//! * an analytics snapshot (completion rate, priority and weekday breakdowns,
//!   per-task completion durations) in the [`stats`] module,
//! * a monthly calendar grid bucketing incomplete tasks by due date, in the
//!   [`calendar`] module,
//! * time-triggered notifications (an end-of-day summary followed by an automatic
//!   "plan tomorrow" request), driven by the [`scheduler`] module.
//!
//! The [`tracker`] module ties these together around one explicit application-state
//! object. Persistence, authentication and presentation stay outside: the engine only
//! reacts to a session token being present and to 401-style rejections.

pub mod traits;

mod task;
pub use task::{CompletionStatus, Priority, Reminder, Task, TaskDraft, TaskId, TaskPatch};
mod notification;
pub use notification::{Notification, NotificationCenter, NotificationId};

pub mod stats;
pub use stats::Snapshot;
pub mod calendar;
pub use calendar::MonthGrid;

mod error;
pub use error::Error;
mod session;
pub use session::Session;

pub mod client;
pub use client::Client;
pub mod tracker;
pub use tracker::TaskTracker;
pub mod scheduler;
pub use scheduler::Scheduler;
