//! Completion and productivity analytics, derived from the task list
//!
//! Everything in this module is a pure function of its inputs: the [`Snapshot`] is
//! recomputed from scratch on every task-list change and never stored.

use chrono::{Datelike, Weekday};
use serde::Serialize;

use crate::task::Task;

/// How many completion-time entries a snapshot keeps
const COMPLETION_TIME_ENTRIES: usize = 10;

/// Per-weekday created/completed counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DayCounts {
    pub completed: usize,
    pub created: usize,
}

/// Task counts per priority level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// The elapsed time between creation and completion of one task
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionEntry {
    pub title: String,
    /// Elapsed hours, rounded to one decimal
    pub hours: f64,
}

/// A derived analytics summary of the task list at a point in time.
///
/// `completed + pending` always equals the length of the input list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub completed: usize,
    pub pending: usize,
    /// Integer percentage, 0 when the list is empty
    pub completion_rate: u32,
    pub by_priority: PriorityCounts,
    /// Weekday buckets, indexed Sunday..Saturday (see [`Snapshot::day`])
    pub by_day: [DayCounts; 7],
    /// Elapsed creation-to-completion times, truncated to the first 10 entries in
    /// input order. This is *not* a "most recent" selection: callers that want
    /// recency must pre-sort the input list.
    pub completion_time: Vec<CompletionEntry>,
}

/// The weekday display names, Sunday first
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

impl Snapshot {
    /// Compute the snapshot for the given task list.
    ///
    /// Weekday buckets are computed from the UTC timestamps; a task lacking the
    /// relevant timestamp is excluded from that bucket only, not from the counts.
    pub fn compute(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed()).count();
        let pending = tasks.len() - completed;

        let completion_rate = if tasks.is_empty() {
            0
        } else {
            ((completed as f64 / tasks.len() as f64) * 100.0).round() as u32
        };

        let mut by_priority = PriorityCounts::default();
        let mut by_day = [DayCounts::default(); 7];
        let mut completion_time = Vec::new();

        for task in tasks {
            match task.priority() {
                crate::task::Priority::High => by_priority.high += 1,
                crate::task::Priority::Medium => by_priority.medium += 1,
                crate::task::Priority::Low => by_priority.low += 1,
            }

            if let Some(created_at) = task.created_at() {
                by_day[day_index(created_at.weekday())].created += 1;
            }
            if let Some(completed_at) = task.completed_at() {
                by_day[day_index(completed_at.weekday())].completed += 1;

                if let Some(created_at) = task.created_at() {
                    let elapsed = completed_at.signed_duration_since(*created_at);
                    let hours = elapsed.num_seconds() as f64 / 3600.0;
                    completion_time.push(CompletionEntry {
                        title: task.title().to_string(),
                        hours: (hours * 10.0).round() / 10.0,
                    });
                }
            }
        }

        completion_time.truncate(COMPLETION_TIME_ENTRIES);

        Self {
            completed,
            pending,
            completion_rate,
            by_priority,
            by_day,
            completion_time,
        }
    }

    /// The counters for a given weekday
    pub fn day(&self, weekday: Weekday) -> &DayCounts {
        &self.by_day[day_index(weekday)]
    }
}

fn day_index(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}
