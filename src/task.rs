//! Task records, as stored by the remote task store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The task priority, as displayed by the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// The store represents completion as a `completed` boolean and an optional `completedAt`
/// timestamp, yet some combinations make no sense (a pending task with a completion date).
/// This enum provides an API that forbids such impossible combinations.
///
/// The timestamp itself stays optional: records written by other clients may claim to be
/// completed without saying when.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Completed(Option<DateTime<Utc>>),
    Uncompleted,
}
impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed(_) => true,
            _ => false,
        }
    }

    /// The completion timestamp, if the task is completed and the store knows when
    pub fn completed_at(&self) -> Option<&DateTime<Utc>> {
        match self {
            CompletionStatus::Completed(at) => at.as_ref(),
            CompletionStatus::Uncompleted => None,
        }
    }
}

/// The opaque, store-assigned identifier of a task
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-task email reminder metadata.
///
/// The tracker never sends emails itself: it only carries this intent for the external
/// notifier. `notify_email` and `notify_time` are inert unless `email_notify` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    email_notify: bool,
    notify_email: Option<String>,
    /// How many minutes before the due time the reminder should fire
    notify_time: u32,
    /// Set by the external notifier once the reminder has been dispatched.
    /// This crate only ever reads it, and never sends it back to the store.
    #[serde(default, skip_serializing)]
    notified: bool,
}

/// The default advance notice, in minutes
pub const DEFAULT_NOTIFY_TIME: u32 = 15;

impl Default for Reminder {
    fn default() -> Self {
        Self {
            email_notify: false,
            notify_email: None,
            notify_time: DEFAULT_NOTIFY_TIME,
            notified: false,
        }
    }
}

impl Reminder {
    /// Request an email reminder to `address`, `notify_time` minutes before the due time
    pub fn new<S: ToString>(address: S, notify_time: u32) -> Self {
        Self {
            email_notify: true,
            notify_email: Some(address.to_string()),
            notify_time,
            notified: false,
        }
    }

    pub fn email_notify(&self) -> bool {
        self.email_notify
    }
    pub fn notify_email(&self) -> Option<&str> {
        self.notify_email.as_deref()
    }
    pub fn notify_time(&self) -> u32 {
        self.notify_time
    }
    pub fn notified(&self) -> bool {
        self.notified
    }

    /// Check this reminder can be sent to the store.
    ///
    /// A reminder that is not requested is always valid, whatever its other fields contain
    /// (they are inert metadata). A requested reminder needs a syntactically valid address
    /// and a positive advance notice.
    pub fn validate(&self) -> Result<(), Error> {
        if self.email_notify == false {
            return Ok(());
        }
        match self.notify_email.as_deref() {
            Some(address) if is_valid_email(address) => (),
            Some(address) => return Err(Error::InvalidEmail(address.to_string())),
            None => return Err(Error::InvalidEmail(String::new())),
        }
        if self.notify_time == 0 {
            return Err(Error::InvalidTask(
                "the reminder advance notice must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }
}

/// A simple syntactic check: one `@`, a non-empty local part, a dotted domain.
/// The store performs the authoritative validation; this only catches obvious typos
/// before a network call is made.
pub fn is_valid_email(address: &str) -> bool {
    if address.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let mut parts = address.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        None => return false,
        Some(d) => d,
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && domain.starts_with('.') == false && domain.ends_with('.') == false
}

/// A task record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskWire", into = "TaskWire")]
pub struct Task {
    /// The store-assigned identifier
    id: TaskId,

    /// The display name of the task
    title: String,

    /// The completion status of this task
    completion_status: CompletionStatus,

    /// When this task is due, if it is due at all. The time-of-day part is kept for
    /// display; calendar bucketing only looks at the date.
    due_date: Option<DateTime<Utc>>,

    priority: Priority,

    /// The time this record was created. Set once by the store; can be `None` for
    /// records predating the field.
    created_at: Option<DateTime<Utc>>,

    /// Email reminder intent, consumed by the external notifier
    reminder: Reminder,
}

impl Task {
    /// Create a new Task instance from values that are on the store already
    pub fn new_with_parameters(
        id: TaskId,
        title: String,
        completion_status: CompletionStatus,
        due_date: Option<DateTime<Utc>>,
        priority: Priority,
        created_at: Option<DateTime<Utc>>,
        reminder: Reminder,
    ) -> Self {
        Self {
            id,
            title,
            completion_status,
            due_date,
            priority,
            created_at,
            reminder,
        }
    }

    pub fn id(&self) -> &TaskId { &self.id }
    pub fn title(&self) -> &str { &self.title }
    pub fn completed(&self) -> bool { self.completion_status.is_completed() }
    pub fn completion_status(&self) -> &CompletionStatus { &self.completion_status }
    pub fn completed_at(&self) -> Option<&DateTime<Utc>> { self.completion_status.completed_at() }
    pub fn due_date(&self) -> Option<&DateTime<Utc>> { self.due_date.as_ref() }
    pub fn priority(&self) -> Priority { self.priority }
    pub fn created_at(&self) -> Option<&DateTime<Utc>> { self.created_at.as_ref() }
    pub fn reminder(&self) -> &Reminder { &self.reminder }

    pub fn set_title(&mut self, new_title: String) {
        self.title = new_title;
    }

    /// Set the completion status.
    ///
    /// This is the only place the "completedAt present iff completed" invariant is
    /// enforced: completing stamps a timestamp, reopening clears it.
    pub fn set_completion_status(&mut self, new_completion_status: CompletionStatus) {
        self.completion_status = new_completion_status;
    }

    /// Apply a partial update to this record, the way the store does on an update call
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completion_status = if completed {
                CompletionStatus::Completed(patch.completed_at.clone().flatten())
            } else {
                CompletionStatus::Uncompleted
            };
        }
        if let Some(due_date) = &patch.due_date {
            self.due_date = due_date.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(reminder) = &patch.reminder {
            self.reminder = reminder.clone();
        }
    }
}

/// The shape of a task record on the wire (the flat JSON document of the REST API)
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskWire {
    #[serde(rename = "_id")]
    id: TaskId,
    title: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    email_notify: bool,
    #[serde(default)]
    notify_email: Option<String>,
    #[serde(default = "default_notify_time")]
    notify_time: u32,
    #[serde(default)]
    notified: bool,
}

fn default_notify_time() -> u32 {
    DEFAULT_NOTIFY_TIME
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        // A stray completedAt on a pending record is treated as absent
        let completion_status = if wire.completed {
            CompletionStatus::Completed(wire.completed_at)
        } else {
            CompletionStatus::Uncompleted
        };
        Self {
            id: wire.id,
            title: wire.title,
            completion_status,
            due_date: wire.due_date,
            priority: wire.priority,
            created_at: wire.created_at,
            reminder: Reminder {
                email_notify: wire.email_notify,
                notify_email: wire.notify_email,
                notify_time: wire.notify_time,
                notified: wire.notified,
            },
        }
    }
}

impl From<Task> for TaskWire {
    fn from(task: Task) -> Self {
        let (completed, completed_at) = match task.completion_status {
            CompletionStatus::Completed(at) => (true, at),
            CompletionStatus::Uncompleted => (false, None),
        };
        Self {
            id: task.id,
            title: task.title,
            completed,
            completed_at,
            due_date: task.due_date,
            priority: task.priority,
            created_at: task.created_at,
            email_notify: task.reminder.email_notify,
            notify_email: task.reminder.notify_email,
            notify_time: task.reminder.notify_time,
            notified: task.reminder.notified,
        }
    }
}

/// The payload of a task creation call
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    /// New tasks start pending
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub email_notify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_email: Option<String>,
    pub notify_time: u32,
}

impl TaskDraft {
    pub fn new<S: ToString>(title: S, created_at: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            completed: false,
            due_date: None,
            priority: Priority::default(),
            created_at,
            email_notify: false,
            notify_email: None,
            notify_time: DEFAULT_NOTIFY_TIME,
        }
    }

    /// Attach an email reminder request to this draft
    pub fn with_reminder<S: ToString>(mut self, address: S, notify_time: u32) -> Self {
        self.email_notify = true;
        self.notify_email = Some(address.to_string());
        self.notify_time = notify_time;
        self
    }

    pub fn reminder(&self) -> Reminder {
        Reminder {
            email_notify: self.email_notify,
            notify_email: self.notify_email.clone(),
            notify_time: self.notify_time,
            notified: false,
        }
    }

    /// Reject obviously invalid drafts before they reach the store
    pub fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidTask("the task title must not be empty".to_string()));
        }
        self.reminder().validate()
    }
}

/// The payload of a partial task update. Fields that are `None` are left untouched
/// by the store; `completed_at` is doubly optional so that reopening a task can
/// explicitly send `null`.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(flatten)]
    pub reminder: Option<Reminder>,
}

impl TaskPatch {
    /// The patch that flips a task's completion state, stamping or clearing the
    /// completion timestamp at `now`
    pub fn toggling_completion(task: &Task, now: DateTime<Utc>) -> Self {
        let completing = task.completed() == false;
        Self {
            completed: Some(completing),
            completed_at: Some(if completing { Some(now) } else { None }),
            ..Self::default()
        }
    }

    /// Reject obviously invalid patches before they reach the store
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidTask("the task title must not be empty".to_string()));
            }
        }
        match &self.reminder {
            Some(reminder) => reminder.validate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("someone@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));

        assert!(is_valid_email("") == false);
        assert!(is_valid_email("no-at-sign") == false);
        assert!(is_valid_email("@example.com") == false);
        assert!(is_valid_email("someone@") == false);
        assert!(is_valid_email("someone@nodot") == false);
        assert!(is_valid_email("someone@.com") == false);
        assert!(is_valid_email("someone@example.com.") == false);
        assert!(is_valid_email("some one@example.com") == false);
        assert!(is_valid_email("someone@@example.com") == false);
    }

    #[test]
    fn reminder_validation() {
        assert!(Reminder::default().validate().is_ok());
        assert!(Reminder::new("someone@example.com", 15).validate().is_ok());

        match Reminder::new("not-an-address", 15).validate() {
            Err(Error::InvalidEmail(addr)) => assert_eq!(addr, "not-an-address"),
            other => panic!("expected an InvalidEmail error, got {:?}", other),
        }
        assert!(Reminder::new("someone@example.com", 0).validate().is_err());
    }

    #[test]
    fn draft_validation() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert!(TaskDraft::new("Water the plants", now).validate().is_ok());
        assert!(TaskDraft::new("   ", now).validate().is_err());
        assert!(TaskDraft::new("Send report", now)
            .with_reminder("boss@example", 15)
            .validate()
            .is_err());
    }

    #[test]
    fn wire_format() {
        let json = r#"{
            "_id": "65f2a1",
            "title": "Buy groceries",
            "completed": true,
            "completedAt": "2024-03-01T17:30:00Z",
            "dueDate": "2024-03-01T18:00:00Z",
            "priority": "high",
            "createdAt": "2024-03-01T08:00:00Z",
            "emailNotify": true,
            "notifyEmail": "someone@example.com",
            "notifyTime": 30,
            "notified": false
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id(), &TaskId::from("65f2a1"));
        assert_eq!(task.title(), "Buy groceries");
        assert!(task.completed());
        assert_eq!(
            task.completed_at(),
            Some(&Utc.with_ymd_and_hms(2024, 3, 1, 17, 30, 0).unwrap())
        );
        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.reminder().notify_time(), 30);

        // Round-trip through the wire shape
        let back: Task = serde_json::from_str(&serde_json::to_string(&task).unwrap()).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn wire_format_sparse_record() {
        // Legacy records may lack most optional fields, and may even claim completion
        // without a timestamp
        let json = r#"{ "_id": "1", "title": "Old chore", "completed": true }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.completed());
        assert_eq!(task.completed_at(), None);
        assert_eq!(task.priority(), Priority::Medium);
        assert_eq!(task.created_at(), None);
        assert_eq!(task.reminder().notify_time(), DEFAULT_NOTIFY_TIME);

        // A stray completedAt on a pending record is dropped
        let json = r#"{ "_id": "2", "title": "Odd", "completed": false, "completedAt": "2024-03-01T17:30:00Z" }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.completion_status(), &CompletionStatus::Uncompleted);
    }

    #[test]
    fn toggling_patch_keeps_the_completion_invariant() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        let mut task = Task::new_with_parameters(
            TaskId::from("t1"),
            "Fix the gate".to_string(),
            CompletionStatus::Uncompleted,
            None,
            Priority::Medium,
            Some(now),
            Reminder::default(),
        );

        task.apply_patch(&TaskPatch::toggling_completion(&task, now));
        assert_eq!(task.completion_status(), &CompletionStatus::Completed(Some(now)));

        task.apply_patch(&TaskPatch::toggling_completion(&task, now));
        assert_eq!(task.completion_status(), &CompletionStatus::Uncompleted);
        assert_eq!(task.completed_at(), None);
    }
}
