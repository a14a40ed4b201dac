//! Scheduled task definition

use crate::state::TaskState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a new random TaskId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Hyphenated UUID (the `Display` form is shortened)
    pub fn full(&self) -> String {
        self.0.to_string()
    }

    /// Whether the hyphenated form starts with `prefix`
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.full().starts_with(prefix)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Snapshot of a scheduled task for external queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: TaskId,

    /// What the task will do (the commit summary)
    pub description: String,

    /// Wait before running
    pub delay: Duration,

    pub state: TaskState,

    pub created_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,
}

impl ScheduledTask {
    pub fn new(description: impl Into<String>, delay: Duration) -> Self {
        Self {
            id: TaskId::new(),
            description: description.into(),
            delay,
            state: TaskState::Pending,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}
