//! Event Types - events emitted by every layer
//!
//! Events are typed: each [`EventKind`] variant carries its own payload so
//! listeners can match on it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Event ID
// ============================================================================

/// Unique event ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event Category
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Repository selection and history attachment
    Session,
    /// Snapshot commits
    Snapshot,
    /// Assistant invocations
    Assistant,
    /// Scheduled background work
    Task,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Snapshot => "snapshot",
            Self::Assistant => "assistant",
            Self::Task => "task",
        }
    }
}

// ============================================================================
// Auto-commit outcome
// ============================================================================

/// Terminal result of a scheduled post-assistant commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AutoCommitOutcome {
    /// A new snapshot commit was recorded
    Committed { message: String },
    /// The assistant left the tree unchanged
    NothingToCommit,
    /// Mirror or VCS failure
    Failed { reason: String },
    /// Cancelled before the commit started
    Cancelled,
}

impl AutoCommitOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl std::fmt::Display for AutoCommitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Committed { message } => write!(f, "committed: {}", message),
            Self::NothingToCommit => write!(f, "nothing to commit"),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ============================================================================
// Event kinds
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    RepositorySelected { path: PathBuf },
    HistoryInitialized { store: PathBuf },
    HistoryAttached { store: PathBuf },
    SnapshotCommitted { message: String },
    NothingToCommit,
    AssistantCompleted { prompt: String },
    AutoCommitScheduled { task_id: String, delay_ms: u64 },
    AutoCommitFinished { task_id: String, outcome: AutoCommitOutcome },
}

impl EventKind {
    pub fn category(&self) -> EventCategory {
        match self {
            Self::RepositorySelected { .. }
            | Self::HistoryInitialized { .. }
            | Self::HistoryAttached { .. } => EventCategory::Session,
            Self::SnapshotCommitted { .. } | Self::NothingToCommit => EventCategory::Snapshot,
            Self::AssistantCompleted { .. } => EventCategory::Assistant,
            Self::AutoCommitScheduled { .. } | Self::AutoCommitFinished { .. } => {
                EventCategory::Task
            }
        }
    }

    /// Dotted event name, e.g. `task.auto_commit_finished`
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RepositorySelected { .. } => "session.repository_selected",
            Self::HistoryInitialized { .. } => "session.history_initialized",
            Self::HistoryAttached { .. } => "session.history_attached",
            Self::SnapshotCommitted { .. } => "snapshot.committed",
            Self::NothingToCommit => "snapshot.nothing_to_commit",
            Self::AssistantCompleted { .. } => "assistant.completed",
            Self::AutoCommitScheduled { .. } => "task.auto_commit_scheduled",
            Self::AutoCommitFinished { .. } => "task.auto_commit_finished",
        }
    }
}

// ============================================================================
// ShadowEvent
// ============================================================================

/// An event with identity and timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl ShadowEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn category(&self) -> EventCategory {
        self.kind.category()
    }

    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }
}

impl From<EventKind> for ShadowEvent {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}
