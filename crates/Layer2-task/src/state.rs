//! Task state machine

use serde::{Deserialize, Serialize};
use shadow_foundation::AutoCommitOutcome;

/// Possible states of a scheduled commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// Waiting out its delay; still cancellable
    Pending,

    /// The commit cycle has started
    Running,

    /// Commit finished (committed or nothing to commit)
    Completed(AutoCommitOutcome),

    /// Mirror or VCS failure
    Failed(String),

    /// Cancelled before it ran
    Cancelled,
}

impl TaskState {
    /// Terminal state matching a finished job's outcome
    pub fn from_outcome(outcome: &AutoCommitOutcome) -> Self {
        match outcome {
            AutoCommitOutcome::Failed { reason } => TaskState::Failed(reason.clone()),
            AutoCommitOutcome::Cancelled => TaskState::Cancelled,
            other => TaskState::Completed(other.clone()),
        }
    }

    /// Check if this is a terminal state (cannot transition further)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed(_) | TaskState::Failed(_) | TaskState::Cancelled
        )
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskState::Pending => "Pending",
            TaskState::Running => "Running",
            TaskState::Completed(_) => "Completed",
            TaskState::Failed(_) => "Failed",
            TaskState::Cancelled => "Cancelled",
        }
    }

    /// Get a symbol for the state (for terminal output)
    pub fn symbol(&self) -> &'static str {
        match self {
            TaskState::Pending => "◯",
            TaskState::Running => "⟳",
            TaskState::Completed(_) => "✓",
            TaskState::Failed(_) => "✗",
            TaskState::Cancelled => "⊘",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
