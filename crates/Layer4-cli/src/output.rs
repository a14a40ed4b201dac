//! Terminal formatting shared by one-shot and shell modes

use chrono::Local;
use shadow_core::CommitOutcome;
use shadow_foundation::AutoCommitOutcome;
use shadow_task::{ScheduledTask, TaskState};

pub fn commit_line(outcome: &CommitOutcome) -> String {
    match outcome {
        CommitOutcome::Committed { message } => format!("✓ Committed: {}", message),
        CommitOutcome::NothingToCommit => "Nothing to commit".to_string(),
    }
}

pub fn auto_commit_line(task_id: &str, outcome: &AutoCommitOutcome) -> String {
    let short = task_id.get(..8).unwrap_or(task_id);
    let symbol = TaskState::from_outcome(outcome).symbol();
    format!("[auto-commit {}] {} {}", short, symbol, outcome)
}

pub fn task_line(task: &ScheduledTask) -> String {
    format!(
        "{} {:<8} {:<10} {} {}",
        task.state.symbol(),
        task.id,
        task.state,
        task.created_at.with_timezone(&Local).format("%H:%M:%S"),
        task.description
    )
}

/// Final state of a task in words
pub fn describe_state(state: &TaskState) -> String {
    match state {
        TaskState::Completed(outcome) => outcome.to_string(),
        TaskState::Failed(reason) => format!("failed: {}", reason),
        other => other.to_string().to_lowercase(),
    }
}

pub fn history_lines(entries: &[String]) -> Vec<String> {
    if entries.is_empty() {
        vec!["(no commits yet)".to_string()]
    } else {
        entries.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_commit_line() {
        assert_eq!(
            commit_line(&CommitOutcome::NothingToCommit),
            "Nothing to commit"
        );
        assert!(commit_line(&CommitOutcome::Committed {
            message: "Assistant snapshot - x".into()
        })
        .ends_with("Assistant snapshot - x"));
    }

    #[test]
    fn test_auto_commit_line_uses_short_id() {
        let line = auto_commit_line(
            "0123456789abcdef",
            &AutoCommitOutcome::Failed {
                reason: "no store".into(),
            },
        );
        assert_eq!(line, "[auto-commit 01234567] ✗ failed: no store");
    }

    #[test]
    fn test_task_line_contains_description() {
        let task = ScheduledTask::new("Assistant prompt: tidy", Duration::from_secs(2));
        let line = task_line(&task);
        assert!(line.contains(&task.id.to_string()));
        assert!(line.contains("Pending"));
        assert!(line.ends_with("Assistant prompt: tidy"));
    }

    #[test]
    fn test_describe_state() {
        assert_eq!(describe_state(&TaskState::Cancelled), "cancelled");
        assert_eq!(
            describe_state(&TaskState::Completed(AutoCommitOutcome::NothingToCommit)),
            "nothing to commit"
        );
    }

    #[test]
    fn test_empty_history_placeholder() {
        assert_eq!(history_lines(&[]), vec!["(no commits yet)"]);
    }
}
