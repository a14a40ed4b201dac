//! Commit Scheduler - delayed, cancellable background commits
//!
//! Features:
//! - Each job waits out its delay, then runs exactly once
//! - Cancellation is honoured only while the job is still pending
//! - Lifecycle is published on the EventBus
//! - Any number of callers can await a job's final state

use crate::state::TaskState;
use crate::task::{ScheduledTask, TaskId};
use chrono::Utc;
use shadow_foundation::{AutoCommitOutcome, EventBus, EventKind};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct TaskEntry {
    task: ScheduledTask,
    cancel: CancellationToken,

    /// Flips to true once the final state is recorded
    done: watch::Receiver<bool>,
}

type TaskTable = Arc<RwLock<HashMap<TaskId, TaskEntry>>>;

/// Runs auto-commit jobs after a settle delay
#[derive(Clone)]
pub struct CommitScheduler {
    /// All tasks by ID (finished ones are kept until cleared)
    tasks: TaskTable,

    /// Lifecycle notifications
    events: Arc<EventBus>,
}

impl CommitScheduler {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Spawn `job` to run after `delay`.
    ///
    /// The job future is not polled until the delay has elapsed, and not at
    /// all if the task is cancelled first.
    pub async fn schedule<F>(&self, description: impl Into<String>, delay: Duration, job: F) -> TaskId
    where
        F: Future<Output = AutoCommitOutcome> + Send + 'static,
    {
        let task = ScheduledTask::new(description, delay);
        let task_id = task.id;
        let cancel = CancellationToken::new();
        let (done_tx, done) = watch::channel(false);

        {
            let mut tasks = self.tasks.write().await;
            tasks.insert(
                task_id,
                TaskEntry {
                    task,
                    cancel: cancel.clone(),
                    done,
                },
            );
        }

        self.events
            .publish(EventKind::AutoCommitScheduled {
                task_id: task_id.full(),
                delay_ms: delay.as_millis() as u64,
            })
            .await;
        debug!(task_id = %task_id, delay_ms = delay.as_millis() as u64, "Scheduled auto-commit");

        let tasks = Arc::clone(&self.tasks);
        let events = Arc::clone(&self.events);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => AutoCommitOutcome::Cancelled,
                _ = tokio::time::sleep(delay) => {
                    if Self::start(&tasks, task_id).await {
                        job.await
                    } else {
                        AutoCommitOutcome::Cancelled
                    }
                }
            };

            Self::finish(&tasks, task_id, &outcome).await;
            match &outcome {
                AutoCommitOutcome::Failed { reason } => {
                    warn!(task_id = %task_id, "Auto-commit failed: {}", reason)
                }
                other => info!(task_id = %task_id, "Auto-commit {}", other),
            }
            events
                .publish(EventKind::AutoCommitFinished {
                    task_id: task_id.full(),
                    outcome: outcome.clone(),
                })
                .await;

            // Waiters may have gone away
            let _ = done_tx.send(true);
        });

        task_id
    }

    /// Move a pending task to Running, unless a cancel got there first
    async fn start(tasks: &TaskTable, task_id: TaskId) -> bool {
        let mut tasks = tasks.write().await;
        match tasks.get_mut(&task_id) {
            Some(entry) if !entry.cancel.is_cancelled() => {
                entry.task.state = TaskState::Running;
                true
            }
            _ => false,
        }
    }

    async fn finish(tasks: &TaskTable, task_id: TaskId, outcome: &AutoCommitOutcome) {
        let mut tasks = tasks.write().await;
        if let Some(entry) = tasks.get_mut(&task_id).filter(|e| !e.task.state.is_terminal()) {
            entry.task.state = TaskState::from_outcome(outcome);
            entry.task.finished_at = Some(Utc::now());
        }
    }

    /// Cancel a task that has not started yet.
    ///
    /// Returns false if the task is unknown, already running or finished.
    pub async fn cancel(&self, task_id: TaskId) -> bool {
        let tasks = self.tasks.read().await;
        match tasks.get(&task_id) {
            Some(entry) if entry.task.state.is_pending() && !entry.cancel.is_cancelled() => {
                entry.cancel.cancel();
                info!(task_id = %task_id, "Cancelled auto-commit");
                true
            }
            _ => false,
        }
    }

    pub async fn state(&self, task_id: TaskId) -> Option<TaskState> {
        let tasks = self.tasks.read().await;
        tasks.get(&task_id).map(|entry| entry.task.state.clone())
    }

    pub async fn get(&self, task_id: TaskId) -> Option<ScheduledTask> {
        let tasks = self.tasks.read().await;
        tasks.get(&task_id).map(|entry| entry.task.clone())
    }

    /// Resolve the short id shown to users
    pub async fn find_by_prefix(&self, prefix: &str) -> Option<TaskId> {
        let tasks = self.tasks.read().await;
        let mut matches = tasks.keys().filter(|id| id.matches_prefix(prefix));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Some(*id),
            _ => None,
        }
    }

    /// All known tasks, oldest first
    pub async fn list(&self) -> Vec<ScheduledTask> {
        let tasks = self.tasks.read().await;
        let mut list: Vec<_> = tasks.values().map(|entry| entry.task.clone()).collect();
        list.sort_by_key(|task| task.created_at);
        list
    }

    /// Tasks that have not reached a terminal state
    pub async fn active_count(&self) -> usize {
        let tasks = self.tasks.read().await;
        tasks
            .values()
            .filter(|entry| !entry.task.state.is_terminal())
            .count()
    }

    /// Wait for one task; returns its final state.
    ///
    /// Any number of callers may wait on the same task.
    pub async fn wait(&self, task_id: TaskId) -> Option<TaskState> {
        let mut done = {
            let tasks = self.tasks.read().await;
            tasks.get(&task_id)?.done.clone()
        };

        if done.wait_for(|finished| *finished).await.is_err() {
            // The job panicked before its state was recorded
            warn!(task_id = %task_id, "Auto-commit task aborted");
            Self::finish(
                &self.tasks,
                task_id,
                &AutoCommitOutcome::Failed {
                    reason: "auto-commit task aborted".to_string(),
                },
            )
            .await;
        }

        self.state(task_id).await
    }

    /// Wait for every known task
    pub async fn wait_all(&self) {
        let ids: Vec<TaskId> = {
            let tasks = self.tasks.read().await;
            tasks.keys().copied().collect()
        };

        for id in ids {
            self.wait(id).await;
        }
    }

    /// Forget finished tasks; returns how many were removed
    pub async fn clear_finished(&self) -> usize {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, entry| !entry.task.state.is_terminal());
        before - tasks.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
