//! Workspace - the operations a front end calls
//!
//! Every operation takes the [`Session`] explicitly and checks its
//! preconditions before touching the filesystem or spawning a process.
//! Commits (manual and scheduled) hold the snapshot-store lock from mirror
//! through commit.

use crate::assistant::AssistantInvoker;
use crate::picker::DirectoryPicker;
use crate::session::Session;
use shadow_core::{auto_commit_message, files, CommitOutcome, SnapshotStore, VcsAdapter, VcsError};
use shadow_foundation::{AutoCommitOutcome, Error, EventBus, EventKind, Result, ShadowConfig};
use shadow_task::{CommitScheduler, ScheduledTask, TaskId, TaskState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Title passed to the directory picker
pub const PICKER_TITLE: &str = "Select repository";

/// Result of a successful assistant run
#[derive(Debug, Clone)]
pub struct AssistantReply {
    /// Combined stdout and stderr
    pub output: String,

    /// Background commit scheduled for this run, if history is initialized
    pub auto_commit: Option<TaskId>,
}

pub struct Workspace {
    config: ShadowConfig,
    vcs: VcsAdapter,
    assistant: AssistantInvoker,
    scheduler: CommitScheduler,
    events: Arc<EventBus>,

    /// Serializes commit cycles against the snapshot store
    store_lock: Arc<Mutex<()>>,
}

impl Workspace {
    pub fn new(config: ShadowConfig) -> Self {
        Self::with_events(config, Arc::new(EventBus::new()))
    }

    pub fn with_events(config: ShadowConfig, events: Arc<EventBus>) -> Self {
        Self {
            vcs: VcsAdapter::from_config(&config),
            assistant: AssistantInvoker::from_config(&config.assistant),
            scheduler: CommitScheduler::new(Arc::clone(&events)),
            events,
            config,
            store_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    // ========================================================================
    // Repository selection
    // ========================================================================

    /// Ask the picker for a directory. A cancelled pick leaves the session as is.
    pub async fn select_repository(
        &self,
        session: &mut Session,
        picker: &dyn DirectoryPicker,
    ) -> Result<Option<PathBuf>> {
        match picker.pick_directory(PICKER_TITLE).await? {
            Some(path) => self.select_path(session, path).await.map(Some),
            None => Ok(None),
        }
    }

    /// Select an existing directory; the stored path is canonical
    pub async fn select_path(&self, session: &mut Session, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| Error::InvalidPath(format!("{}: {}", path.display(), e)))?;
        if !canonical.is_dir() {
            return Err(Error::InvalidPath(format!(
                "{}: not a directory",
                canonical.display()
            )));
        }

        session.select(canonical.clone());
        info!(repo = %canonical.display(), "Selected repository");
        self.events
            .publish(EventKind::RepositorySelected {
                path: canonical.clone(),
            })
            .await;
        Ok(canonical)
    }

    // ========================================================================
    // History
    // ========================================================================

    pub async fn initialize_history(&self, session: &mut Session) -> Result<SnapshotStore> {
        let repo = session.require_repo()?.to_path_buf();
        let store = self.vcs.init_repo(&repo).await.map_err(vcs_error)?;

        session.attach_store(store.clone());
        self.events
            .publish(EventKind::HistoryInitialized {
                store: store.path().to_path_buf(),
            })
            .await;
        Ok(store)
    }

    /// Whether the selected repository already has a snapshot store.
    /// A positive answer attaches the store to the session.
    pub async fn check_history_exists(&self, session: &mut Session) -> Result<bool> {
        let repo = session.require_repo()?.to_path_buf();
        if !self.vcs.is_initialized(&repo)? {
            return Ok(false);
        }

        let store = SnapshotStore::for_repo(repo);
        session.attach_store(store.clone());
        self.events
            .publish(EventKind::HistoryAttached {
                store: store.path().to_path_buf(),
            })
            .await;
        Ok(true)
    }

    pub async fn commit_changes(&self, session: &Session, message: &str) -> Result<CommitOutcome> {
        let store = session.require_store()?;

        let outcome = {
            let _guard = self.store_lock.lock().await;
            self.vcs.commit(store, message).await.map_err(vcs_error)?
        };

        let event = match &outcome {
            CommitOutcome::Committed { message } => EventKind::SnapshotCommitted {
                message: message.clone(),
            },
            CommitOutcome::NothingToCommit => EventKind::NothingToCommit,
        };
        self.events.publish(event).await;
        Ok(outcome)
    }

    /// Most recent commits first, one line per entry
    pub async fn commit_history(&self, session: &Session) -> Result<Vec<String>> {
        let store = session.require_store()?;
        self.vcs
            .log(store, self.config.commit.history_limit)
            .await
            .map_err(vcs_error)
    }

    // ========================================================================
    // Assistant
    // ========================================================================

    /// Run the assistant in the repository. On success a snapshot commit is
    /// scheduled after the settle delay; the reply does not wait for it.
    pub async fn invoke_assistant(&self, session: &Session, prompt: &str) -> Result<AssistantReply> {
        let repo = session.require_repo()?;
        let output = self.assistant.invoke(repo, prompt).await?;

        self.events
            .publish(EventKind::AssistantCompleted {
                prompt: prompt.to_string(),
            })
            .await;

        let auto_commit = match session.snapshot_store() {
            Some(store) => Some(self.schedule_auto_commit(store.clone(), prompt).await),
            None => {
                warn!("Local history not initialized; skipping auto-commit");
                None
            }
        };

        Ok(AssistantReply {
            output,
            auto_commit,
        })
    }

    async fn schedule_auto_commit(&self, store: SnapshotStore, prompt: &str) -> TaskId {
        let message = auto_commit_message(
            &self.config.commit.auto_label,
            prompt,
            self.config.assistant.summary_limit,
        );
        let delay = Duration::from_millis(self.config.assistant.settle_delay_ms);
        let vcs = self.vcs.clone();
        let lock = Arc::clone(&self.store_lock);
        let description = message.clone();

        self.scheduler
            .schedule(description, delay, async move {
                let _guard = lock.lock().await;
                match vcs.commit(&store, &message).await {
                    Ok(CommitOutcome::Committed { message }) => {
                        AutoCommitOutcome::Committed { message }
                    }
                    Ok(CommitOutcome::NothingToCommit) => AutoCommitOutcome::NothingToCommit,
                    Err(e) => AutoCommitOutcome::Failed {
                        reason: e.to_string(),
                    },
                }
            })
            .await
    }

    // ========================================================================
    // Auto-commit tasks
    // ========================================================================

    pub async fn cancel_auto_commit(&self, task_id: TaskId) -> bool {
        self.scheduler.cancel(task_id).await
    }

    pub async fn auto_commit_state(&self, task_id: TaskId) -> Option<TaskState> {
        self.scheduler.state(task_id).await
    }

    pub async fn auto_commits(&self) -> Vec<ScheduledTask> {
        self.scheduler.list().await
    }

    /// Resolve the short task id printed to users
    pub async fn find_auto_commit(&self, prefix: &str) -> Result<TaskId> {
        self.scheduler
            .find_by_prefix(prefix)
            .await
            .ok_or_else(|| Error::Task(format!("No unique auto-commit matches '{}'", prefix)))
    }

    pub async fn wait_for_auto_commit(&self, task_id: TaskId) -> Option<TaskState> {
        self.scheduler.wait(task_id).await
    }

    pub async fn wait_for_auto_commits(&self) {
        self.scheduler.wait_all().await
    }

    /// Forget finished auto-commits; returns how many were dropped
    pub async fn clear_finished_auto_commits(&self) -> usize {
        self.scheduler.clear_finished().await
    }

    // ========================================================================
    // Files
    // ========================================================================

    pub async fn list_files(&self, session: &Session) -> Result<Vec<String>> {
        let repo = session.require_repo()?;
        files::list_files(repo)
    }

    pub async fn read_file(&self, session: &Session, name: &str) -> Result<String> {
        let repo = session.require_repo()?;
        files::read_file(repo, name)
    }

    pub async fn write_file(&self, session: &Session, name: &str, content: &str) -> Result<()> {
        let repo = session.require_repo()?;
        files::write_file(repo, name, content)
    }
}

fn vcs_error(err: VcsError) -> Error {
    match err {
        VcsError::Mirror(e) => Error::Mirror(e.to_string()),
        VcsError::NotInitialized { .. } => Error::HistoryNotInitialized,
        other => Error::Vcs(other.to_string()),
    }
}
