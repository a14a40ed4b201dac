//! End-to-end workspace tests
//!
//! Uses the real `git` binary (tests skip when it is missing) and a small
//! `sh` script standing in for the assistant.
//!
//! `cargo test -p shadow-agent --test workspace_test`

use shadow_agent::{FixedPicker, Session, Workspace};
use shadow_core::CommitOutcome;
use shadow_foundation::{AutoCommitOutcome, Error, EventKind, ShadowConfig};
use shadow_task::TaskState;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn git_available() -> bool {
    which::which("git").is_ok()
}

fn base_config() -> ShadowConfig {
    let config = ShadowConfig::default()
        .vcs_env("GIT_AUTHOR_NAME", "Shadow Test")
        .vcs_env("GIT_AUTHOR_EMAIL", "shadow@example.com")
        .vcs_env("GIT_COMMITTER_NAME", "Shadow Test")
        .vcs_env("GIT_COMMITTER_EMAIL", "shadow@example.com")
        .vcs_env("GIT_CONFIG_NOSYSTEM", "1");
    if cfg!(unix) {
        config.vcs_env("GIT_CONFIG_GLOBAL", "/dev/null")
    } else {
        config
    }
}

/// Assistant replaced by `sh <script> code <prompt>`
fn config_with_assistant(script_dir: &Path, body: &str, settle_ms: u64) -> ShadowConfig {
    let script = script_dir.join("assistant.sh");
    fs::write(&script, body).unwrap();

    let mut config = base_config().assistant_program("sh").settle_delay_ms(settle_ms);
    config.assistant.args = vec![script.to_string_lossy().into_owned(), "code".into()];
    config
}

/// Writes the prompt into `assistant.txt` and echoes it
const EDITING_ASSISTANT: &str = "echo \"edited: $2\"\nprintf '%s' \"$2\" > assistant.txt\n";

const FAILING_ASSISTANT: &str = "echo partial\necho oops >&2\nexit 3\n";

fn repo_fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "hi").unwrap();
    fs::create_dir_all(temp.path().join(".git")).unwrap();
    fs::write(temp.path().join(".git/x"), "native metadata").unwrap();
    temp
}

#[tokio::test]
async fn test_snapshot_scenario() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let workspace = Workspace::new(base_config());
    let mut session = Session::new();

    workspace
        .select_repository(&mut session, &FixedPicker::new(repo.path()))
        .await
        .unwrap();
    let store = workspace.initialize_history(&mut session).await.unwrap();
    assert!(store.path().is_dir());
    assert!(store.path().join(".git").is_dir());

    let first = workspace.commit_changes(&session, "first").await.unwrap();
    assert!(first.is_committed());
    assert_eq!(workspace.commit_history(&session).await.unwrap().len(), 1);

    let again = workspace.commit_changes(&session, "first").await.unwrap();
    assert_eq!(again, CommitOutcome::NothingToCommit);

    fs::write(repo.path().join("a.txt"), "hi there").unwrap();
    let second = workspace.commit_changes(&session, "second").await.unwrap();
    assert!(second.is_committed());

    let history = workspace.commit_history(&session).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].contains("Assistant snapshot - second ["));

    // Native metadata never reaches the store
    assert!(!store.path().join(".git/x").exists());
    assert_eq!(
        fs::read_to_string(store.path().join("a.txt")).unwrap(),
        "hi there"
    );
}

#[tokio::test]
async fn test_existing_history_is_attached() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let workspace = Workspace::new(base_config());

    let mut first = Session::new();
    workspace.select_path(&mut first, repo.path()).await.unwrap();
    workspace.initialize_history(&mut first).await.unwrap();
    workspace.commit_changes(&first, "baseline").await.unwrap();

    let mut second = Session::new();
    workspace.select_path(&mut second, repo.path()).await.unwrap();
    assert!(second.snapshot_store().is_none());
    assert!(workspace.check_history_exists(&mut second).await.unwrap());
    assert!(second.snapshot_store().is_some());
    assert_eq!(workspace.commit_history(&second).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_assistant_without_repository_schedules_nothing() {
    let workspace = Workspace::new(base_config());
    let session = Session::new();

    let err = workspace
        .invoke_assistant(&session, "refactor everything")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoRepositorySelected));
    assert!(err.is_precondition());
    assert!(workspace.auto_commits().await.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_assistant_triggers_auto_commit() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let scripts = TempDir::new().unwrap();
    let workspace = Workspace::new(config_with_assistant(scripts.path(), EDITING_ASSISTANT, 10));
    let mut events = workspace.events().receiver();
    let mut session = Session::new();

    workspace.select_path(&mut session, repo.path()).await.unwrap();
    workspace.initialize_history(&mut session).await.unwrap();

    let reply = workspace
        .invoke_assistant(&session, "write the notes")
        .await
        .unwrap();
    assert_eq!(reply.output, "edited: write the notes\n");
    assert_eq!(
        fs::read_to_string(repo.path().join("assistant.txt")).unwrap(),
        "write the notes"
    );

    let task_id = reply.auto_commit.expect("auto-commit should be scheduled");
    match workspace.wait_for_auto_commit(task_id).await {
        Some(TaskState::Completed(AutoCommitOutcome::Committed { message })) => {
            assert!(message.starts_with("Assistant snapshot - Assistant prompt: write the notes ["));
        }
        other => panic!("unexpected state: {:?}", other),
    }

    let history = workspace.commit_history(&session).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(repo.path().join(".snapshotstore/assistant.txt").is_file());

    let mut finished = false;
    while let Ok(event) = events.try_recv() {
        if let EventKind::AutoCommitFinished { task_id: id, outcome } = event.kind {
            assert_eq!(id, task_id.full());
            assert!(!outcome.is_failure());
            finished = true;
        }
    }
    assert!(finished);
}

#[cfg(unix)]
#[tokio::test]
async fn test_long_prompt_is_truncated_in_commit() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let scripts = TempDir::new().unwrap();
    let workspace = Workspace::new(config_with_assistant(scripts.path(), EDITING_ASSISTANT, 0));
    let mut session = Session::new();

    workspace.select_path(&mut session, repo.path()).await.unwrap();
    workspace.initialize_history(&mut session).await.unwrap();

    let prompt = "x".repeat(60);
    let reply = workspace.invoke_assistant(&session, &prompt).await.unwrap();
    let state = workspace
        .wait_for_auto_commit(reply.auto_commit.unwrap())
        .await;

    let expected = format!("Assistant prompt: {}... [", "x".repeat(50));
    match state {
        Some(TaskState::Completed(AutoCommitOutcome::Committed { message })) => {
            assert!(message.contains(&expected), "{message}");
        }
        other => panic!("unexpected state: {:?}", other),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancelled_auto_commit_leaves_history_empty() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let scripts = TempDir::new().unwrap();
    let workspace = Workspace::new(config_with_assistant(
        scripts.path(),
        EDITING_ASSISTANT,
        60_000,
    ));
    let mut session = Session::new();

    workspace.select_path(&mut session, repo.path()).await.unwrap();
    workspace.initialize_history(&mut session).await.unwrap();

    let reply = workspace.invoke_assistant(&session, "hold on").await.unwrap();
    let task_id = reply.auto_commit.unwrap();
    assert_eq!(
        workspace.auto_commit_state(task_id).await,
        Some(TaskState::Pending)
    );

    assert!(workspace.cancel_auto_commit(task_id).await);
    workspace.wait_for_auto_commits().await;
    assert_eq!(
        workspace.auto_commit_state(task_id).await,
        Some(TaskState::Cancelled)
    );
    assert!(workspace.commit_history(&session).await.unwrap().is_empty());

    assert_eq!(workspace.clear_finished_auto_commits().await, 1);
    assert!(workspace.auto_commits().await.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_assistant_without_history_skips_auto_commit() {
    let repo = repo_fixture();
    let scripts = TempDir::new().unwrap();
    let workspace = Workspace::new(config_with_assistant(scripts.path(), EDITING_ASSISTANT, 0));
    let mut session = Session::new();
    workspace.select_path(&mut session, repo.path()).await.unwrap();

    let reply = workspace.invoke_assistant(&session, "quick fix").await.unwrap();
    assert!(reply.auto_commit.is_none());
    assert!(workspace.auto_commits().await.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_assistant_reports_output() {
    let repo = repo_fixture();
    let scripts = TempDir::new().unwrap();
    let workspace = Workspace::new(config_with_assistant(scripts.path(), FAILING_ASSISTANT, 0));
    let mut session = Session::new();
    workspace.select_path(&mut session, repo.path()).await.unwrap();

    match workspace.invoke_assistant(&session, "break it").await {
        Err(Error::Assistant { output, .. }) => assert_eq!(output, "partial\noops\n"),
        other => panic!("unexpected result: {:?}", other.map(|r| r.output)),
    }
    assert!(workspace.auto_commits().await.is_empty());
}

#[tokio::test]
async fn test_store_without_metadata_reports_missing_history() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let workspace = Workspace::new(base_config());
    let mut session = Session::new();

    workspace.select_path(&mut session, repo.path()).await.unwrap();
    let store = workspace.initialize_history(&mut session).await.unwrap();
    fs::remove_dir_all(store.path().join(".git")).unwrap();

    assert!(matches!(
        workspace.commit_changes(&session, "x").await,
        Err(Error::HistoryNotInitialized)
    ));
    assert!(matches!(
        workspace.commit_history(&session).await,
        Err(Error::HistoryNotInitialized)
    ));
    assert!(!store.path().join("a.txt").exists());
    assert!(!workspace.check_history_exists(&mut session).await.unwrap());
}

fn committed_count(outcomes: &[CommitOutcome]) -> usize {
    outcomes.iter().filter(|o| o.is_committed()).count()
}

#[tokio::test]
async fn test_concurrent_commits_are_serialized() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let workspace = Workspace::new(base_config());
    let mut session = Session::new();

    workspace.select_path(&mut session, repo.path()).await.unwrap();
    workspace.initialize_history(&mut session).await.unwrap();
    fs::write(repo.path().join("b.txt"), "new").unwrap();

    let (a, b) = tokio::join!(
        workspace.commit_changes(&session, "left"),
        workspace.commit_changes(&session, "right"),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let history = workspace.commit_history(&session).await.unwrap();
    assert!(!history.is_empty());
    assert_eq!(committed_count(&outcomes), history.len());
}

#[cfg(unix)]
#[tokio::test]
async fn test_auto_commit_and_manual_commit_do_not_collide() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let scripts = TempDir::new().unwrap();
    let workspace = Workspace::new(config_with_assistant(scripts.path(), EDITING_ASSISTANT, 0));
    let mut session = Session::new();

    workspace.select_path(&mut session, repo.path()).await.unwrap();
    workspace.initialize_history(&mut session).await.unwrap();

    let reply = workspace.invoke_assistant(&session, "race").await.unwrap();
    let manual = workspace.commit_changes(&session, "manual").await.unwrap();
    let auto = workspace
        .wait_for_auto_commit(reply.auto_commit.unwrap())
        .await;

    let auto_committed = match auto {
        Some(TaskState::Completed(AutoCommitOutcome::Committed { .. })) => 1,
        Some(TaskState::Completed(AutoCommitOutcome::NothingToCommit)) => 0,
        other => panic!("unexpected state: {:?}", other),
    };
    let history = workspace.commit_history(&session).await.unwrap();
    assert!(!history.is_empty());
    assert_eq!(committed_count(&[manual]) + auto_committed, history.len());
}
