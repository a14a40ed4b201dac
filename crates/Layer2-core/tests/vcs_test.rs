//! Snapshot store tests against the real `git` binary
//!
//! Skipped (passing) when `git` is not on PATH.
//!
//! `cargo test -p shadow-core --test vcs_test`

use shadow_core::{CommitOutcome, Mirror, VcsAdapter, VcsError, VcsTool};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn git_available() -> bool {
    which::which("git").is_ok()
}

fn git_tool() -> VcsTool {
    let tool = VcsTool::new("git")
        .with_env("GIT_AUTHOR_NAME", "Shadow Test")
        .with_env("GIT_AUTHOR_EMAIL", "shadow@example.com")
        .with_env("GIT_COMMITTER_NAME", "Shadow Test")
        .with_env("GIT_COMMITTER_EMAIL", "shadow@example.com")
        .with_env("GIT_CONFIG_NOSYSTEM", "1");
    if cfg!(unix) {
        tool.with_env("GIT_CONFIG_GLOBAL", "/dev/null")
    } else {
        tool
    }
}

fn adapter() -> VcsAdapter {
    VcsAdapter::new(git_tool(), Mirror::default(), "Assistant snapshot")
}

fn repo_fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "hi").unwrap();
    fs::create_dir_all(temp.path().join(".git")).unwrap();
    fs::write(temp.path().join(".git/x"), "native metadata").unwrap();
    temp
}

#[tokio::test]
async fn test_init_creates_store_with_metadata() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let vcs = adapter();

    assert!(!vcs.is_initialized(repo.path()).unwrap());
    let store = vcs.init_repo(repo.path()).await.unwrap();

    assert_eq!(store.path(), repo.path().join(".snapshotstore"));
    assert!(store.path().join(".git").is_dir());
    assert!(vcs.is_initialized(repo.path()).unwrap());

    // Re-running init on an existing store is harmless
    vcs.init_repo(repo.path()).await.unwrap();
}

#[tokio::test]
async fn test_commit_cycle_and_history() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let vcs = adapter();
    let store = vcs.init_repo(repo.path()).await.unwrap();

    assert!(vcs.log(&store, 20).await.unwrap().is_empty());

    let first = vcs.commit(&store, "first").await.unwrap();
    match &first {
        CommitOutcome::Committed { message } => {
            assert!(message.starts_with("Assistant snapshot - first ["));
        }
        other => panic!("expected a commit, got {other:?}"),
    }
    assert_eq!(vcs.log(&store, 20).await.unwrap().len(), 1);
    assert_eq!(
        fs::read_to_string(store.path().join("a.txt")).unwrap(),
        "hi"
    );
    assert!(!store.path().join(".git/x").exists());

    let again = vcs.commit(&store, "first").await.unwrap();
    assert_eq!(again, CommitOutcome::NothingToCommit);

    fs::write(repo.path().join("a.txt"), "hello").unwrap();
    assert!(vcs.commit(&store, "second").await.unwrap().is_committed());

    let history = vcs.log(&store, 20).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].contains("second"));
    assert!(history[1].contains("first"));
}

#[tokio::test]
async fn test_log_respects_limit() {
    if !git_available() {
        return;
    }
    let repo = repo_fixture();
    let vcs = adapter();
    let store = vcs.init_repo(repo.path()).await.unwrap();

    for i in 0..3 {
        fs::write(repo.path().join("a.txt"), format!("v{i}")).unwrap();
        vcs.commit(&store, &format!("change {i}")).await.unwrap();
    }

    assert_eq!(vcs.log(&store, 2).await.unwrap().len(), 2);
    assert_eq!(vcs.log(&store, 20).await.unwrap().len(), 3);
}

/// Same identity settings as `git_tool`, for commands run directly in the live repository
fn git(cwd: &Path, args: &[&str]) -> std::process::Output {
    std::process::Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Shadow Test")
        .env("GIT_AUTHOR_EMAIL", "shadow@example.com")
        .env("GIT_COMMITTER_NAME", "Shadow Test")
        .env("GIT_COMMITTER_EMAIL", "shadow@example.com")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .unwrap()
}

/// A repository that is itself under git, with no commits yet
fn git_repo_fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "hi").unwrap();
    assert!(git(temp.path(), &["init"]).status.success());
    temp
}

fn live_repo_untouched(repo: &Path) {
    let head = git(repo, &["rev-parse", "--verify", "--quiet", "HEAD"]);
    assert!(!head.status.success(), "live repository gained a commit");
    let staged = git(repo, &["diff", "--cached", "--name-only"]);
    assert!(String::from_utf8_lossy(&staged.stdout).trim().is_empty());
}

#[tokio::test]
async fn test_store_without_metadata_never_reaches_live_repository() {
    if !git_available() {
        return;
    }
    let repo = git_repo_fixture();
    let vcs = adapter();
    let store = vcs.init_repo(repo.path()).await.unwrap();
    fs::remove_dir_all(store.path().join(".git")).unwrap();

    let result = vcs.commit(&store, "x").await;
    assert!(
        matches!(result, Err(VcsError::NotInitialized { .. })),
        "expected a refusal, got {result:?}"
    );
    assert!(matches!(
        vcs.log(&store, 20).await,
        Err(VcsError::NotInitialized { .. })
    ));
    live_repo_untouched(repo.path());
}

#[tokio::test]
async fn test_broken_store_metadata_does_not_fall_through() {
    if !git_available() {
        return;
    }
    let repo = git_repo_fixture();
    let vcs = adapter();
    let store = vcs.init_repo(repo.path()).await.unwrap();

    // Metadata directory present but not a repository any more
    fs::remove_dir_all(store.path().join(".git")).unwrap();
    fs::create_dir_all(store.path().join(".git")).unwrap();

    let result = vcs.commit(&store, "x").await;
    assert!(
        matches!(result, Err(VcsError::CommandFailed { .. })),
        "expected a tool failure, got {result:?}"
    );
    live_repo_untouched(repo.path());
}
