//! VCS Operations
//!
//! Shell-out wrapper around the external version-control tool. Every
//! invocation runs with the snapshot store as its working directory.

use crate::mirror::{Mirror, MirrorError};
use crate::vcs::commit::commit_message_now;
use shadow_foundation::{ShadowConfig, VcsConfig, SNAPSHOT_STORE_DIR};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Directories git must not search upward into
const CEILING_ENV: &str = "GIT_CEILING_DIRECTORIES";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Failed to launch {program}: {source}")]
    Launch { program: String, source: io::Error },

    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Snapshot store {} has no version-control metadata", .path.display())]
    NotInitialized { path: PathBuf },

    #[error("Failed to create snapshot store {}: {source}", .path.display())]
    CreateStore { path: PathBuf, source: io::Error },

    #[error("Failed to copy repository state: {0}")]
    Mirror(#[from] MirrorError),

    #[error("Mirror task aborted: {0}")]
    MirrorTask(String),
}

/// Result of a commit cycle that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit with this message exists
    Committed { message: String },

    /// The tool reported nothing to commit (exit status 1)
    NothingToCommit,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Handle to an initialized snapshot store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    /// The live repository that gets mirrored
    repo_root: PathBuf,

    /// `<repo_root>/.snapshotstore`
    path: PathBuf,
}

impl SnapshotStore {
    /// Store location for a repository (not necessarily initialized)
    pub fn for_repo(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        let path = repo_root.join(SNAPSHOT_STORE_DIR);
        Self { repo_root, path }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// VCS Tool
// ============================================================================

/// The external VCS binary plus extra environment
#[derive(Debug, Clone)]
pub struct VcsTool {
    program: String,
    env: Vec<(String, String)>,
}

impl VcsTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            env: Vec::new(),
        }
    }

    pub fn from_config(config: &VcsConfig) -> Self {
        Self {
            program: config.program.clone(),
            env: config
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Run the tool, returning its output whatever the exit status
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<Output, VcsError> {
        debug!(
            program = %self.program,
            args = ?args,
            cwd = %cwd.display(),
            "Running VCS command"
        );

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(cwd)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        // Never let discovery climb from the store into the repository above it
        if let Some(parent) = cwd.parent() {
            command.env(CEILING_ENV, parent);
        }

        command
            .output()
            .await
            .map_err(|source| VcsError::Launch {
                program: self.program.clone(),
                source,
            })
    }

    /// Run the tool and require a zero exit status
    async fn run_checked(&self, cwd: &Path, args: &[&str]) -> Result<Output, VcsError> {
        let output = self.run(cwd, args).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(self.failure(args, &output))
        }
    }

    fn failure(&self, args: &[&str], output: &Output) -> VcsError {
        VcsError::CommandFailed {
            command: format!("{} {}", self.program, args.join(" ")),
            status: output.status.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

// ============================================================================
// VCS Adapter
// ============================================================================

/// Init / commit / log against a snapshot store
#[derive(Debug, Clone)]
pub struct VcsAdapter {
    tool: VcsTool,
    mirror: Mirror,

    /// Prefix of every commit message
    label: String,

    /// Directory the tool creates inside the store (`.git`)
    metadata_dir: String,
}

impl VcsAdapter {
    pub fn new(tool: VcsTool, mirror: Mirror, label: impl Into<String>) -> Self {
        Self {
            tool,
            mirror,
            label: label.into(),
            metadata_dir: shadow_foundation::NATIVE_VCS_DIR.to_string(),
        }
    }

    pub fn from_config(config: &ShadowConfig) -> Self {
        Self {
            tool: VcsTool::from_config(&config.vcs),
            mirror: Mirror::new(config.mirror.mode),
            label: config.commit.label.clone(),
            metadata_dir: config.vcs.metadata_dir.clone(),
        }
    }

    /// Create `<root>/.snapshotstore` if needed and run `<tool> init` in it
    pub async fn init_repo(&self, root: &Path) -> Result<SnapshotStore, VcsError> {
        let store = SnapshotStore::for_repo(root);

        tokio::fs::create_dir_all(store.path())
            .await
            .map_err(|source| VcsError::CreateStore {
                path: store.path().to_path_buf(),
                source,
            })?;

        self.tool.run_checked(store.path(), &["init"]).await?;

        info!(store = %store.path().display(), "Initialized snapshot store");
        Ok(store)
    }

    /// Whether `<root>/.snapshotstore/<metadata dir>/config` exists
    pub fn is_initialized(&self, root: &Path) -> io::Result<bool> {
        let store = SnapshotStore::for_repo(root);
        if !exists(store.path())? {
            return Ok(false);
        }
        exists(&store.path().join(&self.metadata_dir).join("config"))
    }

    /// Mirror the live tree into the store, stage everything and commit.
    ///
    /// Exit status 1 from the commit step means there was nothing to commit.
    pub async fn commit(
        &self,
        store: &SnapshotStore,
        message: &str,
    ) -> Result<CommitOutcome, VcsError> {
        self.require_metadata(store)?;

        let mirror = self.mirror.clone();
        let (source, dest) = (store.repo_root().to_path_buf(), store.path().to_path_buf());
        tokio::task::spawn_blocking(move || mirror.mirror(&source, &dest))
            .await
            .map_err(|e| VcsError::MirrorTask(e.to_string()))??;

        self.tool.run_checked(store.path(), &["add", "."]).await?;

        let full_message = commit_message_now(&self.label, message);
        let args = ["commit", "-m", full_message.as_str()];
        let output = self.tool.run(store.path(), &args).await?;

        if output.status.success() {
            info!(message = %full_message, "Created snapshot commit");
            return Ok(CommitOutcome::Committed {
                message: full_message,
            });
        }

        if output.status.code() == Some(1) {
            debug!("No changes to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        Err(self.tool.failure(&args, &output))
    }

    /// `<tool> log --oneline --max-count=<limit>`, one entry per line.
    ///
    /// A store without any commit yet yields an empty history.
    pub async fn log(&self, store: &SnapshotStore, limit: usize) -> Result<Vec<String>, VcsError> {
        self.require_metadata(store)?;

        let max_count = format!("--max-count={}", limit);
        let args = ["log", "--oneline", max_count.as_str()];
        let output = self.tool.run(store.path(), &args).await?;

        if !output.status.success() {
            if !self.has_commits(store).await? {
                return Ok(Vec::new());
            }
            return Err(self.tool.failure(&args, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// The store must carry its own metadata directory; without it the tool
    /// would operate on whatever repository encloses the store.
    fn require_metadata(&self, store: &SnapshotStore) -> Result<(), VcsError> {
        let metadata = store.path().join(&self.metadata_dir);
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(VcsError::NotInitialized {
                path: store.path().to_path_buf(),
            })
        }
    }

    async fn has_commits(&self, store: &SnapshotStore) -> Result<bool, VcsError> {
        let output = self
            .tool
            .run(store.path(), &["rev-parse", "--verify", "--quiet", "HEAD"])
            .await?;
        Ok(output.status.success())
    }
}

fn exists(path: &Path) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_location() {
        let store = SnapshotStore::for_repo("/work/project");
        assert_eq!(store.repo_root(), Path::new("/work/project"));
        assert_eq!(store.path(), Path::new("/work/project/.snapshotstore"));
    }

    #[test]
    fn test_is_initialized_requires_metadata_config() {
        let temp = TempDir::new().unwrap();
        let adapter = VcsAdapter::from_config(&ShadowConfig::default());

        assert!(!adapter.is_initialized(temp.path()).unwrap());

        std::fs::create_dir_all(temp.path().join(".snapshotstore/.git")).unwrap();
        assert!(!adapter.is_initialized(temp.path()).unwrap());

        std::fs::write(temp.path().join(".snapshotstore/.git/config"), "").unwrap();
        assert!(adapter.is_initialized(temp.path()).unwrap());
    }

    #[tokio::test]
    async fn test_commit_and_log_refuse_store_without_metadata() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "hi").unwrap();
        std::fs::create_dir_all(temp.path().join(".snapshotstore")).unwrap();
        let adapter = VcsAdapter::new(
            VcsTool::new("shadow-no-such-vcs-binary"),
            Mirror::default(),
            "Snapshot",
        );
        let store = SnapshotStore::for_repo(temp.path());

        let err = adapter.commit(&store, "x").await.unwrap_err();
        assert!(matches!(err, VcsError::NotInitialized { .. }));
        let err = adapter.log(&store, 20).await.unwrap_err();
        assert!(matches!(err, VcsError::NotInitialized { .. }));

        // Refused before mirroring anything
        assert!(!temp.path().join(".snapshotstore/a.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let temp = TempDir::new().unwrap();
        let adapter = VcsAdapter::new(
            VcsTool::new("shadow-no-such-vcs-binary"),
            Mirror::default(),
            "Snapshot",
        );

        let err = adapter.init_repo(temp.path()).await.unwrap_err();
        assert!(matches!(err, VcsError::Launch { .. }));
        // Directory creation happens before the tool runs
        assert!(temp.path().join(".snapshotstore").is_dir());
    }
}
