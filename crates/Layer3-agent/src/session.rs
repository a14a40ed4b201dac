//! Session state
//!
//! One `Session` is created by the front end and handed to every workspace
//! operation. It remembers the selected repository and, once history has
//! been initialized or found, its snapshot store.

use shadow_core::SnapshotStore;
use shadow_foundation::{Error, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Session {
    selected_repo: Option<PathBuf>,

    /// Always `selected_repo/.snapshotstore` when set
    snapshot_store: Option<SnapshotStore>,

    /// Carried for front ends that collect one; never consulted
    credential: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn selected_repo(&self) -> Option<&Path> {
        self.selected_repo.as_deref()
    }

    pub fn snapshot_store(&self) -> Option<&SnapshotStore> {
        self.snapshot_store.as_ref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Repository or `NoRepositorySelected`
    pub fn require_repo(&self) -> Result<&Path> {
        self.selected_repo().ok_or(Error::NoRepositorySelected)
    }

    /// Snapshot store or the first unmet precondition
    pub fn require_store(&self) -> Result<&SnapshotStore> {
        self.require_repo()?;
        self.snapshot_store().ok_or(Error::HistoryNotInitialized)
    }

    /// Switch repositories. A store attached to another repository is dropped.
    pub(crate) fn select(&mut self, repo: PathBuf) {
        if self.selected_repo.as_deref() != Some(repo.as_path()) {
            self.snapshot_store = None;
        }
        self.selected_repo = Some(repo);
    }

    pub(crate) fn attach_store(&mut self, store: SnapshotStore) {
        self.snapshot_store = Some(store);
    }
}
