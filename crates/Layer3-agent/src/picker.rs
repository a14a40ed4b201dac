//! Directory picker seam
//!
//! The workspace never talks to a terminal or a native dialog itself; the
//! front end supplies the picker.

use async_trait::async_trait;
use shadow_foundation::Result;
use std::path::PathBuf;

/// Asks the user for a directory
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// `Ok(None)` when the user cancels
    async fn pick_directory(&self, title: &str) -> Result<Option<PathBuf>>;
}

/// Picker that always answers with the same directory (or cancels)
#[derive(Debug, Clone, Default)]
pub struct FixedPicker {
    choice: Option<PathBuf>,
}

impl FixedPicker {
    pub fn new(choice: impl Into<PathBuf>) -> Self {
        Self {
            choice: Some(choice.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self { choice: None }
    }
}

#[async_trait]
impl DirectoryPicker for FixedPicker {
    async fn pick_directory(&self, _title: &str) -> Result<Option<PathBuf>> {
        Ok(self.choice.clone())
    }
}
