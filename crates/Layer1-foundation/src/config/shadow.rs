//! Shadow Config - unified settings
//!
//! Every default reproduces the external tool contract; a config file only
//! needs to name what it changes.

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Config file name inside the global store
pub const SHADOW_CONFIG_FILE: &str = "config.json";

/// Directory (under the selected repository) holding the snapshot store
pub const SNAPSHOT_STORE_DIR: &str = ".snapshotstore";

/// The selected repository's own VCS directory
pub const NATIVE_VCS_DIR: &str = ".git";

/// Directory names never mirrored into the snapshot store
pub const RESERVED_DIRS: [&str; 2] = [NATIVE_VCS_DIR, SNAPSHOT_STORE_DIR];

/// Leading character marking an entry as hidden in file listings
pub const HIDDEN_MARKER: char = '.';

// ============================================================================
// Shadow Config
// ============================================================================

/// Shadow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowConfig {
    /// Version (for migrations)
    #[serde(default = "default_version")]
    pub version: u32,

    /// Version-control tool settings
    #[serde(default)]
    pub vcs: VcsConfig,

    /// Assistant tool settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Commit message settings
    #[serde(default)]
    pub commit: CommitConfig,

    /// Mirror settings
    #[serde(default)]
    pub mirror: MirrorConfig,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            vcs: VcsConfig::default(),
            assistant: AssistantConfig::default(),
            commit: CommitConfig::default(),
            mirror: MirrorConfig::default(),
        }
    }
}

impl ShadowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// Load the global config, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let store = JsonStore::global()?;
        Ok(store
            .load_optional::<ShadowConfig>(SHADOW_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// Load an explicit config file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn vcs_program(mut self, program: impl Into<String>) -> Self {
        self.vcs.program = program.into();
        self
    }

    pub fn vcs_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vcs.env.insert(key.into(), value.into());
        self
    }

    pub fn assistant_program(mut self, program: impl Into<String>) -> Self {
        self.assistant.program = program.into();
        self
    }

    pub fn settle_delay_ms(mut self, millis: u64) -> Self {
        self.assistant.settle_delay_ms = millis;
        self
    }

    pub fn mirror_mode(mut self, mode: MirrorMode) -> Self {
        self.mirror.mode = mode;
        self
    }
}

// ============================================================================
// VCS Config
// ============================================================================

/// External version-control tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcsConfig {
    /// Binary name or path
    #[serde(default = "default_vcs_program")]
    pub program: String,

    /// Metadata directory the tool creates inside the snapshot store
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,

    /// Extra environment applied to every invocation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            program: default_vcs_program(),
            metadata_dir: default_metadata_dir(),
            env: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Assistant Config
// ============================================================================

/// External AI assistant tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    /// Binary name or path
    #[serde(default = "default_assistant_program")]
    pub program: String,

    /// Arguments placed before the prompt
    #[serde(default = "default_assistant_args")]
    pub args: Vec<String>,

    /// Wait before the post-assistant commit (milliseconds)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Characters of the prompt kept in the auto-commit message
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            program: default_assistant_program(),
            args: default_assistant_args(),
            settle_delay_ms: default_settle_delay_ms(),
            summary_limit: default_summary_limit(),
        }
    }
}

// ============================================================================
// Commit Config
// ============================================================================

/// Commit message settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitConfig {
    /// Prefix of every snapshot commit message
    #[serde(default = "default_commit_label")]
    pub label: String,

    /// Prefix of the summary used by post-assistant commits
    #[serde(default = "default_auto_label")]
    pub auto_label: String,

    /// Entries returned by the history listing
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            label: default_commit_label(),
            auto_label: default_auto_label(),
            history_limit: default_history_limit(),
        }
    }
}

// ============================================================================
// Mirror Config
// ============================================================================

/// How a mirror cycle treats files already present in the snapshot store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorMode {
    /// Copy every file on every cycle
    #[default]
    Full,

    /// Skip files whose copy has the same length and is not older
    Incremental,
}

/// Mirror settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    #[serde(default)]
    pub mode: MirrorMode,
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_vcs_program() -> String {
    "git".to_string()
}

fn default_metadata_dir() -> String {
    NATIVE_VCS_DIR.to_string()
}

fn default_assistant_program() -> String {
    "claude".to_string()
}

fn default_assistant_args() -> Vec<String> {
    vec!["code".to_string()]
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_summary_limit() -> usize {
    50
}

fn default_commit_label() -> String {
    "Assistant snapshot".to_string()
}

fn default_auto_label() -> String {
    "Assistant prompt".to_string()
}

fn default_history_limit() -> usize {
    20
}
