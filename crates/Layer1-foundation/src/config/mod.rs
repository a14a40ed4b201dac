//! Config - settings and workspace-wide constants
//!
//! - `shadow.rs` - ShadowConfig

mod shadow;

pub use shadow::{
    AssistantConfig, CommitConfig, MirrorConfig, MirrorMode, ShadowConfig, VcsConfig,
    HIDDEN_MARKER, NATIVE_VCS_DIR, RESERVED_DIRS, SHADOW_CONFIG_FILE, SNAPSHOT_STORE_DIR,
};
