//! # shadow-foundation
//!
//! Foundation layer for Shadow:
//! - Error: the user-facing error taxonomy
//! - Config: ShadowConfig and workspace-wide constants
//! - Storage: JsonStore for settings files
//! - Event: EventBus for session, snapshot and background-task events

pub mod config;
pub mod error;
pub mod event;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::{
    AssistantConfig, CommitConfig, MirrorConfig, MirrorMode, ShadowConfig, VcsConfig,
    HIDDEN_MARKER, NATIVE_VCS_DIR, RESERVED_DIRS, SHADOW_CONFIG_FILE, SNAPSHOT_STORE_DIR,
};

// ============================================================================
// Storage
// ============================================================================
pub use storage::JsonStore;

// ============================================================================
// Event
// ============================================================================
pub use event::{
    AutoCommitOutcome, EventBus, EventBusConfig, EventCategory, EventId, EventKind,
    EventListener, ListenerId, ShadowEvent,
};
