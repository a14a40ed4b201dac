//! shadow-core: Core Runtime for Shadow
//!
//! Layer2 - filesystem and external-tool plumbing
//!
//! # Modules
//!
//! - `mirror`: copies the selected repository into its snapshot store
//! - `vcs`: runs the external VCS tool inside the snapshot store
//! - `files`: list / read / write files in the selected repository
//!
//! # Example
//!
//! ```ignore
//! use shadow_core::{VcsAdapter, CommitOutcome};
//! use shadow_foundation::ShadowConfig;
//!
//! let vcs = VcsAdapter::from_config(&ShadowConfig::default());
//! let store = vcs.init_repo(repo_root).await?;
//! match vcs.commit(&store, "first").await? {
//!     CommitOutcome::Committed { message } => println!("{message}"),
//!     CommitOutcome::NothingToCommit => println!("clean"),
//! }
//! ```

pub mod files;
pub mod mirror;
pub mod vcs;

pub use mirror::{Mirror, MirrorError, MirrorStats};
pub use vcs::{
    auto_commit_message, commit_message_now, format_commit_message, truncate_summary,
    CommitOutcome, SnapshotStore, VcsAdapter, VcsError, VcsTool, ELLIPSIS, TIMESTAMP_FORMAT,
};
