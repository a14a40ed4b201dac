//! VCS Integration Module
//!
//! Versions a selected repository without touching its own `.git`:
//! - The live tree is mirrored into `<repo>/.snapshotstore`
//! - The external tool is run inside the store (`init`, `add .`, `commit -m`, `log`)
//! - "Nothing to commit" is a normal outcome, not an error

pub mod commit;
pub mod ops;

pub use commit::{
    auto_commit_message, commit_message_now, format_commit_message, truncate_summary, ELLIPSIS,
    TIMESTAMP_FORMAT,
};
pub use ops::{CommitOutcome, SnapshotStore, VcsAdapter, VcsError, VcsTool};
