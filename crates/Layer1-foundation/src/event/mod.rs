//! Event System - publish/subscribe for session, snapshot and task events
//!
//! ```text
//!   Workspace / CommitScheduler
//!            │ publish(event)
//!            ▼
//!   ┌─────────────────────────────┐
//!   │          EventBus           │──► broadcast receivers
//!   └─────────────────────────────┘
//!            │
//!            ▼
//!   EventListener (CLI printer, ...)
//! ```

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventBusConfig, EventListener, ListenerId};
pub use types::{AutoCommitOutcome, EventCategory, EventId, EventKind, ShadowEvent};
