//! # shadow-task
//!
//! Background work for Shadow.
//!
//! ## Features
//!
//! - Delayed auto-commits after an assistant run
//! - Cancellation while a commit is still waiting out its delay
//! - Task lifecycle published on the EventBus
//! - Await one task or everything in flight (used before process exit)

pub mod scheduler;
pub mod state;
pub mod task;

pub use scheduler::CommitScheduler;
pub use state::TaskState;
pub use task::{ScheduledTask, TaskId};
