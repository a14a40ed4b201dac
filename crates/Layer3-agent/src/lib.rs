//! # shadow-agent
//!
//! Session and workspace operations for Shadow.
//!
//! ## Components
//!
//! - **Session**: selected repository and attached snapshot store
//! - **Workspace**: select / initialize / commit / log / assistant / files
//! - **AssistantInvoker**: runs the assistant CLI inside the repository
//! - **DirectoryPicker**: front-end supplied directory chooser
//!
//! ## Example
//!
//! ```ignore
//! use shadow_agent::{Session, Workspace};
//! use shadow_foundation::ShadowConfig;
//!
//! let workspace = Workspace::new(ShadowConfig::load()?);
//! let mut session = Session::new();
//! workspace.select_path(&mut session, "/work/project").await?;
//! workspace.initialize_history(&mut session).await?;
//! workspace.commit_changes(&session, "baseline").await?;
//!
//! let reply = workspace.invoke_assistant(&session, "add a README").await?;
//! println!("{}", reply.output);
//! workspace.wait_for_auto_commits().await;
//! ```

pub mod assistant;
pub mod picker;
pub mod session;
pub mod workspace;

pub use assistant::AssistantInvoker;
pub use picker::{DirectoryPicker, FixedPicker};
pub use session::Session;
pub use workspace::{AssistantReply, Workspace, PICKER_TITLE};
