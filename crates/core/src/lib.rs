//! Dev Core Library
//!
//! This is the core library of the `dev` developer-workflow runner. It holds
//! the target graph, the runner that executes it, and the stock targets that
//! drive the .NET toolchain, a containerized linter and git.
//!
//! ## Architecture
//!
//! - [`workspace_manager`] - High-level interface used by the CLI
//! - [`execution`] - Target model, dependency resolution and the runner
//! - [`targets`] - Stock targets (`solution`, `clean`, `dotnet`, `build`, `test`, ...)
//! - [`toolchain`] - Argument conventions of external tools
//! - [`settings`] - Environment-backed settings
//! - [`configs`] - Optional `.dev/config.yml` project configuration
//! - [`artifacts`] - Artifact directory layout
//! - [`display`] - Console progress output
//! - [`results`] - Result types for workspace operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dev_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> dev_core::types::DevResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     ..WorkspaceManagerConfig::default()
//! })?;
//!
//! let plan = manager.get_execution_plan(&["test".to_string()], false)?;
//! println!("{}", plan);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod configs;
pub mod display;
pub mod execution;
pub mod results;
pub mod settings;
pub mod targets;
pub mod toolchain;
pub mod types;
pub mod workspace_manager;

pub use types::{DevError, DevResult};
pub use workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
