//! Target execution module
//!
//! This module holds the target model, dependency resolution, the runner that
//! executes resolved plans, and the boundary to external commands.

pub mod command;
pub mod graph;
pub mod plan;
pub mod runner;
pub mod target;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandRunner, CommandSpec, OutputMode, ProcessCommandRunner};
pub use graph::{TargetGraph, DEFAULT_TARGET};
pub use plan::{ExecutionPlan, PlannedTarget};
pub use runner::{TargetRunner, TargetRunnerConfig};
pub use target::{Target, TargetAction, WorkItem};
