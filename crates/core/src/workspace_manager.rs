//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`] which serves as the primary
//! interface for the CLI. It loads the environment settings and the optional
//! project configuration, registers the stock targets, and resolves and runs
//! requested targets.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dev_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> dev_core::types::DevResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//!     ..WorkspaceManagerConfig::default()
//! })?;
//!
//! // List all targets
//! let targets = manager.list_targets();
//!
//! // Run the default target and everything it depends on
//! manager.run(&[], false).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::configs::project::{load_dev_config, DevConfig, DEFAULT_CONFIG_PATH};
use crate::execution::command::{CommandRunner, OutputMode, ProcessCommandRunner};
use crate::execution::plan::ExecutionPlan;
use crate::execution::runner::{TargetRunner, TargetRunnerConfig};
use crate::results::{DependencyGraphResult, RunSummary, TargetInfo};
use crate::settings::DevSettings;
use crate::targets::{build_graph, DevGraph, ProjectLayout, TargetContext};
use crate::types::{DevError, DevResult};

/// High-level workspace manager that encapsulates all workspace operations
pub struct WorkspaceManager {
    root: PathBuf,
    settings: DevSettings,
    dev_config: DevConfig,
    layout: ProjectLayout,
    graph: Arc<DevGraph>,
    parallelism: usize,
}

/// Configuration for initializing a workspace manager
#[derive(Debug, Clone)]
pub struct WorkspaceManagerConfig {
    pub workspace_root: PathBuf,
    /// Project config file; `<workspace_root>/.dev/config.yml` when unset
    pub config_path: Option<PathBuf>,
    /// Upper bound on concurrently running fan-out items
    pub parallelism: usize,
}

impl Default for WorkspaceManagerConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            config_path: None,
            parallelism: 1,
        }
    }
}

impl WorkspaceManager {
    /// Initialize a workspace manager with settings read from the process environment
    pub fn new(config: WorkspaceManagerConfig) -> DevResult<Self> {
        Self::with_settings(config, DevSettings::from_env()?)
    }

    /// Commands run in the workspace root and the linter mounts it, so the
    /// root is made absolute here once
    pub fn with_settings(config: WorkspaceManagerConfig, settings: DevSettings) -> DevResult<Self> {
        let root = std::fs::canonicalize(&config.workspace_root).map_err(|e| {
            DevError::Config(format!(
                "Workspace root {} is not accessible: {}",
                config.workspace_root.display(),
                e
            ))
        })?;
        let config_path = config
            .config_path
            .clone()
            .unwrap_or_else(|| root.join(DEFAULT_CONFIG_PATH));
        let dev_config = load_dev_config(&config_path)?;

        let layout = ProjectLayout::new(&dev_config, &root);
        let graph = build_graph(&layout)?;

        tracing::debug!(
            root = %root.display(),
            solution = %layout.solution_name,
            targets = graph.len(),
            "workspace initialized"
        );

        Ok(Self {
            root,
            settings,
            dev_config,
            layout,
            graph: Arc::new(graph),
            parallelism: config.parallelism.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &DevSettings {
        &self.settings
    }

    pub fn dev_config(&self) -> &DevConfig {
        &self.dev_config
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn graph(&self) -> &DevGraph {
        &self.graph
    }

    /// All registered targets in registration order
    pub fn list_targets(&self) -> Vec<TargetInfo> {
        self.graph
            .targets()
            .map(|target| TargetInfo {
                name: target.name().to_string(),
                description: target.description_text().map(str::to_string),
                dependencies: target.dependencies().to_vec(),
                items: target
                    .item_labels()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect()
    }

    /// Resolve `requested` (the default target when empty) into an execution plan
    pub fn get_execution_plan(
        &self,
        requested: &[String],
        skip_dependencies: bool,
    ) -> DevResult<ExecutionPlan> {
        if skip_dependencies {
            self.graph.resolve_without_dependencies(requested)
        } else {
            self.graph.resolve(requested)
        }
    }

    /// Run `requested` against the real toolchain, rooted at the workspace.
    /// With parallelism, output of fan-out items is buffered per item.
    pub async fn run(&self, requested: &[String], skip_dependencies: bool) -> DevResult<RunSummary> {
        let output = if self.parallelism > 1 {
            OutputMode::Buffered
        } else {
            OutputMode::Stream
        };
        let commands = ProcessCommandRunner::new(&self.root).with_output(output);
        self.run_with(requested, skip_dependencies, Box::new(commands))
            .await
    }

    /// Run `requested` with external commands going to `commands`
    pub async fn run_with(
        &self,
        requested: &[String],
        skip_dependencies: bool,
        commands: Box<dyn CommandRunner>,
    ) -> DevResult<RunSummary> {
        // Resolution errors surface before any command runs
        let plan = self.get_execution_plan(requested, skip_dependencies)?;

        let context = TargetContext::new(&self.root, self.settings.clone(), commands);
        TargetRunner::with_config(
            Arc::clone(&self.graph),
            TargetRunnerConfig {
                parallelism: self.parallelism,
                ..TargetRunnerConfig::default()
            },
        )
        .run(&plan, Arc::new(context))
        .await
    }

    /// Get dependency graph information
    pub fn get_dependency_graph(&self) -> DevResult<DependencyGraphResult> {
        Ok(DependencyGraphResult {
            graph: self.graph.dependency_graph()?,
            cycles: self.graph.find_cycles()?,
        })
    }
}
