//! Stock development targets
//!
//! Each submodule registers one group of targets. [`register_all`] assembles
//! the whole graph in one place:
//!
//! ```text
//! default ─► build ─► dotnet ─► clean ─► solution
//! test ─► test.<suite>... ─► dotnet
//! coverage ─► test
//! publish ─► dotnet
//! lint
//! ```

pub mod build;
pub mod default;
pub mod keys;
pub mod lint;

use std::path::{Path, PathBuf};

use crate::configs::project::{DevConfig, PublishProjectConfig, TestSuiteConfig};
use crate::execution::command::CommandRunner;
use crate::execution::graph::TargetGraph;
use crate::settings::DevSettings;
use crate::types::DevResult;

/// What every stock target action receives
pub struct TargetContext {
    pub root: PathBuf,
    pub settings: DevSettings,
    pub commands: Box<dyn CommandRunner>,
}

impl TargetContext {
    pub fn new(
        root: impl Into<PathBuf>,
        settings: DevSettings,
        commands: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            root: root.into(),
            settings,
            commands,
        }
    }
}

pub type DevGraph = TargetGraph<TargetContext>;

/// Project facts the stock targets are registered with
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub solution_name: String,
    pub report_title: String,
    pub exclude_projects: Vec<String>,
    pub test_suites: Vec<TestSuiteConfig>,
    pub publish: Vec<PublishProjectConfig>,
    pub lint_image: String,
}

impl ProjectLayout {
    pub fn new(config: &DevConfig, workspace_root: &Path) -> Self {
        Self {
            solution_name: config.solution_name(workspace_root),
            report_title: config.report_title(workspace_root),
            exclude_projects: config.exclude_projects.clone(),
            test_suites: config.test_suites.clone(),
            publish: config.publish.clone(),
            lint_image: config.lint_image.clone(),
        }
    }
}

/// Register every stock target
pub fn register_all(graph: &mut DevGraph, layout: &ProjectLayout) -> DevResult<()> {
    build::register(graph, layout)?;
    lint::register(graph, layout)?;
    default::register(graph)?;
    Ok(())
}

/// Stock graph for `layout`
pub fn build_graph(layout: &ProjectLayout) -> DevResult<DevGraph> {
    let mut graph = DevGraph::new().with_default_target(keys::DEFAULT);
    register_all(&mut graph, layout)?;
    Ok(graph)
}
