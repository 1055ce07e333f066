//! Result types for workspace operations
//!
//! Output structures returned by the workspace manager, kept apart from the
//! console formatting done by the CLI.

use std::time::Duration;

use petgraph::graph::DiGraph;

/// Information about a registered target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub name: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    pub items: Vec<String>,
}

/// Result of getting the target dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    pub graph: DiGraph<String, ()>,
    pub cycles: Vec<Vec<String>>,
}

/// Wall-clock time spent on one target
#[derive(Debug, Clone)]
pub struct TargetTiming {
    pub name: String,
    /// Number of fan-out items executed, 0 for other targets
    pub items: usize,
    pub duration: Duration,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub targets: Vec<TargetTiming>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }
}
