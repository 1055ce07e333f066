//! Target registry and dependency resolution
//!
//! Resolution is pure: it walks the requested targets depth-first, emitting
//! each target after its dependencies, and never touches the actions. Cycles
//! and unknown names are reported before anything runs.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::DiGraph;

use crate::execution::plan::{ExecutionPlan, PlannedTarget};
use crate::execution::target::Target;
use crate::types::{DevError, DevResult};

/// Target run when no names are requested
pub const DEFAULT_TARGET: &str = "default";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// All registered targets, in registration order
pub struct TargetGraph<C> {
    targets: Vec<Target<C>>,
    index: HashMap<String, usize>,
    default_target: String,
}

impl<C> Default for TargetGraph<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TargetGraph<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetGraph")
            .field("targets", &self.targets)
            .field("default_target", &self.default_target)
            .finish()
    }
}

impl<C> TargetGraph<C> {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            index: HashMap::new(),
            default_target: DEFAULT_TARGET.to_string(),
        }
    }

    pub fn with_default_target(mut self, name: impl Into<String>) -> Self {
        self.default_target = name.into();
        self
    }

    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    /// Add a target. A name that is already taken is rejected and the first
    /// registration kept.
    pub fn register(&mut self, target: Target<C>) -> DevResult<()> {
        if self.index.contains_key(target.name()) {
            return Err(DevError::DuplicateTarget(target.name().to_string()));
        }

        tracing::trace!(target_name = target.name(), "registered target");
        self.index
            .insert(target.name().to_string(), self.targets.len());
        self.targets.push(target);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Target<C>> {
        self.index.get(name).map(|&i| &self.targets[i])
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target<C>> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Order `requested` (or the default target when empty) and everything it
    /// depends on so that dependencies always come first
    pub fn resolve(&self, requested: &[String]) -> DevResult<ExecutionPlan> {
        let roots = self.roots(requested)?;

        let mut marks = vec![Mark::Unvisited; self.targets.len()];
        let mut path = Vec::new();
        let mut order = Vec::new();
        for root in roots {
            self.visit(root, &mut marks, &mut path, &mut order)?;
        }

        let plan = self.plan_from(order);
        tracing::debug!(plan = %plan, "resolved execution plan");
        Ok(plan)
    }

    /// Order only the requested targets, ignoring their dependencies
    pub fn resolve_without_dependencies(&self, requested: &[String]) -> DevResult<ExecutionPlan> {
        let mut seen = HashSet::new();
        let order = self
            .roots(requested)?
            .into_iter()
            .filter(|&i| seen.insert(i))
            .collect();
        Ok(self.plan_from(order))
    }

    /// The registered graph with an edge from each target to its dependencies
    pub fn dependency_graph(&self) -> DevResult<DiGraph<String, ()>> {
        let mut graph = DiGraph::<String, ()>::new();
        let nodes: Vec<_> = self
            .targets
            .iter()
            .map(|target| graph.add_node(target.name().to_string()))
            .collect();

        for (from, target) in self.targets.iter().enumerate() {
            for dependency in target.dependencies() {
                let to = self.lookup(dependency, Some(target.name()))?;
                graph.add_edge(nodes[from], nodes[to], ());
            }
        }

        Ok(graph)
    }

    /// Every cycle in the registered graph, as sorted member names
    pub fn find_cycles(&self) -> DevResult<Vec<Vec<String>>> {
        let graph = self.dependency_graph()?;
        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
            .into_iter()
            .filter_map(|component| {
                if component.len() > 1 {
                    let mut cycle = component
                        .iter()
                        .map(|node| graph[*node].clone())
                        .collect::<Vec<_>>();
                    cycle.sort();
                    Some(cycle)
                } else {
                    let node = component[0];
                    graph
                        .contains_edge(node, node)
                        .then(|| vec![graph[node].clone()])
                }
            })
            .collect();

        cycles.sort();
        Ok(cycles)
    }

    fn roots(&self, requested: &[String]) -> DevResult<Vec<usize>> {
        if requested.is_empty() {
            return Ok(vec![self.lookup(&self.default_target, None)?]);
        }

        requested
            .iter()
            .map(|name| self.lookup(name, None))
            .collect()
    }

    fn lookup(&self, name: &str, required_by: Option<&str>) -> DevResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| DevError::UnknownTarget {
                name: name.to_string(),
                required_by: required_by.map(str::to_string),
            })
    }

    fn visit(
        &self,
        index: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> DevResult<()> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                let start = path.iter().position(|&i| i == index).unwrap_or(0);
                let cycle = path[start..]
                    .iter()
                    .chain(std::iter::once(&index))
                    .map(|&i| self.targets[i].name().to_string())
                    .collect();
                return Err(DevError::CyclicDependency { cycle });
            }
            Mark::Unvisited => {}
        }

        marks[index] = Mark::Visiting;
        path.push(index);

        let target = &self.targets[index];
        for dependency in target.dependencies() {
            let dependency = self.lookup(dependency, Some(target.name()))?;
            self.visit(dependency, marks, path, order)?;
        }

        path.pop();
        marks[index] = Mark::Done;
        order.push(index);
        Ok(())
    }

    fn plan_from(&self, order: Vec<usize>) -> ExecutionPlan {
        ExecutionPlan::new(
            order
                .into_iter()
                .map(|i| {
                    let target = &self.targets[i];
                    PlannedTarget {
                        name: target.name().to_string(),
                        items: target
                            .item_labels()
                            .into_iter()
                            .map(str::to_string)
                            .collect(),
                    }
                })
                .collect(),
        )
    }
}
