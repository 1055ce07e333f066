use std::fmt;

/// A target scheduled for execution, with its fan-out item labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTarget {
    pub name: String,
    pub items: Vec<String>,
}

/// Dependency-respecting order of targets for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    steps: Vec<PlannedTarget>,
}

impl ExecutionPlan {
    pub(crate) fn new(steps: Vec<PlannedTarget>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PlannedTarget] {
        &self.steps
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name == name)
    }

    /// Individual execution units, `target(item)` for fan-out items
    pub fn units(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|step| {
                if step.items.is_empty() {
                    vec![step.name.clone()]
                } else {
                    step.items
                        .iter()
                        .map(|item| format!("{}({})", step.name, item))
                        .collect()
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.units().join(", "))
    }
}
