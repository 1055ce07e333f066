//! Target definitions
//!
//! A [`Target`] is a named unit of work with dependency names and a
//! [`TargetAction`]. Targets are generic over the context type `C` their
//! actions receive, which lets the graph and runner be exercised with plain
//! test fixtures as well as the real toolchain context.

use std::fmt;
use std::sync::Arc;

use crate::types::DevResult;

/// A fallible operation run against the execution context
pub type Action<C> = Box<dyn Fn(&C) -> DevResult<()> + Send + Sync>;

/// One fan-out invocation: the item's display label and its bound action
pub struct WorkItem<C> {
    label: String,
    action: Action<C>,
}

impl<C> WorkItem<C> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn run(&self, context: &C) -> DevResult<()> {
        (self.action)(context)
    }
}

/// What a target does once its dependencies are satisfied
pub enum TargetAction<C> {
    /// Aggregation only; always succeeds
    None,
    /// Runs once
    Simple(Action<C>),
    /// Runs once per item, in item order
    FanOut(Vec<WorkItem<C>>),
}

pub struct Target<C> {
    name: String,
    description: Option<String>,
    dependencies: Vec<String>,
    action: TargetAction<C>,
}

impl<C> Target<C> {
    /// A target with no dependencies and no action
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            dependencies: Vec::new(),
            action: TargetAction::None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&C) -> DevResult<()> + Send + Sync + 'static,
    {
        self.action = TargetAction::Simple(Box::new(action));
        self
    }

    /// Run `action` once for every item. Items are fixed here and labelled
    /// with their `Display` output.
    pub fn for_each<T, I, F>(mut self, items: I, action: F) -> Self
    where
        C: 'static,
        T: fmt::Display + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        F: Fn(&C, &T) -> DevResult<()> + Send + Sync + 'static,
    {
        let action = Arc::new(action);
        let work_items = items
            .into_iter()
            .map(|item| {
                let action = Arc::clone(&action);
                WorkItem {
                    label: item.to_string(),
                    action: Box::new(move |context: &C| action(context, &item)),
                }
            })
            .collect();

        self.action = TargetAction::FanOut(work_items);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn target_action(&self) -> &TargetAction<C> {
        &self.action
    }

    /// Labels of the fan-out items, empty for other targets
    pub fn item_labels(&self) -> Vec<&str> {
        match &self.action {
            TargetAction::FanOut(items) => items.iter().map(WorkItem::label).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_fan_out(&self) -> bool {
        matches!(self.action, TargetAction::FanOut(_))
    }
}

impl<C> fmt::Debug for Target<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.action {
            TargetAction::None => "none",
            TargetAction::Simple(_) => "simple",
            TargetAction::FanOut(_) => "fan-out",
        };
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("dependencies", &self.dependencies)
            .field("action", &kind)
            .field("items", &self.item_labels())
            .finish()
    }
}
