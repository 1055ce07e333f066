use anyhow::Result;
use colored::*;
use dev_core::workspace_manager::WorkspaceManager;

pub fn execute(
    manager: &WorkspaceManager,
    targets: &[String],
    skip_dependencies: bool,
) -> Result<()> {
    let requested = requested_label(manager, targets);
    println!("{} {}", "Execution plan for".bold(), requested.cyan());

    let plan = manager.get_execution_plan(targets, skip_dependencies)?;

    println!("\n{}:", "Execution order".bold());
    let mut position = 0;
    for step in plan.steps() {
        if step.items.is_empty() {
            position += 1;
            println!("  {}. {}", position, step.name);
        }
        for item in &step.items {
            position += 1;
            println!("  {}. {} {}", position, step.name, format!("({})", item).dimmed());
        }
    }

    Ok(())
}

pub(crate) fn requested_label(manager: &WorkspaceManager, targets: &[String]) -> String {
    if targets.is_empty() {
        manager.graph().default_target().to_string()
    } else {
        targets.join(", ")
    }
}
