use anyhow::Result;
use colored::*;
use dev_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    let targets = manager.list_targets();

    println!("{}", "Targets".bold().underline());
    if targets.is_empty() {
        println!("  {}", "No targets registered".dimmed());
        return Ok(());
    }

    let width = targets.iter().map(|t| t.name.len()).max().unwrap_or(0);
    let default_target = manager.graph().default_target();

    for target in &targets {
        let name = format!("{:width$}", target.name, width = width);
        let name = if target.name == default_target {
            name.green().bold()
        } else {
            name.blue().bold()
        };
        println!("{}  {}", name, target.description.as_deref().unwrap_or(""));

        if !target.dependencies.is_empty() {
            println!(
                "{:width$}  {} {}",
                "",
                "depends on:".dimmed(),
                target.dependencies.join(", "),
                width = width
            );
        }
        if !target.items.is_empty() {
            println!(
                "{:width$}  {} {}",
                "",
                "for each:".dimmed(),
                target.items.join(", "),
                width = width
            );
        }
    }

    Ok(())
}
