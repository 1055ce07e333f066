use anyhow::Result;
use colored::*;
use dev_core::display::format_duration;
use dev_core::workspace_manager::WorkspaceManager;

use super::plan::requested_label;

pub async fn execute(
    manager: &WorkspaceManager,
    targets: &[String],
    skip_dependencies: bool,
) -> Result<()> {
    println!(
        "{} {}",
        "Running".bold(),
        requested_label(manager, targets).cyan()
    );
    println!();

    let summary = manager.run(targets, skip_dependencies).await?;

    println!();
    println!("{}", "Summary".bold().underline());
    for timing in &summary.targets {
        let items = if timing.items > 0 {
            format!(" ({} items)", timing.items).dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {}{} {}",
            "✓".green(),
            timing.name,
            items,
            format_duration(timing.duration).dimmed()
        );
    }
    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        format!(
            "All targets completed successfully in {}",
            format_duration(summary.duration)
        )
        .green()
        .bold()
    );

    Ok(())
}
