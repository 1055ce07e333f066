//! Console output for target runs
//!
//! Consistent label colors and the headers/markers printed around each target.

use std::time::Duration;

use colored::*;

/// Label colors; red, yellow and green stay reserved for status markers
const LABEL_PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
    Color::BrightCyan,
    Color::BrightBlue,
    Color::BrightMagenta,
];

/// Picks a palette entry from the FNV-1a hash of `label`, so a label keeps
/// its color across runs and processes
pub fn get_label_color(label: &str) -> Color {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let hash = label
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME));
    LABEL_PALETTE[hash as usize % LABEL_PALETTE.len()]
}

pub fn print_target_header(name: &str, description: Option<&str>) {
    println!();
    println!(
        "┌─ {} {}",
        "Running target".bold(),
        name.color(get_label_color(name)).bold()
    );
    if let Some(description) = description {
        println!("└─ {}", description.bright_black());
    }
}

pub fn print_item_header(target: &str, item: &str) {
    println!(
        "   {} {}",
        format!("{}:", target).bright_black(),
        item.color(get_label_color(item))
    );
}

pub fn print_target_completed(name: &str, elapsed: Duration) {
    println!(
        "{} {} {}",
        "✓".green().bold(),
        format!("Completed {}", name).color(get_label_color(name)),
        format_duration(elapsed).bright_black()
    );
}

pub fn print_target_failed(name: &str) {
    println!("{} {}", "✗".red().bold(), format!("Failed {}", name).red());
}

/// Short human-readable duration, e.g. `350ms` or `12.4s`
pub fn format_duration(elapsed: Duration) -> String {
    if elapsed.as_secs() == 0 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
