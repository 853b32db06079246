//! Terminal output utilities

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use lxl_core::types::AddonType;
use owo_colors::{AnsiColors, OwoColorize};

/// Print a success banner: `header` on a badge followed by `msg`
pub fn success(header: &str, msg: &str) {
    println!(
        "{} {} {}",
        style(" ✓ ").white().on_green().bold(),
        style(format!(" {header} ")).black().on_green(),
        style(msg).green()
    );
}

/// Print an error banner
pub fn error(header: &str, msg: &str) {
    eprintln!(
        "{} {} {}",
        style(" ✗ ").white().on_red().bold(),
        style(format!(" {header} ")).black().on_red(),
        style(msg).red()
    );
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print a command the user can type
pub fn command(cmd: &str) {
    println!("  {} {}", style("$").dim(), style(cmd).cyan().bold());
}

/// Color addons of a given type are painted with
pub fn type_color(addon_type: AddonType) -> AnsiColors {
    match addon_type {
        AddonType::Plugin => AnsiColors::Blue,
        AddonType::Font => AnsiColors::Magenta,
        AddonType::Library => AnsiColors::Cyan,
        AddonType::Color => AnsiColors::Yellow,
        AddonType::Meta => AnsiColors::BrightBlack,
    }
}

/// Single-letter badge for an addon type
pub fn type_badge(addon_type: AddonType) -> String {
    let letter = addon_type.as_str()[..1].to_uppercase();
    format!(" {letter} ")
        .bright_white()
        .on_color(type_color(addon_type))
        .to_string()
}

/// Truncate `text` to at most `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(template.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
