//! Rendering shared by the catalog commands

use anyhow::{bail, Result};
use lxl_addons::RemoteRegistry;
use lxl_core::types::Addon;
use owo_colors::OwoColorize;
use tabled::{settings::Style, Table, Tabled};

use crate::output;

/// Longest description shown in a table row
const MAX_DESCRIPTION: usize = 60;

/// One row of an addon table
#[derive(Tabled, Debug, PartialEq)]
pub struct AddonRow {
    #[tabled(rename = "type")]
    pub addon_type: String,
    pub id: String,
    pub version: String,
    pub description: String,
}

impl From<&Addon> for AddonRow {
    fn from(addon: &Addon) -> Self {
        Self {
            addon_type: addon.addon_type.to_string(),
            id: addon.id.clone(),
            version: non_empty(&addon.version),
            description: output::truncate(&addon.description, MAX_DESCRIPTION),
        }
    }
}

/// Placeholder for blank catalog fields
pub fn non_empty(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Print a group of addons under `header`
///
/// A single match gets a detailed view, several matches a table.
pub fn show_addons(header: &str, addons: &[Addon]) -> Result<()> {
    match addons {
        [] => bail!("Cannot find any addon"),
        [addon] => {
            output::success(header, "Found 1 matching addon");
            showcase(addon);
        }
        _ => {
            output::success(header, &format!("Found {} addons matching", addons.len()));
            let mut table = Table::new(addons.iter().map(AddonRow::from));
            table.with(Style::sharp());
            println!("{table}");
        }
    }
    Ok(())
}

/// Detailed view of one addon
pub fn showcase(addon: &Addon) {
    let color = output::type_color(addon.addon_type);
    println!(
        "\n{} {}  v. {}",
        output::type_badge(addon.addon_type),
        addon.display_name().color(color).bold(),
        non_empty(&addon.version)
    );
    if !addon.description.is_empty() {
        output::kv("description", &addon.description);
    }
    if !addon.tags.is_empty() {
        output::kv("tags", &addon.tags.join(", "));
    }
    if !addon.dependencies.is_empty() {
        let deps: Vec<&str> = addon.dependencies.keys().map(String::as_str).collect();
        output::kv("depends on", &deps.join(", "));
    }
    println!("\nTo install it use:");
    output::command(&format!("lxl install {}", addon.id));
}

/// Suggest subscribing to remotes the catalogs referenced
pub fn show_discovered(registry: &RemoteRegistry) {
    let discovered = registry.discovered();
    if discovered.is_empty() {
        return;
    }

    output::info(&format!(
        "Found {} more remote(s) referenced by your catalogs, subscribe with:",
        discovered.len()
    ));
    for remote in discovered {
        output::command(&format!("lxl subscribe {remote}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lxl_core::types::AddonType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_addon_row() {
        let addon = Addon {
            id: "lsp".to_string(),
            addon_type: AddonType::Library,
            description: "x".repeat(80),
            ..Default::default()
        };

        let row = AddonRow::from(&addon);
        assert_eq!(row.addon_type, "library");
        assert_eq!(row.version, "-");
        assert_eq!(row.description.chars().count(), MAX_DESCRIPTION);
        assert!(row.description.ends_with("..."));
    }

    #[test]
    fn test_no_addons_is_an_error() {
        assert!(show_addons("find", &[]).is_err());
    }
}
