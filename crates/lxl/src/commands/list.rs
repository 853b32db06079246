//! Installed addon list command

use anyhow::{bail, Result};
use lxl_addons::ListedAddon;
use tabled::{settings::Style, Table, Tabled};

use super::common::{non_empty, showcase, show_discovered};
use super::Context;
use crate::cli::FilterArgs;
use crate::output;

/// Row for an installed addon
#[derive(Tabled, Debug, PartialEq)]
struct InstalledRow {
    #[tabled(rename = "type")]
    addon_type: String,
    id: String,
    version: String,
    path: String,
}

impl From<&ListedAddon> for InstalledRow {
    fn from(listed: &ListedAddon) -> Self {
        Self {
            addon_type: listed.installed.addon_type.to_string(),
            id: listed.installed.id.clone(),
            version: listed
                .catalog
                .as_ref()
                .map(|a| non_empty(&a.version))
                .unwrap_or_else(|| "unknown".to_string()),
            path: listed.installed.path.display().to_string(),
        }
    }
}

/// List installed addons, enriched with catalog details when reachable
pub async fn run(ctx: &Context, args: FilterArgs) -> Result<()> {
    let resolver = ctx.resolver()?;
    let listed = resolver.list(&args.filter).await?;

    match listed.as_slice() {
        [] => bail!("Cannot find any installed addon"),
        [single] => {
            output::success("list", "Found 1 installed addon");
            match &single.catalog {
                Some(addon) => showcase(addon),
                None => {
                    output::kv("id", &single.installed.id);
                    output::kv("type", single.installed.addon_type.as_str());
                }
            }
            output::kv("path", &single.installed.path.display().to_string());
        }
        _ => {
            output::success("list", &format!("Found {} installed addons", listed.len()));
            let mut table = Table::new(listed.iter().map(InstalledRow::from));
            table.with(Style::sharp());
            println!("{table}");
        }
    }

    show_discovered(resolver.registry());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lxl_addons::InstalledAddon;
    use lxl_core::types::{Addon, AddonType};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_row_without_catalog_details() {
        let listed = ListedAddon {
            installed: InstalledAddon {
                id: "manual".to_string(),
                addon_type: AddonType::Plugin,
                path: PathBuf::from("/cfg/plugins/manual.lua"),
            },
            catalog: None,
        };

        let row = InstalledRow::from(&listed);
        assert_eq!(row.version, "unknown");
        assert_eq!(row.path, "/cfg/plugins/manual.lua");
    }

    #[test]
    fn test_row_with_catalog_details() {
        let listed = ListedAddon {
            installed: InstalledAddon {
                id: "lsp".to_string(),
                addon_type: AddonType::Plugin,
                path: PathBuf::from("/cfg/plugins/lsp"),
            },
            catalog: Some(Addon {
                id: "lsp".to_string(),
                version: "0.9".to_string(),
                ..Default::default()
            }),
        };

        assert_eq!(InstalledRow::from(&listed).version, "0.9");
    }
}
