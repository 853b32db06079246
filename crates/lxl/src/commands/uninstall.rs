//! Addon uninstall command

use anyhow::Result;

use super::Context;
use crate::cli::AddonArgs;
use crate::output;

/// Remove every installed entry carrying the identifier
pub async fn run(ctx: &Context, args: AddonArgs) -> Result<()> {
    let removed = ctx.resolver()?.uninstall(&args.id).await?;

    for path in removed {
        output::kv("removed", &path.display().to_string());
    }
    Ok(())
}
