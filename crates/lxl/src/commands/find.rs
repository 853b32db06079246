//! Catalog search command

use anyhow::Result;

use super::common::{show_addons, show_discovered};
use super::Context;
use crate::cli::FilterArgs;
use crate::output;

/// Search the aggregated catalog by identifier
pub async fn run(ctx: &Context, args: FilterArgs) -> Result<()> {
    let resolver = ctx.resolver()?;
    let found = resolver.find(&args.filter).await?;

    show_addons("find", &found)?;
    show_discovered(resolver.registry());

    if args.filter.is_empty() {
        output::info("Use `lxl find <text>` to filter results");
    }
    Ok(())
}
