//! Addon install command

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use super::common::show_discovered;
use super::Context;
use crate::cli::AddonArgs;
use crate::output;

/// Install an addon with its dependencies, replacing whatever it conflicts with
pub async fn run(ctx: &Context, args: AddonArgs) -> Result<()> {
    let spinner = output::spinner(&format!("Installing {}", args.id));

    // Post-install commands may prompt, so the spinner goes away first
    let ticking = spinner.clone();
    let resolver = ctx.resolver_with(|executor| {
        executor.with_post_install_hook(Arc::new(move |id: &str, command: &str| {
            ticking.finish_and_clear();
            output::info(&format!("Running post-install command for {id}: {command}"));
        }))
    })?;

    let result = resolver.install(&args.id).await;
    spinner.finish_and_clear();

    show_discovered(resolver.registry());
    result?;

    debug!("Installed {} under {}", args.id, resolver.executor().root().display());
    Ok(())
}
