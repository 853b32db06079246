//! Remote subscription commands

use anyhow::{bail, Result};
use lxl_addons::RemoteHealth;
use owo_colors::OwoColorize;

use super::Context;
use crate::cli::{FilterArgs, RemoteArgs};
use crate::output;

/// Subscribe to a remote catalog
pub async fn subscribe(ctx: &Context, args: RemoteArgs) -> Result<()> {
    let mut registry = ctx.registry()?;
    let stored = registry.subscribe(&args.remote).await?;

    output::kv("remote", &stored);
    if stored != args.remote {
        output::info("The remote was rewritten to point at the raw catalog");
    }
    Ok(())
}

/// Drop a remote catalog subscription
pub fn unsubscribe(ctx: &Context, args: RemoteArgs) -> Result<()> {
    let removed = ctx.registry()?.unsubscribe(&args.remote)?;
    output::kv("remote", &removed);
    Ok(())
}

/// Show every subscribed remote matching the filter with its health
pub async fn run(ctx: &Context, args: FilterArgs) -> Result<()> {
    let registry = ctx.registry()?;
    let needle = args.filter.to_lowercase();

    let order = |url: &str| registry.remotes().iter().position(|r| r == url);
    let mut reports: Vec<RemoteHealth> = registry
        .remote_health()
        .await
        .into_iter()
        .filter(|r| r.url.to_lowercase().contains(&needle))
        .collect();
    reports.sort_by_key(|r| order(&r.url));

    match reports.len() {
        0 => bail!("No remote found"),
        1 => output::success("remotes", "Found one remote"),
        n => output::success("remotes", &format!("Found {n} remotes")),
    }
    for report in &reports {
        println!("{}", render_remote(report));
    }

    output::header("Managing remotes");
    output::command("lxl subscribe <remote>");
    output::command("lxl unsubscribe <remote>");
    output::warning(
        "New remotes are validated and may be stored in a rewritten form pointing at the raw catalog",
    );
    Ok(())
}

/// Two-line summary of a remote: badges and counts, then the URL
fn render_remote(report: &RemoteHealth) -> String {
    let mut line = String::from(" > ");

    if report.is_broken() {
        line.push_str(&" BROKEN ".bright_white().on_red().to_string());
        line.push(' ');
    }
    if report.official {
        line.push_str(&" OFFICIAL ".bright_white().on_green().to_string());
        line.push(' ');
    }

    match &report.status {
        Ok(counts) => {
            let total: usize = counts.iter().map(|(_, n)| n).sum();
            line.push_str(&format!(" {total} ADDONS ").black().on_bright_white().to_string());
            for (addon_type, count) in counts {
                line.push_str(&format!(" {}{count}", output::type_badge(*addon_type)));
            }
        }
        Err(reason) => line.push_str(&reason.dimmed().to_string()),
    }

    format!("{line}\n   {}", report.url)
}
