//! lxl CLI - Addon manager for the Lite XL text editor
//!
//! This is the main entry point for the lxl command-line interface.

mod cli;
mod commands;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Help, version and usage errors are printed by clap without a banner
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    let name = cli.command.name();
    let result = match commands::Context::new(cli.root.as_deref()) {
        Ok(ctx) => match cli.command {
            Commands::Install(args) => commands::install::run(&ctx, args).await,
            Commands::Uninstall(args) => commands::uninstall::run(&ctx, args).await,
            Commands::Find(args) => commands::find::run(&ctx, args).await,
            Commands::List(args) => commands::list::run(&ctx, args).await,
            Commands::Subscribe(args) => commands::remotes::subscribe(&ctx, args).await,
            Commands::Unsubscribe(args) => commands::remotes::unsubscribe(&ctx, args),
            Commands::Remotes(args) => commands::remotes::run(&ctx, args).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            output::success(name, "Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::error(&format!("Unable to {name}"), &format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with appropriate verbosity
///
/// `RUST_LOG` takes precedence over the flags when set.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
