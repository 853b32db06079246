//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// lxl - Addon manager for the Lite XL text editor
#[derive(Parser, Debug)]
#[command(name = "lxl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Lite XL config directory addons are installed under
    #[arg(long, global = true, env = "LXL_CONFIG_DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install an addon along with its dependencies
    Install(AddonArgs),

    /// Remove an installed addon
    Uninstall(AddonArgs),

    /// Search the catalog of every subscribed remote
    Find(FilterArgs),

    /// Show installed addons
    List(FilterArgs),

    /// Add a remote catalog
    Subscribe(RemoteArgs),

    /// Remove a remote catalog
    Unsubscribe(RemoteArgs),

    /// Show subscribed remotes and whether they are reachable
    Remotes(FilterArgs),
}

impl Commands {
    /// Subcommand name as typed by the user
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Install(_) => "install",
            Commands::Uninstall(_) => "uninstall",
            Commands::Find(_) => "find",
            Commands::List(_) => "list",
            Commands::Subscribe(_) => "subscribe",
            Commands::Unsubscribe(_) => "unsubscribe",
            Commands::Remotes(_) => "remotes",
        }
    }
}

#[derive(Args, Debug)]
pub struct AddonArgs {
    /// Addon identifier
    pub id: String,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Only show entries containing this text (case-insensitive)
    #[arg(default_value = "")]
    pub filter: String,
}

#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Catalog URL, optionally suffixed with `:latest`
    pub remote: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_is_optional() {
        let cli = Cli::try_parse_from(["lxl", "find"]).unwrap();
        match cli.command {
            Commands::Find(args) => assert_eq!(args.filter, ""),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_install_requires_an_id() {
        assert!(Cli::try_parse_from(["lxl", "install"]).is_err());
        let cli = Cli::try_parse_from(["lxl", "-vv", "install", "lsp"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.name(), "install");
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["lxl", "upgrade", "lsp"]).is_err());
    }
}
