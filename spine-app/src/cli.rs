use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Operator CLI for the Spine hostname registry.
#[derive(Parser, Debug)]
#[command(name = "spine", version, about)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "SPINE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
pub enum Command {
    /// Claim a hostname for a user
    Register(RegisterArgs),
    /// Release a user's claim on a hostname
    Delete(DeleteArgs),
    /// List a user's hosts
    List(UserArgs),
    /// List root domains open for registration
    Domains,
    /// Provider records left without database backing
    #[command(subcommand)]
    Reconciliation(ReconciliationCommand),
}

#[derive(Args, Debug)]
pub struct UserArgs {
    /// User id the hosts belong to
    #[arg(short, long)]
    pub user: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Full hostname, e.g. `i.sharify.me`
    #[arg(required_unless_present = "root", conflicts_with_all = ["sub", "root"])]
    pub hostname: Option<String>,

    /// Subdomain, sanitised before use (with --root)
    #[arg(long, requires = "root")]
    pub sub: Option<String>,

    /// Root domain (with --sub, or alone for a root-only claim)
    #[arg(long)]
    pub root: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Full hostname to release
    pub hostname: String,
}

#[derive(Subcommand, Debug)]
pub enum ReconciliationCommand {
    /// Show unresolved events, oldest first
    List,
    /// Mark an event resolved after the record was cleaned up by hand
    Resolve {
        /// Event id
        id: String,
    },
}
