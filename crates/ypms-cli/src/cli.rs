//! Argument parsing (`spec.md` §6 "CLI surface", `SPEC_FULL.md` §6).
//!
//! `--version` here means "the package/release version to target", which
//! collides with clap's own `--version` flag; every subcommand that takes it
//! disables the auto-generated one (`libretto-cli`'s `Show` subcommand does
//! the same for the same reason).

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ypms")]
#[command(author)]
#[command(version)]
#[command(about = "A per-user package manager driven by declarative guides")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List packages available from a source
    List(ListArgs),

    /// Show a package's info document
    Info(InfoArgs),

    /// Install (or update to) a package in an environment
    #[command(disable_version_flag = true)]
    Install(InstallArgs),

    /// List environment directories under `YPMS_DIR/envs`
    Envs,

    /// Manage configured sources
    Sources(SourcesArgs),

    /// Purge the metadata cache and re-fetch every source's config+index
    Refresh,

    /// Update every installed package to its latest resolvable version
    Upgrade(UpgradeArgs),

    /// Uninstall every non-explicit package with no remaining dependents
    Autoremove(AutoremoveArgs),

    /// Any other first token: run that guide against a package ref
    #[command(external_subcommand)]
    Guide(Vec<String>),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Source to list packages from (default: the configured default source)
    #[arg(short = 's', long)]
    pub source: Option<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Package reference, `user/pkg`
    pub package_ref: String,

    #[arg(short = 's', long)]
    pub source: Option<String>,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Package reference, `user/pkg`
    pub package_ref: String,

    /// Environment to install into
    #[arg(long, default_value = "default")]
    pub env: String,

    /// Release tag to install; default resolves via the package's default/alias
    #[arg(long = "version")]
    pub version: Option<String>,

    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// Assume yes to the install confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Proceed despite dependent version pins
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct SourcesArgs {
    #[command(subcommand)]
    pub action: SourcesAction,
}

#[derive(Subcommand, Debug)]
pub enum SourcesAction {
    /// List configured sources
    List,
    /// Add a source
    Add(SourcesAddArgs),
    /// Remove a source
    Remove(SourcesRemoveArgs),
}

#[derive(Args, Debug)]
pub struct SourcesAddArgs {
    pub name: String,
    pub config_url: String,
}

#[derive(Args, Debug)]
pub struct SourcesRemoveArgs {
    pub name: String,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Restrict to one environment (default: every environment)
    #[arg(long)]
    pub env: Option<String>,

    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct AutoremoveArgs {
    #[arg(long)]
    pub env: Option<String>,

    #[arg(short = 'f', long)]
    pub force: bool,
}

/// Re-parsed from the raw tokens captured by [`Commands::Guide`]: the guide
/// name itself is consumed by the caller, these flags cover what's left.
#[derive(Parser, Debug)]
#[command(name = "ypms", disable_version_flag = true, disable_help_flag = true)]
pub struct GuideInvocation {
    /// Package reference, `user/pkg`
    pub package_ref: String,

    #[arg(long, default_value = "default")]
    pub env: String,

    #[arg(long = "version")]
    pub version: Option<String>,

    #[arg(short = 's', long)]
    pub source: Option<String>,

    #[arg(short = 'y', long)]
    pub yes: bool,

    #[arg(short = 'f', long)]
    pub force: bool,
}
