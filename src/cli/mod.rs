//! Command-line interface definitions for the `billing-settings` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `billing-settings` binary.
#[derive(Debug, Parser)]
#[command(
    name = "billing-settings",
    about = "Configure WHMCS billing settings on a master node",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Fetch an auth token from the master and apply the billing settings.
    #[command(
        name = "apply",
        about = "Fetch an auth token and apply the billing settings"
    )]
    Apply(ApplyCommand),
    /// Print the request bodies that `apply` would send.
    #[command(
        name = "plan",
        about = "Print the settings requests without contacting the master"
    )]
    Plan(PlanCommand),
    /// Print the billing settings currently stored on the master.
    #[command(name = "show", about = "Show the billing settings stored on the master")]
    Show(ShowCommand),
}

/// Arguments for the `billing-settings apply` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ApplyCommand {
    /// Reuse a pre-issued auth token instead of requesting one.
    ///
    /// When omitted, a token is requested from the master with the configured
    /// admin credentials, retrying while the master is unavailable.
    #[arg(long, value_name = "TOKEN", env = "BILLING_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
    /// Stop at the first setting the master rejects.
    ///
    /// By default every setting is attempted and all failures are reported
    /// together once the run finishes.
    #[arg(long)]
    pub(crate) fail_fast: bool,
}

/// Arguments for the `billing-settings plan` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct PlanCommand {
    /// Print secret values (the billing password) instead of masking them.
    #[arg(long)]
    pub(crate) show_secrets: bool,
}

/// Arguments for the `billing-settings show` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ShowCommand {
    /// Reuse a pre-issued auth token instead of requesting one.
    #[arg(long, value_name = "TOKEN", env = "BILLING_TOKEN", hide_env_values = true)]
    pub(crate) token: Option<String>,
}
