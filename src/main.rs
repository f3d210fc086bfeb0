//! Binary entry point for the `billing-settings` CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use billing_settings::{
    AuthToken, BillingConfig, BillingProvisioner, ConfigError, FailurePolicy, HttpMasterApi,
    MasterApiError, ProvisionError, SettingItem, SettingRecord, SettingsApplier, TokenFetcher,
};

mod cli;

use cli::{ApplyCommand, Cli, PlanCommand, ShowCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("client error: {0}")]
    Client(#[from] MasterApiError),
    #[error("{0}")]
    Provision(#[from] ProvisionError),
    #[error("--token must not be empty")]
    EmptyToken,
    #[error("failed to render settings: {0}")]
    Render(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli {
        Cli::Apply(command) => apply_command(command).await,
        Cli::Plan(command) => plan_command(&command),
        Cli::Show(command) => show_command(command).await,
    }
}

fn load_config() -> Result<BillingConfig, CliError> {
    let config = BillingConfig::load_without_cli_args()?;
    config.validate()?;
    Ok(config)
}

fn preset_token(token: Option<String>) -> Result<Option<AuthToken>, CliError> {
    token
        .map(|raw| AuthToken::new(raw).ok_or(CliError::EmptyToken))
        .transpose()
}

fn provisioner(config: &BillingConfig) -> Result<BillingProvisioner<HttpMasterApi>, CliError> {
    let api = HttpMasterApi::new(
        &config.master_ip,
        config.admin_credentials(),
        config.http_timeout(),
    )?;
    Ok(BillingProvisioner::new(api, config.settings())
        .with_token_fetcher(TokenFetcher::new(config.retry_policy()))
        .with_applier(SettingsApplier::new(config.failure_policy())))
}

async fn apply_command(args: ApplyCommand) -> Result<(), CliError> {
    let preset = preset_token(args.token)?;
    let config = load_config()?;
    let mut provisioner = provisioner(&config)?;
    if args.fail_fast {
        provisioner = provisioner.with_applier(SettingsApplier::new(FailurePolicy::FailFast));
    }

    let report = provisioner.execute(preset).await?;
    let mut stdout = io::stdout();
    for setting in &report.applied {
        writeln!(stdout, "applied {setting}")?;
    }
    Ok(())
}

fn plan_command(args: &PlanCommand) -> Result<(), CliError> {
    let config = load_config()?;
    let lines = render_plan(&config.settings(), args.show_secrets)?;
    write_lines(io::stdout(), &lines)
}

async fn show_command(args: ShowCommand) -> Result<(), CliError> {
    let preset = preset_token(args.token)?;
    let config = load_config()?;
    let records = provisioner(&config)?.current_settings(preset).await?;
    write_lines(io::stdout(), &render_records(&records))
}

/// Renders one JSON request body per line, in application order.
fn render_plan(items: &[SettingItem], show_secrets: bool) -> Result<Vec<String>, CliError> {
    items
        .iter()
        .map(|item| {
            let shown = if show_secrets {
                item.clone()
            } else {
                item.masked()
            };
            serde_json::to_string(&shown).map_err(CliError::from)
        })
        .collect()
}

fn render_records(records: &[SettingRecord]) -> Vec<String> {
    let mut sorted: Vec<&SettingRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.id);
    sorted.into_iter().map(SettingRecord::display_line).collect()
}

fn write_lines(mut target: impl Write, lines: &[String]) -> Result<(), CliError> {
    for line in lines {
        writeln!(target, "{line}")?;
    }
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
