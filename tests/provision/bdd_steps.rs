//! BDD step definitions for the provisioning workflow.

use billing_settings::test_support::sample_config;
use billing_settings::{
    AuthToken, BillingProvisioner, FailurePolicy, SettingsApplier, TokenFetcher,
};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Builder;

use super::test_helpers::{ProvisionContext, ProvisionOutcome};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a master that issues token \"{token}\" after {failures} failed attempts")]
fn master_issues_token(provision_context: &ProvisionContext, token: String, failures: u32) {
    provision_context.api.push_token_failures(failures, 503);
    provision_context.api.push_token(token.trim());
}

#[given("a master whose token endpoint always fails")]
fn master_never_issues_token(provision_context: &ProvisionContext) {
    let budget = sample_config().retry_policy().max_attempts();
    provision_context.api.push_token_failures(budget, 401);
}

#[given("the master rejects setting {id}")]
fn master_rejects_setting(provision_context: &ProvisionContext, id: u32) {
    provision_context.api.reject_setting(id, 400);
}

#[given("failing fast is enabled")]
fn failing_fast(provision_context: &ProvisionContext) {
    provision_context.fail_fast.set(true);
}

#[given("a pre-issued token \"{token}\"")]
fn pre_issued_token(provision_context: &ProvisionContext, token: String) {
    provision_context
        .preset_token
        .replace(Some(token.trim().to_owned()));
}

#[when("I provision the billing settings")]
fn provision(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let runtime = Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .map_err(|err| StepError::Assertion(err.to_string()))?;

    let config = sample_config();
    let policy = if provision_context.fail_fast.get() {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::ContinueOnError
    };
    let provisioner = BillingProvisioner::new(provision_context.api.clone(), config.settings())
        .with_token_fetcher(TokenFetcher::new(config.retry_policy()))
        .with_applier(SettingsApplier::new(policy));
    let preset = provision_context
        .preset_token
        .borrow()
        .clone()
        .and_then(AuthToken::new);

    let result = runtime.block_on(provisioner.execute(preset));
    let outcome = match result {
        Ok(_) => ProvisionOutcome::Success,
        Err(err) => ProvisionOutcome::Failure(err.to_string()),
    };
    provision_context.outcome.replace(Some(outcome));
    Ok(())
}

#[then("the provisioning succeeds")]
fn provisioning_succeeds(provision_context: &ProvisionContext) -> Result<(), StepError> {
    match &*provision_context.outcome.borrow() {
        Some(ProvisionOutcome::Success) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected success, got {other:?}"
        ))),
    }
}

#[then("the provisioning fails mentioning \"{text}\"")]
fn provisioning_fails(provision_context: &ProvisionContext, text: String) -> Result<(), StepError> {
    match &*provision_context.outcome.borrow() {
        Some(ProvisionOutcome::Failure(message)) if message.contains(text.trim()) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure mentioning {text}, got {other:?}"
        ))),
    }
}

#[then("{count} token requests were made")]
fn token_requests_made(provision_context: &ProvisionContext, count: usize) -> Result<(), StepError> {
    let actual = provision_context.api.token_requests();
    if actual == count {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} token requests, got {actual}"
        )))
    }
}

#[then("{count} settings were sent with token \"{token}\"")]
fn settings_sent(
    provision_context: &ProvisionContext,
    count: usize,
    token: String,
) -> Result<(), StepError> {
    let puts = provision_context.api.puts();
    if puts.len() != count {
        return Err(StepError::Assertion(format!(
            "expected {count} settings to be sent, got {}",
            puts.len()
        )));
    }
    match puts.iter().find(|put| put.token != token.trim()) {
        Some(put) => Err(StepError::Assertion(format!(
            "{} was sent with an unexpected token",
            put.path
        ))),
        None => Ok(()),
    }
}
