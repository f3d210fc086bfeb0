//! BDD scenarios for the provisioning workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{ProvisionContext, provision_context};

#[scenario(
    path = "tests/features/provision.feature",
    name = "Apply every billing setting once a token is issued"
)]
fn scenario_apply_after_retries(provision_context: ProvisionContext) {
    let _ = provision_context;
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Apply nothing when the master never issues a token"
)]
fn scenario_abort_without_token(provision_context: ProvisionContext) {
    let _ = provision_context;
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Report every rejected setting after attempting all of them"
)]
fn scenario_aggregate_rejections(provision_context: ProvisionContext) {
    let _ = provision_context;
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Stop at the first rejected setting when failing fast"
)]
fn scenario_fail_fast(provision_context: ProvisionContext) {
    let _ = provision_context;
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Skip the token request when a token is supplied"
)]
fn scenario_preset_token(provision_context: ProvisionContext) {
    let _ = provision_context;
}
