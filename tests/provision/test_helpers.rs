//! Shared fixtures for provisioning BDD scenarios.

use std::cell::{Cell, RefCell};

use billing_settings::test_support::ScriptedMasterApi;
use rstest::fixture;

#[derive(Clone, Debug)]
pub enum ProvisionOutcome {
    Success,
    Failure(String),
}

#[derive(Clone, Debug)]
pub struct ProvisionContext {
    pub api: ScriptedMasterApi,
    pub fail_fast: Cell<bool>,
    pub preset_token: RefCell<Option<String>>,
    pub outcome: RefCell<Option<ProvisionOutcome>>,
}

#[fixture]
pub fn provision_context() -> ProvisionContext {
    ProvisionContext {
        api: ScriptedMasterApi::new(),
        fail_fast: Cell::new(false),
        preset_token: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}
