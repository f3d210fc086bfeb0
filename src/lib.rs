//! Core library for the `billing-settings` tool.
//!
//! The crate configures the billing settings of a master node through its
//! REST API: it obtains an auth token (retrying while the master is
//! unavailable) and then writes the four `billing` group settings that tell
//! the master how to reach its WHMCS installation.

pub mod apply;
pub mod config;
pub mod master;
pub mod provision;
pub mod retry;
pub mod settings;
pub mod test_support;
pub mod token;

pub use apply::{
    ApplyReport, FailurePolicy, SettingApplyError, SettingFailure, SettingRef, SettingsApplier,
};
pub use config::{BillingConfig, ConfigError};
pub use master::{AdminCredentials, HttpMasterApi, MasterApi, MasterApiError};
pub use provision::{BillingProvisioner, ProvisionError};
pub use retry::{RetryExhausted, RetryPolicy};
pub use settings::{BillingSetting, SETTING_GROUP, SettingItem, SettingRecord, billing_settings};
pub use token::{AuthToken, TokenFetchError, TokenFetcher};
