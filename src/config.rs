//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::apply::FailurePolicy;
use crate::master::AdminCredentials;
use crate::retry::RetryPolicy;
use crate::settings::{SettingItem, billing_settings};

/// Upper bound accepted for `token_retries`.
pub const MAX_TOKEN_RETRIES: u32 = 20;

const CONFIG_FILE_NAME: &str = "billing-settings.toml";

/// Master connection details and billing values, merged from defaults,
/// configuration files, and `BILLING_*` environment variables.
///
/// TLS certificate validation is disabled for every request made with this
/// configuration: masters are commonly deployed with self-signed
/// certificates. Treat the connection as unauthenticated.
#[derive(Clone, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "BILLING",
    discovery(
        app_name = "billing-settings",
        env_var = "BILLING_SETTINGS_CONFIG_PATH",
        config_file_name = "billing-settings.toml",
        dotfile_name = ".billing-settings.toml",
        project_file_name = "billing-settings.toml"
    )
)]
pub struct BillingConfig {
    /// Address of the master node (IP or host name, optionally with a port).
    pub master_ip: String,
    /// Admin account used for Basic authentication against the token
    /// endpoint.
    #[ortho_config(default = "admin".to_owned())]
    pub admin_username: String,
    /// Password for [`BillingConfig::admin_username`].
    pub admin_password: String,
    /// Domain name the WHMCS installation is served from.
    pub whmcs_domain_name: String,
    /// Password of the WHMCS API account.
    pub whmcs_pass: String,
    /// Billing backend flavour stored as `billing_type`.
    #[ortho_config(default = "WHMCS".to_owned())]
    pub billing_type: String,
    /// WHMCS API account name stored as `billing_username`.
    #[ortho_config(default = "admin".to_owned())]
    pub billing_username: String,
    /// Additional token requests made after the first one fails.
    #[ortho_config(default = 5)]
    pub token_retries: u32,
    /// Fixed delay between token requests, in seconds.
    #[ortho_config(default = 30)]
    pub token_retry_delay_secs: u64,
    /// Timeout applied to each HTTP request, in seconds.
    #[ortho_config(default = 30)]
    pub http_timeout_secs: u64,
    /// Stop at the first rejected setting instead of attempting all of them.
    #[ortho_config(default = false)]
    pub fail_fast: bool,
}

impl fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillingConfig")
            .field("master_ip", &self.master_ip)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("whmcs_domain_name", &self.whmcs_domain_name)
            .field("whmcs_pass", &"<redacted>")
            .field("billing_type", &self.billing_type)
            .field("billing_username", &self.billing_username)
            .field("token_retries", &self.token_retries)
            .field("token_retry_delay_secs", &self.token_retry_delay_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl BillingConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to {CONFIG_FILE_NAME}",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("billing-settings")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages include guidance on how to
    /// provide missing values via environment variables or configuration
    /// files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (
                &self.master_ip,
                FieldMetadata::new("master node address", "BILLING_MASTER_IP", "master_ip"),
            ),
            (
                &self.admin_username,
                FieldMetadata::new(
                    "master admin username",
                    "BILLING_ADMIN_USERNAME",
                    "admin_username",
                ),
            ),
            (
                &self.admin_password,
                FieldMetadata::new(
                    "master admin password",
                    "BILLING_ADMIN_PASSWORD",
                    "admin_password",
                ),
            ),
            (
                &self.whmcs_domain_name,
                FieldMetadata::new(
                    "WHMCS domain name",
                    "BILLING_WHMCS_DOMAIN_NAME",
                    "whmcs_domain_name",
                ),
            ),
            (
                &self.whmcs_pass,
                FieldMetadata::new("WHMCS password", "BILLING_WHMCS_PASS", "whmcs_pass"),
            ),
            (
                &self.billing_type,
                FieldMetadata::new("billing type", "BILLING_BILLING_TYPE", "billing_type"),
            ),
            (
                &self.billing_username,
                FieldMetadata::new(
                    "WHMCS username",
                    "BILLING_BILLING_USERNAME",
                    "billing_username",
                ),
            ),
        ];
        for (value, metadata) in &required {
            Self::require_field(value, metadata)?;
        }

        if self.master_ip.contains("://") || self.master_ip.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "master_ip must be a bare address without scheme or path, got '{}'",
                self.master_ip
            )));
        }
        if self.token_retries > MAX_TOKEN_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "token_retries must not exceed {MAX_TOKEN_RETRIES}, got {}",
                self.token_retries
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "http_timeout_secs must be greater than zero",
            )));
        }
        Ok(())
    }

    /// Retry policy for the token request.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.token_retries,
            Duration::from_secs(self.token_retry_delay_secs),
        )
    }

    /// Timeout applied to each HTTP request.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// How the settings phase reacts to a rejected setting.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::ContinueOnError
        }
    }

    /// Credentials for the token endpoint.
    #[must_use]
    pub fn admin_credentials(&self) -> AdminCredentials {
        AdminCredentials::new(self.admin_username.trim(), self.admin_password.clone())
    }

    /// The billing records to apply, in order.
    #[must_use]
    pub fn settings(&self) -> Vec<SettingItem> {
        billing_settings(self)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
