//! Orchestrates the billing configuration of a master node.
//!
//! The workflow obtains an auth token from the master and then writes each
//! billing setting with that token. A token failure aborts the run before
//! any setting is sent; setting writes are not transactional with each
//! other, so a failed run may leave earlier settings applied.

use thiserror::Error;
use tracing::info;

use crate::apply::{ApplyReport, SettingApplyError, SettingsApplier};
use crate::master::{MasterApi, MasterApiError};
use crate::settings::{SettingItem, SettingRecord};
use crate::token::{AuthToken, TokenFetchError, TokenFetcher};

/// Errors surfaced while provisioning billing settings.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProvisionError {
    /// Raised when no token could be obtained; nothing was applied.
    #[error(transparent)]
    Token(#[from] TokenFetchError),
    /// Raised when one or more settings were rejected.
    #[error(transparent)]
    Apply(#[from] SettingApplyError),
    /// Raised when the stored settings cannot be listed.
    #[error("failed to list settings: {0}")]
    List(#[source] MasterApiError),
}

/// Executes the token-then-settings workflow against one master.
#[derive(Debug)]
pub struct BillingProvisioner<A> {
    api: A,
    fetcher: TokenFetcher,
    applier: SettingsApplier,
    items: Vec<SettingItem>,
}

impl<A> BillingProvisioner<A>
where
    A: MasterApi,
{
    /// Creates a provisioner for the given setting records.
    #[must_use]
    pub fn new(api: A, items: Vec<SettingItem>) -> Self {
        Self {
            api,
            fetcher: TokenFetcher::default(),
            applier: SettingsApplier::default(),
            items,
        }
    }

    /// Overrides the token fetcher, typically to change the retry budget.
    #[must_use]
    pub fn with_token_fetcher(mut self, fetcher: TokenFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Overrides the settings applier, typically to change the failure
    /// policy.
    #[must_use]
    pub fn with_applier(mut self, applier: SettingsApplier) -> Self {
        self.applier = applier;
        self
    }

    /// Setting records this provisioner writes.
    #[must_use]
    pub fn items(&self) -> &[SettingItem] {
        &self.items
    }

    /// Returns the underlying API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    async fn token(&self, preset: Option<AuthToken>) -> Result<AuthToken, TokenFetchError> {
        match preset {
            Some(token) => {
                info!("using pre-issued auth token");
                Ok(token)
            }
            None => self.fetcher.fetch(&self.api).await,
        }
    }

    /// Runs the workflow. When `preset` carries a token the fetch phase is
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Token`] when no token could be obtained (no
    /// settings are sent) and [`ProvisionError::Apply`] when any setting was
    /// rejected.
    pub async fn execute(&self, preset: Option<AuthToken>) -> Result<ApplyReport, ProvisionError> {
        let token = self.token(preset).await?;
        info!(count = self.items.len(), "applying billing settings");
        let report = self.applier.apply(&self.api, &token, &self.items).await?;
        info!(applied = report.applied.len(), "billing settings applied");
        Ok(report)
    }

    /// Lists the billing-group settings currently stored on the master.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Token`] when no token could be obtained and
    /// [`ProvisionError::List`] when the listing request fails.
    pub async fn current_settings(
        &self,
        preset: Option<AuthToken>,
    ) -> Result<Vec<SettingRecord>, ProvisionError> {
        let token = self.token(preset).await?;
        let records = self
            .api
            .list_settings(&token)
            .await
            .map_err(ProvisionError::List)?;
        Ok(records
            .into_iter()
            .filter(SettingRecord::is_billing)
            .collect())
    }
}
