//! Applies billing settings to the master, one PUT per record.
//!
//! Each record is sent exactly once. Writes are independent of each other,
//! so a rejected record does not undo earlier ones. Under
//! [`FailurePolicy::ContinueOnError`] every record is attempted and all
//! rejections are reported together.

use std::fmt::{self, Write as _};

use thiserror::Error;
use tracing::{info, warn};

use crate::master::{MasterApi, MasterApiError};
use crate::settings::SettingItem;
use crate::token::AuthToken;

/// What to do once the master rejects a setting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Attempt every remaining setting and report all failures at the end.
    #[default]
    ContinueOnError,
    /// Stop at the first failure; later settings are reported as skipped.
    FailFast,
}

/// Identifies a setting in reports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettingRef {
    /// Setting identifier.
    pub id: u32,
    /// Setting name.
    pub name: String,
}

impl fmt::Display for SettingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}

impl From<&SettingItem> for SettingRef {
    fn from(item: &SettingItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
        }
    }
}

/// A setting the master did not accept.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("setting {setting}: {source}")]
pub struct SettingFailure {
    /// The rejected setting.
    pub setting: SettingRef,
    /// Why the write failed.
    #[source]
    pub source: MasterApiError,
}

/// Settings written during a successful run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApplyReport {
    /// Settings accepted by the master, in the order they were sent.
    pub applied: Vec<SettingRef>,
}

/// Raised when one or more settings were not applied.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{}", describe(.failures, .skipped))]
pub struct SettingApplyError {
    /// Settings the master rejected.
    pub failures: Vec<SettingFailure>,
    /// Settings accepted before or despite the failures.
    pub applied: Vec<SettingRef>,
    /// Settings never attempted because of [`FailurePolicy::FailFast`].
    pub skipped: Vec<SettingRef>,
}

fn describe(failures: &[SettingFailure], skipped: &[SettingRef]) -> String {
    let mut message = format!("failed to apply {} billing setting(s)", failures.len());
    for failure in failures {
        write!(message, "; {failure}").ok();
    }
    if !skipped.is_empty() {
        let names: Vec<&str> = skipped.iter().map(|setting| setting.name.as_str()).collect();
        write!(message, "; skipped: {}", names.join(", ")).ok();
    }
    message
}

/// Sends setting records with a valid token.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SettingsApplier {
    policy: FailurePolicy,
}

impl SettingsApplier {
    /// Creates an applier with the given failure policy.
    #[must_use]
    pub const fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    /// Failure policy in use.
    #[must_use]
    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Sends every item in order.
    ///
    /// # Errors
    ///
    /// Returns [`SettingApplyError`] naming each rejected item when any write
    /// fails.
    pub async fn apply<A>(
        &self,
        api: &A,
        token: &AuthToken,
        items: &[SettingItem],
    ) -> Result<ApplyReport, SettingApplyError>
    where
        A: MasterApi + ?Sized,
    {
        let mut applied = Vec::with_capacity(items.len());
        let mut failures = Vec::new();
        let mut skipped = Vec::new();

        for item in items {
            if !failures.is_empty() && self.policy == FailurePolicy::FailFast {
                skipped.push(SettingRef::from(item));
                continue;
            }

            match api.put_setting(token, item).await {
                Ok(()) => {
                    info!(id = item.id, name = %item.name, "applied billing setting");
                    applied.push(SettingRef::from(item));
                }
                Err(err) => {
                    warn!(id = item.id, name = %item.name, error = %err, "billing setting rejected");
                    failures.push(SettingFailure {
                        setting: SettingRef::from(item),
                        source: err,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(ApplyReport { applied })
        } else {
            Err(SettingApplyError {
                failures,
                applied,
                skipped,
            })
        }
    }
}
