//! Billing setting records sent to the master's system settings API.
//!
//! The master stores billing configuration as four numbered system settings
//! in the `billing` group. Each record is written with an independent PUT keyed
//! by its identifier, so re-sending the same records leaves the master
//! unchanged.

use serde::{Deserialize, Serialize};

use crate::config::BillingConfig;

/// Settings group shared by every billing record.
pub const SETTING_GROUP: &str = "billing";

/// Replacement shown instead of secret values.
pub const MASKED_VALUE: &str = "********";

/// The billing settings managed by this tool, in application order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BillingSetting {
    /// Billing backend flavour (for example `WHMCS`).
    Type,
    /// Base URL of the billing backend.
    Url,
    /// Account used by the master to talk to the billing backend.
    Username,
    /// Password for [`BillingSetting::Username`].
    Password,
}

impl BillingSetting {
    /// All billing settings in the order they are applied.
    pub const ALL: [Self; 4] = [Self::Type, Self::Url, Self::Username, Self::Password];

    /// Numeric identifier of the setting in the master's settings table.
    #[must_use]
    pub const fn id(self) -> u32 {
        match self {
            Self::Type => 1,
            Self::Url => 2,
            Self::Username => 3,
            Self::Password => 4,
        }
    }

    /// Setting name as stored by the master.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Type => "billing_type",
            Self::Url => "billing_url",
            Self::Username => "billing_username",
            Self::Password => "billing_password",
        }
    }

    /// Whether the value must be masked in output.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password)
    }

    /// Looks a setting up by the name the master reports.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|setting| setting.name() == name)
    }
}

/// One setting write, serialised exactly as the master expects it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SettingItem {
    /// Setting identifier, also used in the request path.
    pub id: u32,
    /// Setting name.
    pub name: String,
    /// Settings group; always [`SETTING_GROUP`].
    #[serde(rename = "setting_group")]
    pub group: String,
    /// Value to store.
    pub value: String,
}

impl SettingItem {
    /// Creates the record for `setting` with the given value.
    #[must_use]
    pub fn new(setting: BillingSetting, value: impl Into<String>) -> Self {
        Self {
            id: setting.id(),
            name: setting.name().to_owned(),
            group: SETTING_GROUP.to_owned(),
            value: value.into(),
        }
    }

    /// Returns a copy with secret values replaced by [`MASKED_VALUE`].
    #[must_use]
    pub fn masked(&self) -> Self {
        let secret = BillingSetting::from_name(&self.name).is_some_and(BillingSetting::is_secret);
        if secret {
            Self {
                value: MASKED_VALUE.to_owned(),
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }
}

/// Renders the four billing records from configuration.
///
/// The billing URL is always addressed over plain HTTP on the configured
/// WHMCS domain.
#[must_use]
pub fn billing_settings(config: &BillingConfig) -> Vec<SettingItem> {
    BillingSetting::ALL
        .into_iter()
        .map(|setting| {
            let value = match setting {
                BillingSetting::Type => config.billing_type.trim().to_owned(),
                BillingSetting::Url => format!("http://{}", config.whmcs_domain_name.trim()),
                BillingSetting::Username => config.billing_username.trim().to_owned(),
                BillingSetting::Password => config.whmcs_pass.clone(),
            };
            SettingItem::new(setting, value)
        })
        .collect()
}

/// A system setting as reported by the master's listing endpoint.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SettingRecord {
    /// Setting identifier.
    pub id: u32,
    /// Setting name.
    pub name: String,
    /// Group the setting belongs to.
    #[serde(default)]
    pub setting_group: Option<String>,
    /// Stored value; the master reports `null` for unset settings.
    #[serde(default)]
    pub value: Option<String>,
}

impl SettingRecord {
    /// Whether the record belongs to the billing group.
    #[must_use]
    pub fn is_billing(&self) -> bool {
        self.setting_group.as_deref() == Some(SETTING_GROUP)
            || BillingSetting::from_name(&self.name).is_some()
    }

    /// Renders the record as `name=value`, masking secrets.
    #[must_use]
    pub fn display_line(&self) -> String {
        let secret = BillingSetting::from_name(&self.name).is_some_and(BillingSetting::is_secret);
        let value = match (&self.value, secret) {
            (None, _) => "",
            (Some(_), true) => MASKED_VALUE,
            (Some(value), false) => value.as_str(),
        };
        format!("{}={value}", self.name)
    }
}
