//! Client seam for the master node's REST API.
//!
//! [`MasterApi`] is the narrow interface the provisioning workflow depends
//! on; [`HttpMasterApi`] implements it over HTTPS and tests substitute a
//! scripted double.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::settings::{SettingItem, SettingRecord};
use crate::token::AuthToken;

mod error;
mod http;

pub use error::MasterApiError;
pub use http::{HttpMasterApi, SETTINGS_PATH, TOKEN_PATH, setting_path};

/// Future returned by master API operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MasterApiError>> + Send + 'a>>;

/// Admin credentials presented to the token endpoint with HTTP Basic auth.
#[derive(Clone, Eq, PartialEq)]
pub struct AdminCredentials {
    /// Admin account name.
    pub username: String,
    password: String,
}

impl AdminCredentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Password for the admin account.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Operations the billing workflow needs from the master.
pub trait MasterApi {
    /// Requests an auth token. Only an HTTP 200 response carrying a token
    /// counts as success.
    fn fetch_token(&self) -> ApiFuture<'_, AuthToken>;

    /// Writes one system setting.
    fn put_setting<'a>(&'a self, token: &'a AuthToken, item: &'a SettingItem)
    -> ApiFuture<'a, ()>;

    /// Lists the system settings currently stored on the master.
    fn list_settings<'a>(&'a self, token: &'a AuthToken) -> ApiFuture<'a, Vec<SettingRecord>>;
}
