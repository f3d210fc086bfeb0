//! HTTPS implementation of [`MasterApi`] backed by `reqwest`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AdminCredentials, ApiFuture, MasterApi, MasterApiError};
use crate::settings::{SettingItem, SettingRecord};
use crate::token::AuthToken;

/// Path of the token endpoint.
pub const TOKEN_PATH: &str = "/api/auth/token";

/// Path of the system settings collection.
pub const SETTINGS_PATH: &str = "/api/settings/sysapi";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Path used to update the setting with identifier `id`. The trailing slash
/// is required by the master's router.
#[must_use]
pub fn setting_path(id: u32) -> String {
    format!("{SETTINGS_PATH}/{id}/")
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SettingsResponse {
    #[serde(default)]
    data: Vec<SettingRecord>,
}

/// Master API client speaking HTTPS.
///
/// Certificate validation is disabled: masters typically serve self-signed
/// certificates. This removes server authentication entirely, so the
/// client must only be pointed at trusted networks.
#[derive(Clone, Debug)]
pub struct HttpMasterApi {
    client: Client,
    base_url: String,
    credentials: AdminCredentials,
}

impl HttpMasterApi {
    /// Builds a client for the master at `master_address`.
    ///
    /// # Errors
    ///
    /// Returns [`MasterApiError::Client`] when the TLS backend cannot be
    /// initialised.
    pub fn new(
        master_address: &str,
        credentials: AdminCredentials,
        timeout: Duration,
    ) -> Result<Self, MasterApiError> {
        warn!(
            master = master_address,
            "TLS certificate validation is disabled for master API requests"
        );
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| MasterApiError::Client(err.to_string()))?;
        Ok(Self {
            client,
            base_url: format!("https://{}", master_address.trim()),
            credentials,
        })
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn token_request(&self) -> RequestBuilder {
        self.client
            .get(self.url(TOKEN_PATH))
            .basic_auth(&self.credentials.username, Some(self.credentials.password()))
    }

    fn setting_request(&self, token: &AuthToken, item: &SettingItem) -> RequestBuilder {
        self.client
            .put(self.url(&setting_path(item.id)))
            .query(&[("token", token.as_str())])
            .json(item)
    }

    fn settings_request(&self, token: &AuthToken) -> RequestBuilder {
        self.client
            .get(self.url(SETTINGS_PATH))
            .query(&[("token", token.as_str())])
    }

    async fn request_token(&self) -> Result<AuthToken, MasterApiError> {
        let response = self
            .token_request()
            .send()
            .await
            .map_err(|err| transport_error(TOKEN_PATH, err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(TOKEN_PATH, err))?;
        decode_token(status, &body)
    }

    async fn send_setting(
        &self,
        token: &AuthToken,
        item: &SettingItem,
    ) -> Result<(), MasterApiError> {
        let path = setting_path(item.id);
        debug!(id = item.id, name = %item.name, "sending setting update");
        let response = self
            .setting_request(token, item)
            .send()
            .await
            .map_err(|err| transport_error(&path, err))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(&path, response).await)
        }
    }

    async fn request_settings(
        &self,
        token: &AuthToken,
    ) -> Result<Vec<SettingRecord>, MasterApiError> {
        let response = self
            .settings_request(token)
            .send()
            .await
            .map_err(|err| transport_error(SETTINGS_PATH, err))?;

        if !response.status().is_success() {
            return Err(status_error(SETTINGS_PATH, response).await);
        }

        let body: SettingsResponse =
            response
                .json()
                .await
                .map_err(|err| MasterApiError::MalformedResponse {
                    endpoint: SETTINGS_PATH.to_owned(),
                    message: err.to_string(),
                })?;
        Ok(body.data)
    }
}

impl MasterApi for HttpMasterApi {
    fn fetch_token(&self) -> ApiFuture<'_, AuthToken> {
        Box::pin(self.request_token())
    }

    fn put_setting<'a>(
        &'a self,
        token: &'a AuthToken,
        item: &'a SettingItem,
    ) -> ApiFuture<'a, ()> {
        Box::pin(self.send_setting(token, item))
    }

    fn list_settings<'a>(&'a self, token: &'a AuthToken) -> ApiFuture<'a, Vec<SettingRecord>> {
        Box::pin(self.request_settings(token))
    }
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> MasterApiError {
    // The URL carries the token in its query string.
    let message = err.without_url().to_string();
    MasterApiError::Transport {
        endpoint: endpoint.to_owned(),
        message,
    }
}

/// Interprets the token endpoint's answer.
///
/// Only HTTP 200 with a non-blank string `token` field yields a token.
fn decode_token(status: StatusCode, body: &str) -> Result<AuthToken, MasterApiError> {
    if status != StatusCode::OK {
        return Err(MasterApiError::Status {
            endpoint: TOKEN_PATH.to_owned(),
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|err| MasterApiError::MalformedResponse {
            endpoint: TOKEN_PATH.to_owned(),
            message: err.to_string(),
        })?;
    parsed
        .token
        .and_then(AuthToken::new)
        .ok_or_else(|| MasterApiError::MalformedResponse {
            endpoint: TOKEN_PATH.to_owned(),
            message: String::from("response carries no token"),
        })
}

async fn status_error(endpoint: &str, response: Response) -> MasterApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    MasterApiError::Status {
        endpoint: endpoint.to_owned(),
        status: status.as_u16(),
        message: error_message(status, &body),
    }
}

/// Extracts a human-readable message from an error response body.
///
/// The master wraps errors as `{"status": "error", "data": "..."}`; other
/// shapes fall back to a `message` field, then to the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        ["data", "message"]
            .into_iter()
            .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
    });
    if let Some(message) = field {
        return message.to_owned();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
