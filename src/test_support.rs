//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::config::BillingConfig;
use crate::master::{
    ApiFuture, MasterApi, MasterApiError, SETTINGS_PATH, TOKEN_PATH, setting_path,
};
use crate::settings::{SettingItem, SettingRecord};
use crate::token::AuthToken;

/// Configuration with every required field populated.
#[must_use]
pub fn sample_config() -> BillingConfig {
    BillingConfig {
        master_ip: String::from("192.0.2.10"),
        admin_username: String::from("admin"),
        admin_password: String::from("admin-secret"),
        whmcs_domain_name: String::from("billing.example.com"),
        whmcs_pass: String::from("whmcs-secret"),
        billing_type: String::from("WHMCS"),
        billing_username: String::from("admin"),
        token_retries: 5,
        token_retry_delay_secs: 30,
        http_timeout_secs: 30,
        fail_fast: false,
    }
}

/// A PUT recorded by [`ScriptedMasterApi`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedPut {
    /// Token the request was authorised with.
    pub token: String,
    /// Request path.
    pub path: String,
    /// JSON body as it would be sent on the wire.
    pub body: serde_json::Value,
}

#[derive(Debug, Default)]
struct State {
    token_script: VecDeque<Result<String, MasterApiError>>,
    token_requests: Vec<Instant>,
    rejected: BTreeMap<u32, MasterApiError>,
    puts: Vec<RecordedPut>,
    records: Vec<SettingRecord>,
    list_error: Option<MasterApiError>,
}

/// Master API double that replays scripted token responses and records
/// every setting write.
///
/// Token responses are consumed in FIFO order; once the script is empty the
/// endpoint reports HTTP 503.
#[derive(Clone, Debug, Default)]
pub struct ScriptedMasterApi {
    state: Arc<Mutex<State>>,
}

impl ScriptedMasterApi {
    /// Creates a double with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a successful token response.
    pub fn push_token(&self, token: &str) {
        self.state().token_script.push_back(Ok(token.to_owned()));
    }

    /// Queues `count` failed token responses with the given status.
    pub fn push_token_failures(&self, count: u32, status: u16) {
        let mut state = self.state();
        for _ in 0..count {
            state
                .token_script
                .push_back(Err(unavailable(TOKEN_PATH, status)));
        }
    }

    /// Queues a token response that failed before reaching the master.
    pub fn push_token_transport_failure(&self) {
        self.state()
            .token_script
            .push_back(Err(MasterApiError::Transport {
                endpoint: TOKEN_PATH.to_owned(),
                message: String::from("connection refused"),
            }));
    }

    /// Makes every PUT for setting `id` fail with the given status.
    pub fn reject_setting(&self, id: u32, status: u16) {
        self.state()
            .rejected
            .insert(id, unavailable(&setting_path(id), status));
    }

    /// Sets the records returned by the listing endpoint.
    pub fn set_records(&self, records: Vec<SettingRecord>) {
        self.state().records = records;
    }

    /// Makes the listing endpoint fail.
    pub fn fail_listing(&self, status: u16) {
        self.state().list_error = Some(unavailable(SETTINGS_PATH, status));
    }

    /// Number of token requests made so far.
    #[must_use]
    pub fn token_requests(&self) -> usize {
        self.state().token_requests.len()
    }

    /// Times at which token requests were made.
    #[must_use]
    pub fn token_request_times(&self) -> Vec<Instant> {
        self.state().token_requests.clone()
    }

    /// Every PUT received so far, accepted or not.
    #[must_use]
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.state().puts.clone()
    }
}

fn unavailable(endpoint: &str, status: u16) -> MasterApiError {
    MasterApiError::Status {
        endpoint: endpoint.to_owned(),
        status,
        message: String::from("scripted failure"),
    }
}

impl MasterApi for ScriptedMasterApi {
    fn fetch_token(&self) -> ApiFuture<'_, AuthToken> {
        Box::pin(async move {
            let next = {
                let mut state = self.state();
                state.token_requests.push(Instant::now());
                state.token_script.pop_front()
            };
            match next {
                Some(Ok(raw)) => AuthToken::new(raw).ok_or_else(|| {
                    MasterApiError::MalformedResponse {
                        endpoint: TOKEN_PATH.to_owned(),
                        message: String::from("response carries no token"),
                    }
                }),
                Some(Err(err)) => Err(err),
                None => Err(unavailable(TOKEN_PATH, 503)),
            }
        })
    }

    fn put_setting<'a>(
        &'a self,
        token: &'a AuthToken,
        item: &'a SettingItem,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let body = serde_json::to_value(item).map_err(|err| {
                MasterApiError::MalformedResponse {
                    endpoint: setting_path(item.id),
                    message: err.to_string(),
                }
            })?;
            let mut state = self.state();
            state.puts.push(RecordedPut {
                token: token.as_str().to_owned(),
                path: setting_path(item.id),
                body,
            });
            match state.rejected.get(&item.id) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })
    }

    fn list_settings<'a>(&'a self, _token: &'a AuthToken) -> ApiFuture<'a, Vec<SettingRecord>> {
        Box::pin(async move {
            let state = self.state();
            match &state.list_error {
                Some(err) => Err(err.clone()),
                None => Ok(state.records.clone()),
            }
        })
    }
}
