//! Auth token retrieval from the master node.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::master::{MasterApi, MasterApiError};
use crate::retry::RetryPolicy;

/// Opaque credential issued by the master's auth endpoint.
///
/// The token is only held for the duration of one run. Its `Debug` and
/// `Display` output is redacted so it never reaches logs.
#[derive(Clone, Eq, PartialEq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a token string, rejecting blank values.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let token = value.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Returns the raw token for use in request URLs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Raised when the auth endpoint never answered with a token.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("failed to obtain an auth token after {attempts} attempt(s): {source}")]
pub struct TokenFetchError {
    /// Number of requests made.
    pub attempts: u32,
    /// Failure of the final request.
    #[source]
    pub source: MasterApiError,
}

/// Requests a token, retrying per its [`RetryPolicy`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TokenFetcher {
    policy: RetryPolicy,
}

impl TokenFetcher {
    /// Creates a fetcher with the given retry budget.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Retry budget in use.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetches a token from `api`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenFetchError`] when every attempt in the budget failed.
    pub async fn fetch<A>(&self, api: &A) -> Result<AuthToken, TokenFetchError>
    where
        A: MasterApi + ?Sized,
    {
        let max_attempts = self.policy.max_attempts();
        let result = self
            .policy
            .run(|attempt| {
                debug!(attempt, max_attempts, "requesting auth token");
                api.fetch_token()
            })
            .await;

        match result {
            Ok(token) => {
                info!("obtained auth token from master");
                Ok(token)
            }
            Err(exhausted) => Err(TokenFetchError {
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            }),
        }
    }
}
