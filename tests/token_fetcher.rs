//! Retry behaviour of the token fetcher against a scripted master.

use std::time::Duration;

use billing_settings::test_support::ScriptedMasterApi;
use billing_settings::{MasterApiError, RetryPolicy, TokenFetcher};
use rstest::rstest;

const DELAY: Duration = Duration::from_secs(30);

fn fetcher() -> TokenFetcher {
    TokenFetcher::new(RetryPolicy::new(5, DELAY))
}

#[tokio::test(start_paused = true)]
async fn failing_endpoint_is_tried_six_times_then_fails() {
    let api = ScriptedMasterApi::new();
    api.push_token_failures(10, 503);

    let err = fetcher()
        .fetch(&api)
        .await
        .expect_err("endpoint never succeeds");

    assert_eq!(api.token_requests(), 6);
    assert_eq!(err.attempts, 6);
    assert!(
        matches!(err.source, MasterApiError::Status { status: 503, .. }),
        "unexpected source: {:?}",
        err.source
    );
}

#[tokio::test(start_paused = true)]
async fn failed_attempts_are_at_least_thirty_seconds_apart() {
    let api = ScriptedMasterApi::new();

    let result = fetcher().fetch(&api).await;

    assert!(result.is_err());
    let times = api.token_request_times();
    assert_eq!(times.len(), 6);
    for pair in times.windows(2) {
        let [earlier, later] = pair else {
            panic!("windows(2) yields pairs");
        };
        assert!(*later - *earlier >= DELAY);
    }
}

#[rstest]
#[case::first_attempt(1)]
#[case::second_attempt(2)]
#[case::third_attempt(3)]
#[case::fourth_attempt(4)]
#[case::fifth_attempt(5)]
#[case::last_attempt(6)]
#[tokio::test(start_paused = true)]
async fn success_on_attempt_k_makes_exactly_k_requests(#[case] k: u32) {
    let api = ScriptedMasterApi::new();
    api.push_token_failures(k - 1, 502);
    api.push_token("abc123");

    let token = fetcher()
        .fetch(&api)
        .await
        .unwrap_or_else(|err| panic!("token expected on attempt {k}: {err}"));

    assert_eq!(token.as_str(), "abc123");
    assert_eq!(api.token_requests(), usize::try_from(k).unwrap_or(usize::MAX));
}

#[tokio::test(start_paused = true)]
async fn connection_failures_are_retried() {
    let api = ScriptedMasterApi::new();
    api.push_token_transport_failure();
    api.push_token_transport_failure();
    api.push_token("abc123");

    let token = fetcher()
        .fetch(&api)
        .await
        .unwrap_or_else(|err| panic!("token expected: {err}"));

    assert_eq!(token.as_str(), "abc123");
    assert_eq!(api.token_requests(), 3);
}

#[tokio::test(start_paused = true)]
async fn blank_token_counts_as_a_failed_attempt() {
    let api = ScriptedMasterApi::new();
    api.push_token("");
    api.push_token("abc123");

    let token = fetcher()
        .fetch(&api)
        .await
        .unwrap_or_else(|err| panic!("token expected: {err}"));

    assert_eq!(token.as_str(), "abc123");
    assert_eq!(api.token_requests(), 2);
}

#[tokio::test(start_paused = true)]
async fn zero_retries_makes_a_single_request() {
    let api = ScriptedMasterApi::new();

    let err = TokenFetcher::new(RetryPolicy::new(0, DELAY))
        .fetch(&api)
        .await
        .expect_err("no token scripted");

    assert_eq!(err.attempts, 1);
    assert_eq!(api.token_requests(), 1);
}
