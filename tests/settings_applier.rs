//! Behaviour of the settings applier against a scripted master.

use billing_settings::test_support::{ScriptedMasterApi, sample_config};
use billing_settings::{AuthToken, FailurePolicy, SettingItem, SettingsApplier};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn token() -> AuthToken {
    AuthToken::new("abc123").unwrap_or_else(|| panic!("token fixture is valid"))
}

#[fixture]
fn items() -> Vec<SettingItem> {
    sample_config().settings()
}

#[rstest]
#[tokio::test]
async fn valid_token_issues_one_put_per_setting(token: AuthToken, items: Vec<SettingItem>) {
    let api = ScriptedMasterApi::new();

    let report = SettingsApplier::default()
        .apply(&api, &token, &items)
        .await
        .unwrap_or_else(|err| panic!("all settings accepted: {err}"));

    let puts = api.puts();
    assert_eq!(puts.len(), 4);
    assert_eq!(report.applied.len(), 4);
    let paths: Vec<&str> = puts.iter().map(|put| put.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/api/settings/sysapi/1/",
            "/api/settings/sysapi/2/",
            "/api/settings/sysapi/3/",
            "/api/settings/sysapi/4/",
        ]
    );
    assert!(puts.iter().all(|put| put.token == "abc123"));
}

#[rstest]
#[tokio::test]
async fn request_bodies_match_the_master_format(token: AuthToken, items: Vec<SettingItem>) {
    let api = ScriptedMasterApi::new();

    SettingsApplier::default()
        .apply(&api, &token, &items)
        .await
        .unwrap_or_else(|err| panic!("all settings accepted: {err}"));

    let bodies: Vec<serde_json::Value> = api.puts().into_iter().map(|put| put.body).collect();
    assert_eq!(
        bodies,
        vec![
            json!({"id": 1, "name": "billing_type", "setting_group": "billing", "value": "WHMCS"}),
            json!({"id": 2, "name": "billing_url", "setting_group": "billing", "value": "http://billing.example.com"}),
            json!({"id": 3, "name": "billing_username", "setting_group": "billing", "value": "admin"}),
            json!({"id": 4, "name": "billing_password", "setting_group": "billing", "value": "whmcs-secret"}),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn continue_policy_attempts_every_setting_and_reports_all_failures(
    token: AuthToken,
    items: Vec<SettingItem>,
) {
    let api = ScriptedMasterApi::new();
    api.reject_setting(2, 400);
    api.reject_setting(4, 500);

    let err = SettingsApplier::new(FailurePolicy::ContinueOnError)
        .apply(&api, &token, &items)
        .await
        .expect_err("two settings are rejected");

    assert_eq!(api.puts().len(), 4);
    let failed: Vec<u32> = err.failures.iter().map(|failure| failure.setting.id).collect();
    assert_eq!(failed, vec![2, 4]);
    let applied: Vec<u32> = err.applied.iter().map(|setting| setting.id).collect();
    assert_eq!(applied, vec![1, 3]);
    assert!(err.skipped.is_empty());
    assert!(err.to_string().contains("billing_url"), "{err}");
    assert!(err.to_string().contains("billing_password"), "{err}");
}

#[rstest]
#[tokio::test]
async fn fail_fast_policy_stops_at_the_first_rejection(token: AuthToken, items: Vec<SettingItem>) {
    let api = ScriptedMasterApi::new();
    api.reject_setting(2, 400);

    let err = SettingsApplier::new(FailurePolicy::FailFast)
        .apply(&api, &token, &items)
        .await
        .expect_err("billing_url is rejected");

    assert_eq!(api.puts().len(), 2);
    let skipped: Vec<&str> = err
        .skipped
        .iter()
        .map(|setting| setting.name.as_str())
        .collect();
    assert_eq!(skipped, vec!["billing_username", "billing_password"]);
}

#[rstest]
#[tokio::test]
async fn repeated_runs_send_identical_requests(token: AuthToken, items: Vec<SettingItem>) {
    let first = ScriptedMasterApi::new();
    let second = ScriptedMasterApi::new();
    let applier = SettingsApplier::default();

    applier
        .apply(&first, &token, &items)
        .await
        .unwrap_or_else(|err| panic!("first run: {err}"));
    applier
        .apply(&second, &token, &sample_config().settings())
        .await
        .unwrap_or_else(|err| panic!("second run: {err}"));

    assert_eq!(first.puts(), second.puts());
}
