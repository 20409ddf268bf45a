use binauthz_voucher::{AttestPolicy, Config, EngineConfig, PollConfig, Severity};
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.poll.attempts, 6);
    assert_eq!(config.poll.interval(), Duration::from_secs(10));
    assert_eq!(config.poll.note_id, "PACKAGE_VULNERABILITY");
    assert_eq!(config.engine.attest, AttestPolicy::PassingOnly);
    assert_eq!(config.engine.fail_on, Severity::Unknown);
    assert_eq!(config.engine.timeout(), None);
}

#[test]
fn test_sub_second_durations_are_kept() {
    let engine = EngineConfig::default().with_timeout(Duration::from_millis(500));
    assert_eq!(engine.timeout(), Some(Duration::from_millis(500)));

    let poll = PollConfig::default().with_interval(Duration::from_millis(250));
    assert_eq!(poll.interval(), Duration::from_millis(250));

    let engine = EngineConfig::default().with_timeout(Duration::from_millis(1500));
    assert_eq!(engine.timeout(), Some(Duration::from_millis(1500)));
}

#[test]
fn test_partial_config_fills_defaults() {
    let config: Config = serde_json::from_str(
        r#"{
            "grafeas": { "project": "ci" },
            "poll": { "interval_ms": 750 },
            "engine": { "fail_on": "HIGH", "attest": "always", "timeout_ms": 1500 }
        }"#,
    )
    .unwrap();

    assert_eq!(config.grafeas.project, "ci");
    assert_eq!(config.grafeas.page_size, 100);
    assert_eq!(config.poll.attempts, 6);
    assert_eq!(config.poll.interval(), Duration::from_millis(750));
    assert_eq!(config.engine.fail_on, Severity::High);
    assert_eq!(config.engine.attest, AttestPolicy::Always);
    assert_eq!(config.engine.timeout(), Some(Duration::from_millis(1500)));
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_rejects_zero_attempts() {
    let mut config = Config::default();
    config.grafeas.project = "ci".to_string();
    config.poll = PollConfig::default().with_attempts(0);
    assert!(config.validate().is_err());
}
