use decomp::calendar::WorkdayCalendar;
use decomp::config::Config;
use tempfile::TempDir;

#[test]
fn missing_config_file_yields_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let config = Config::load_from_dir(dir.path()).expect("load");
    assert_eq!(config.relay.bind, "127.0.0.1:7340");
    assert_eq!(config.collab.debounce_ms, 300);
}

#[test]
fn config_file_overrides_sections_independently() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join(".decomp.toml"),
        r#"
[identity]
default_username = "planner-bot"

[collab]
debounce_ms = 150
claim_ttl_secs = 30
"#,
    )
    .expect("write config");

    let config = Config::load_from_dir(dir.path()).expect("load");
    assert_eq!(config.identity.default_username, "planner-bot");
    assert_eq!(config.collab.debounce_ms, 150);
    assert_eq!(config.collab.claim_ttl_secs, 30);
    // Untouched section keeps defaults.
    assert_eq!(config.relay.reconnect_backoff_secs, 3);
}

#[test]
fn malformed_config_is_an_error_not_a_silent_default() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join(".decomp.toml"), "relay = \"not a table\"")
        .expect("write config");

    assert!(Config::load_from_dir(dir.path()).is_err());
}

#[test]
fn calendar_builds_from_configured_holidays() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join(".decomp.toml"),
        "[calendar]\nholidays = [\"2026-01-01\", \"2026-05-01\"]\n",
    )
    .expect("write config");

    let config = Config::load_from_dir(dir.path()).expect("load");
    let calendar = WorkdayCalendar::from_config(&config.calendar).expect("calendar");
    assert_eq!(calendar.holidays().count(), 2);
}
