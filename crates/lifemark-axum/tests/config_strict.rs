#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use lifemark_axum::config;
use lifemark_core::LifecycleEvent;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
plugin:
  log_measurementz: false # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:3000");
    assert_eq!(cfg.plugin.events, LifecycleEvent::ALL.to_vec());
    assert!(cfg.plugin.log_measurements);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn unknown_event_name_fails() {
    let bad = r#"
version: 1
plugin:
  events: [request-received, onRequest, response-complete]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn events_must_follow_lifecycle_order() {
    let bad = r#"
version: 1
plugin:
  events: [pre-handle, pre-parse, response-complete]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn duplicate_events_fail() {
    let bad = r#"
version: 1
plugin:
  events: [pre-parse, pre-parse, response-complete]
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn response_complete_is_required() {
    let bad = r#"
version: 1
plugin:
  events: [request-received, pre-parse, pre-validate]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("response-complete"));
}

#[test]
fn subset_of_events_is_accepted() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
plugin:
  events: [pre-handle, pre-serialize, response-complete]
  log_measurements: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.plugin.events.len(), 3);
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9000);
}

#[test]
fn bad_listen_address_fails() {
    let bad = r#"
version: 1
server:
  listen: "not-an-addr"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}
