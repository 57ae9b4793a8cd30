//! Integration tests for the `netaudit` CLI binary.
//!
//! Argument parsing, help output, completions, config files and exit
//! codes, plus a few commands run against a wiremock audit service.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `netaudit` binary with env isolation.
///
/// Clears all `NETAUDIT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn netaudit_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("netaudit");
    cmd.env("HOME", "/tmp/netaudit-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/netaudit-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("NETAUDIT_PROFILE")
        .env_remove("NETAUDIT_URL")
        .env_remove("NETAUDIT_CONFIG")
        .env_remove("NETAUDIT_OUTPUT")
        .env_remove("NETAUDIT_INSECURE")
        .env_remove("NETAUDIT_TIMEOUT")
        .env_remove("NETAUDIT_INTERVAL_MS")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn network_status() -> serde_json::Value {
    json!({
        "devices": [
            {
                "id": "HOST-5",
                "ip": "10.0.0.5",
                "status": "Blocked",
                "packetCount": 2550,
                "packetLimit": 1500,
                "recentPacketHistory": [300, 400, 500, 600, 700],
                "last_protocol": "UDP",
                "last_port": ""
            },
            {
                "id": "HOST-6",
                "ip": "10.0.0.6",
                "status": "Connected",
                "packetCount": 12
            }
        ],
        "status": { "isRunning": true, "simulating": false }
    })
}

async fn service() -> (MockServer, String) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/network_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(network_status()))
        .mount(&server)
        .await;
    let url = format!("{}/api", server.uri());
    (server, url)
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || netaudit_cmd().args(&args).output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = netaudit_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    netaudit_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("audit service")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    netaudit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netaudit"));
}

#[test]
fn test_completions_bash() {
    netaudit_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_devices_subcommands_exist() {
    netaudit_cmd()
        .args(["devices", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("block"))
                .and(predicate::str::contains("unblock"))
                .and(predicate::str::contains("limit")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = netaudit_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_status_without_config_explains_setup() {
    netaudit_cmd()
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No audit service configured"));
}

#[test]
fn test_unknown_profile_is_reported() {
    netaudit_cmd()
        .args(["--profile", "lab", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'lab' not found"));
}

#[test]
fn test_invalid_ip_is_a_usage_error() {
    netaudit_cmd()
        .args(["--url", "http://127.0.0.1:5000/api", "devices", "block", "not-an-ip"])
        .assert()
        .code(2);
}

#[test]
fn test_zero_limit_is_rejected() {
    netaudit_cmd()
        .args(["--url", "http://127.0.0.1:9/api", "devices", "limit", "10.0.0.5", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_unreachable_service_exits_with_connection_code() {
    netaudit_cmd()
        .args(["--url", "http://127.0.0.1:9/api", "--timeout", "2", "status"])
        .assert()
        .code(7);
}

// ── Config files ────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    netaudit_cmd()
        .args(["--config", "/tmp/somewhere/netaudit.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/somewhere/netaudit.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let file = file.to_str().unwrap();

    netaudit_cmd()
        .args(["--config", file, "--url", "http://10.1.1.1:5000/api", "config", "init", "--name", "lab"])
        .assert()
        .success();

    netaudit_cmd()
        .args(["--config", file, "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default_profile = \"lab\"")
                .and(predicate::str::contains("http://10.1.1.1:5000/api")),
        );

    // A second init must not clobber the file.
    netaudit_cmd()
        .args(["--config", file, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ── Against a mock service ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_reports_blocked_devices() {
    let (_server, url) = service().await;

    let output = run(vec!["--url".into(), url, "status".into()]).await;
    let text = combined_output(&output);

    assert!(output.status.success(), "{text}");
    assert!(text.contains("Threat contained (1 blocked)"), "{text}");
    assert!(text.contains("10.0.0.6"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_filters_by_status_as_plain() {
    let (_server, url) = service().await;

    let output = run(vec![
        "--url".into(),
        url,
        "-o".into(),
        "plain".into(),
        "devices".into(),
        "list".into(),
        "--status".into(),
        "blocked".into(),
    ])
    .await;

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "10.0.0.5");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_get_json_and_missing_device() {
    let (_server, url) = service().await;

    let output = run(vec![
        "--url".into(),
        url.clone(),
        "-o".into(),
        "json".into(),
        "devices".into(),
        "get".into(),
        "10.0.0.5".into(),
    ])
    .await;
    assert!(output.status.success());
    let device: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(device["status"], "Blocked");
    assert_eq!(device["packet_limit"], 1500);
    assert_eq!(device["identity"]["last_port"], serde_json::Value::Null);

    let output = run(vec!["--url".into(), url, "devices".into(), "get".into(), "10.0.0.99".into()]).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_block_sends_unified_action() {
    let (server, url) = service().await;
    Mock::given(method("POST"))
        .and(path("/api/device_action"))
        .and(body_json(json!({ "ip": "10.0.0.6", "action": "block" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "device": { "ip": "10.0.0.6", "status": "Blocked" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(vec!["--url".into(), url, "devices".into(), "block".into(), "10.0.0.6".into()]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Device 10.0.0.6 blocked"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_action_exits_non_zero() {
    let (server, url) = service().await;
    Mock::given(method("POST"))
        .and(path("/api/device_action"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "device not found"
        })))
        .mount(&server)
        .await;

    let output = run(vec!["--url".into(), url, "devices".into(), "unblock".into(), "10.0.0.77".into()]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("device not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_streams_block_once_then_exits_on_disconnect() {
    let server = MockServer::start().await;
    let mut connected = network_status();
    connected["devices"][0]["status"] = json!("Connected");
    Mock::given(method("GET"))
        .and(path("/api/network_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connected))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/network_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(network_status()))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/network_status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("capture thread crashed"))
        .mount(&server)
        .await;
    let url = format!("{}/api", server.uri());

    let output = tokio::task::spawn_blocking(move || {
        netaudit_cmd()
            .args(["--url", &url, "--interval-ms", "100", "watch", "--follow", "10.0.0.5"])
            .timeout(std::time::Duration::from_secs(20))
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
    assert_eq!(stdout.matches("BLOCKED HOST-5 (10.0.0.5)").count(), 1, "{stdout}");
    assert!(stdout.contains("System: Threat contained (1 blocked)"), "{stdout}");
    assert!(stdout.contains("Connection to audit service lost"), "{stdout}");
    assert!(stdout.contains("── 10.0.0.5 ──"), "{stdout}");
    assert!(combined_output(&output).contains("Lost connection to the audit service"));
}
