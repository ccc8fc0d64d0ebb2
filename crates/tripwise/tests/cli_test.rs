//! Integration tests for the `tripwise` CLI binary.
//!
//! Every test runs with zero simulated latency and with HOME pointed at a
//! scratch directory, so the user's real configuration and saved state are
//! never read or written.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `tripwise` binary with env isolation.
fn tripwise_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("tripwise");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("TRIPWISE_LATENCY", "0s")
        .env("NO_COLOR", "1")
        .env_remove("TRIPWISE_DATA_DIR")
        .env_remove("TRIPWISE_OUTPUT")
        .env_remove("TRIPWISE_SEED")
        .env_remove("RUST_LOG");
    cmd
}

/// Command bound to a persistent data directory inside `home`.
fn stateful_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = tripwise_cmd(home.path());
    cmd.arg("--data-dir").arg(home.path().join("state"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const QUERY: [&str; 8] = [
    "--from", "cgk", "--to", "DPS", "--date", "2026-12-01", "--count", "8",
];

fn select_flight(home: &TempDir) -> String {
    let output = stateful_cmd(home)
        .args(["select", "flight", "--result", "FL-0001"])
        .args(QUERY)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

fn select_hotel(home: &TempDir) -> String {
    let output = stateful_cmd(home)
        .args([
            "select",
            "hotel",
            "--hotel",
            "HTL-YIA-001",
            "--check-in",
            "2026-12-01",
            "--check-out",
            "2026-12-04",
            "--rooms",
            "2",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

fn show_json(home: &TempDir, id: &str) -> Value {
    let output = stateful_cmd(home)
        .args(["-o", "json", "checkout", "show", id])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = tripwise_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    tripwise_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("search")
            .and(predicate::str::contains("select"))
            .and(predicate::str::contains("checkout"))
            .and(predicate::str::contains("currency")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    tripwise_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tripwise"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    tripwise_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    tripwise_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = tripwise_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_unknown_selection_exits_not_found() {
    let home = TempDir::new().unwrap();
    stateful_cmd(&home)
        .args(["checkout", "show", "8b7f1c52-6a55-4c8e-9a55-0c61f2d6a0b1"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("selections list"));
}

#[test]
fn test_malformed_selection_id_exits_not_found() {
    let home = TempDir::new().unwrap();
    stateful_cmd(&home)
        .args(["selections", "get", "not-an-id"])
        .assert()
        .code(4);
}

#[test]
fn test_invalid_rate_is_rejected() {
    let home = TempDir::new().unwrap();
    stateful_cmd(&home)
        .args(["currency", "rates", "USD=0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn test_clear_without_yes_in_non_tty() {
    let home = TempDir::new().unwrap();
    stateful_cmd(&home)
        .args(["selections", "clear"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

// ── Search ──────────────────────────────────────────────────────────

#[test]
fn test_search_prints_a_page() {
    let home = TempDir::new().unwrap();
    tripwise_cmd(home.path())
        .args(["--ephemeral", "search"])
        .args(QUERY)
        .assert()
        .success()
        .stdout(predicate::str::contains("CGK→DPS"))
        .stderr(predicate::str::contains("Page 1 of"));
}

#[test]
fn test_search_is_reproducible() {
    let home = TempDir::new().unwrap();
    let run = || {
        tripwise_cmd(home.path())
            .args(["--ephemeral", "-o", "plain", "search", "--sort", "duration"])
            .args(QUERY)
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_search_direct_filter() {
    let home = TempDir::new().unwrap();
    let output = tripwise_cmd(home.path())
        .args(["--ephemeral", "-o", "json", "search", "--direct"])
        .args(QUERY)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    for r in results.as_array().unwrap() {
        assert_eq!(r["leg"]["flight_type"], "direct", "{r}");
    }
}

// ── Selections and checkout ─────────────────────────────────────────

#[test]
fn test_selection_persists_across_runs() {
    let home = TempDir::new().unwrap();
    let id = select_flight(&home);

    stateful_cmd(&home)
        .args(["-o", "plain", "selections", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));
}

#[test]
fn test_flight_checkout_total_tracks_components() {
    let home = TempDir::new().unwrap();
    let id = select_flight(&home);

    for args in [
        vec!["checkout", "init", id.as_str()],
        vec!["checkout", "ticket", id.as_str(), "refundable"],
        vec!["checkout", "extras", id.as_str(), "75000"],
        vec!["checkout", "seat", id.as_str(), "12A", "--price", "50000"],
        vec!["checkout", "pay", id.as_str(), "credit_card"],
    ] {
        stateful_cmd(&home).args(&args).assert().success();
    }

    let view = show_json(&home, &id);
    let lines = view["breakdown"]["lines"].as_array().unwrap();
    let sum: u64 = lines.iter().map(|l| l["amount"].as_u64().unwrap()).sum();
    assert_eq!(view["breakdown"]["total"].as_u64().unwrap(), sum);
    assert_eq!(view["draft"]["total"].as_u64().unwrap(), sum);
    assert_eq!(view["draft"]["ticket_type"], "refundable");
    assert_eq!(view["draft"]["seat"]["seat"], "12A");
}

#[test]
fn test_hotel_commands_reject_flight_selection() {
    let home = TempDir::new().unwrap();
    let id = select_flight(&home);
    stateful_cmd(&home)
        .args(["hotel", "resolve", id.as_str()])
        .assert()
        .code(2);
}

#[test]
fn test_hotel_checkout_uses_stay_and_rooms() {
    let home = TempDir::new().unwrap();
    let id = select_hotel(&home);

    stateful_cmd(&home)
        .args(["hotel", "resolve", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Malioboro"));
    stateful_cmd(&home)
        .args(["checkout", "init", id.as_str()])
        .assert()
        .success();

    let view = show_json(&home, &id);
    assert_eq!(view["draft"]["nights"], 3);
    assert_eq!(view["draft"]["rooms"], 2);
    // 540 000 × 3 nights × 2 rooms
    assert_eq!(view["breakdown"]["total"].as_u64().unwrap(), 3_240_000);
}

#[test]
fn test_setter_without_draft_exits_not_found() {
    let home = TempDir::new().unwrap();
    let id = select_flight(&home);
    stateful_cmd(&home)
        .args(["checkout", "extras", id.as_str(), "1000"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("checkout init"));
}

#[test]
fn test_remove_selection_drops_its_draft() {
    let home = TempDir::new().unwrap();
    let id = select_flight(&home);
    stateful_cmd(&home)
        .args(["checkout", "init", id.as_str()])
        .assert()
        .success();
    stateful_cmd(&home)
        .args(["selections", "remove", id.as_str()])
        .assert()
        .success();
    stateful_cmd(&home)
        .args(["checkout", "show", id.as_str()])
        .assert()
        .code(4);
}

#[test]
fn test_evicted_selection_drafts_are_deleted() {
    let home = TempDir::new().unwrap();
    let select = |result: &str| {
        let output = stateful_cmd(&home)
            .env("TRIPWISE_HISTORY_CAPACITY", "1")
            .args(["select", "flight", "--result", result])
            .args(QUERY)
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", combined_output(&output));
        String::from_utf8_lossy(&output.stdout).trim().to_owned()
    };

    let first = select("FL-0001");
    stateful_cmd(&home)
        .env("TRIPWISE_HISTORY_CAPACITY", "1")
        .args(["checkout", "init", first.as_str()])
        .assert()
        .success();
    let drafts = home.path().join("state").join("tripwise.flight-checkout.json");
    assert!(std::fs::read_to_string(&drafts).unwrap().contains(&first));

    let second = select("FL-0002");
    assert_ne!(first, second);
    let saved = std::fs::read_to_string(&drafts).unwrap();
    assert!(!saved.contains(&first), "evicted draft kept: {saved}");
}

// ── Currency ────────────────────────────────────────────────────────

#[test]
fn test_currency_choice_is_saved() {
    let home = TempDir::new().unwrap();
    stateful_cmd(&home)
        .args(["currency", "set", "usd"])
        .assert()
        .success();

    let output = stateful_cmd(&home)
        .args(["-o", "json", "currency", "show"])
        .output()
        .unwrap();
    let rates: Value = serde_json::from_slice(&output.stdout).unwrap();
    let selected: Vec<&Value> = rates
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["selected"] == true)
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0]["code"], "USD");
}

#[test]
fn test_currency_flag_overrides_display_only() {
    let home = TempDir::new().unwrap();
    let id = select_flight(&home);
    stateful_cmd(&home)
        .args(["checkout", "init", id.as_str()])
        .assert()
        .success();

    let output = stateful_cmd(&home)
        .args(["--currency", "EUR", "-o", "json", "checkout", "show", id.as_str()])
        .output()
        .unwrap();
    let view: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["selected"]["currency"], "EUR");
    assert_eq!(view["selected"]["fallback"], false);

    // The saved display currency is untouched.
    let view = show_json(&home, &id);
    assert_eq!(view["selected"]["currency"], "IDR");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_home() {
    let home = TempDir::new().unwrap();
    tripwise_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().unwrap();
    tripwise_cmd(home.path())
        .args(["--yes", "config", "init"])
        .assert()
        .success();
    tripwise_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_currency = \"IDR\""));
}
