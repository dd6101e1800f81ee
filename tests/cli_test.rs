use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("flyhigh"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A command whose trip storage lives in `dir`.
fn cmd_with_storage(dir: &Path) -> Command {
    let mut cmd = cmd();
    cmd.env("FLYHIGH_STORAGE__DIR", dir);
    cmd
}

const TRIPS_FIXTURE: &str = r#"[
  {
    "bookingId": "BK1",
    "tripType": "one-way",
    "departure_airport": "CGK",
    "arrival_airport": "DPS",
    "departure_time": "2020-01-10T08:00:00",
    "arrival_time": "2020-01-10T10:00:00",
    "airline_code": "GA",
    "totalPrice": 1250000.0,
    "currency": "IDR",
    "passengers": 1,
    "passengerNames": ["Budi Santoso"],
    "bookedAt": "2020-01-01T00:00:00Z"
  },
  {
    "bookingId": "BK2",
    "tripType": "round-trip",
    "departure_airport": "CGK",
    "arrival_airport": "SIN",
    "departure_time": "2099-03-01T07:00:00",
    "arrival_time": "2099-03-01T10:00:00",
    "airline_code": "SQ",
    "airline_name": "Singapore Airlines",
    "totalPrice": 3100000.0,
    "currency": "IDR",
    "passengers": 2,
    "passengerNames": ["Budi Santoso", "Sari Dewi"],
    "bookedAt": "2020-01-01T00:00:00Z",
    "returnFlight": {
      "departure_airport": "SIN",
      "arrival_airport": "CGK",
      "departure_time": "2099-03-08T18:00:00",
      "arrival_time": "2099-03-08T19:00:00"
    }
  }
]"#;

fn seed_trips(dir: &Path) {
    fs::write(dir.join("myTrips.json"), TRIPS_FIXTURE).unwrap();
}

#[test]
fn top_level_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Search and book FlyHigh flights from the terminal",
        ))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("trips"))
        .stdout(predicate::str::contains("Examples:"))
        .stdout(predicate::str::contains("flyhigh search -f CGK -t DPS"));
}

#[test]
fn top_level_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flyhigh 0.3.0"));
}

#[test]
fn search_help_shows_all_flags() {
    cmd()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-f, --from <IATA>"))
        .stdout(predicate::str::contains("-t, --to <IATA>"))
        .stdout(predicate::str::contains("-d, --date <YYYY-MM-DD>"))
        .stdout(predicate::str::contains("--return-date"))
        .stdout(predicate::str::contains("--trip <TYPE>"))
        .stdout(predicate::str::contains("--cabin <CLASS>"))
        .stdout(predicate::str::contains("--sort <MODE>"))
        .stdout(predicate::str::contains("--stops"))
        .stdout(predicate::str::contains("--airlines"))
        .stdout(predicate::str::contains("--depart-hours <START-END>"))
        .stdout(predicate::str::contains("--arrive-hours <START-END>"))
        .stdout(predicate::str::contains("--adults <N>"))
        .stdout(predicate::str::contains("--top <N>"))
        .stdout(predicate::str::contains("--compact"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("One-way:"))
        .stdout(predicate::str::contains("Round-trip:"));
}

#[test]
fn search_help_shows_defaults() {
    cmd()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: economy]"))
        .stdout(predicate::str::contains("[default: best]"))
        .stdout(predicate::str::contains("[default: 1]"));
}

#[test]
fn book_help_shows_pick_and_passenger() {
    cmd()
        .args(["book", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pick <N>"))
        .stdout(predicate::str::contains("--return-pick <N>"))
        .stdout(predicate::str::contains("--passenger"))
        .stdout(predicate::str::contains("-f, --from <IATA>"));
}

#[test]
fn book_requires_pick() {
    cmd()
        .args(["book", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--pick"));
}

#[test]
fn missing_origin_fails() {
    cmd()
        .args(["search", "-t", "DPS", "-d", "2025-12-20"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please fill in all required fields"));
}

#[test]
fn round_trip_without_return_date_fails() {
    cmd()
        .args(["search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20", "--trip", "round-trip"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please select a return date for round trip"));
}

#[test]
fn same_origin_and_destination_fails() {
    cmd()
        .args(["search", "-f", "CGK", "-t", "cgk", "-d", "2025-12-20"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("origin and destination must differ"));
}

#[test]
fn invalid_airport_code_too_short() {
    cmd()
        .args(["search", "-f", "CG", "-t", "DPS", "-d", "2025-12-20"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be exactly 3 letters"));
}

#[test]
fn invalid_date_has_example() {
    cmd()
        .args(["search", "-f", "CGK", "-t", "DPS", "-d", "20-12-2025"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn return_before_departure_fails() {
    cmd()
        .args([
            "search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20",
            "--return-date", "2025-12-10",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("return date cannot be before"));
}

#[test]
fn too_many_passengers() {
    cmd()
        .args([
            "search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20",
            "--adults", "8", "--children", "2",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exceeds maximum of 9"));
}

#[test]
fn huge_passenger_count_is_rejected() {
    cmd()
        .args([
            "search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20",
            "--adults", "4294967295", "--children", "1",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exceeds maximum of 9"));
}

#[test]
fn invalid_cabin_class() {
    cmd()
        .args(["search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20", "--cabin", "coach"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid cabin class"));
}

#[test]
fn invalid_sort_mode() {
    cmd()
        .args(["search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20", "--sort", "price"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid sort mode"));
}

#[test]
fn invalid_stop_filter() {
    cmd()
        .args(["search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20", "--stops", "many"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid stop filter"));
}

#[test]
fn invalid_hour_window() {
    cmd()
        .args([
            "search", "-f", "CGK", "-t", "DPS", "-d", "2025-12-20",
            "--depart-hours", "18-6",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid hour range"));
}

#[test]
fn json_mode_error_is_structured() {
    let output = cmd()
        .args(["search", "-f", "CG", "-t", "DPS", "-d", "2025-12-20", "--json"])
        .assert()
        .code(2);
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON error");
    assert_eq!(parsed["error"]["kind"], "invalid_airport");
    assert!(parsed["error"]["message"]
        .as_str()
        .unwrap()
        .contains("must be exactly 3 letters"));
}

#[test]
fn json_mode_missing_field_error() {
    let output = cmd()
        .args(["search", "-f", "CGK", "-t", "DPS", "--json"])
        .assert()
        .code(2);
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON error");
    assert_eq!(parsed["error"]["kind"], "missing_field");
}

#[test]
fn airports_needs_two_characters() {
    cmd()
        .args(["airports", "j"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least 2 characters"));
}

#[test]
fn trips_empty_storage() {
    let dir = tempfile::tempdir().unwrap();
    cmd_with_storage(dir.path())
        .arg("trips")
        .assert()
        .success()
        .stdout(predicate::str::contains("No trips yet."));
}

#[test]
fn trips_lists_stored_trips() {
    let dir = tempfile::tempdir().unwrap();
    seed_trips(dir.path());
    cmd_with_storage(dir.path())
        .arg("trips")
        .assert()
        .success()
        .stdout(predicate::str::contains("BK1"))
        .stdout(predicate::str::contains("BK2"))
        .stdout(predicate::str::contains("Completed"))
        .stdout(predicate::str::contains("Upcoming"))
        .stdout(predicate::str::contains("Rp 1.250.000"));
}

#[test]
fn trips_filter_upcoming() {
    let dir = tempfile::tempdir().unwrap();
    seed_trips(dir.path());
    cmd_with_storage(dir.path())
        .args(["trips", "--filter", "upcoming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BK2"))
        .stdout(predicate::str::contains("BK1").not());
}

#[test]
fn trips_filter_completed_json() {
    let dir = tempfile::tempdir().unwrap();
    seed_trips(dir.path());
    let output = cmd_with_storage(dir.path())
        .args(["trips", "--filter", "completed", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let listed = parsed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["status"], "completed");
    assert_eq!(listed[0]["trip"]["bookingId"], "BK1");
}

#[test]
fn trips_invalid_filter() {
    let dir = tempfile::tempdir().unwrap();
    cmd_with_storage(dir.path())
        .args(["trips", "--filter", "soon"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid trip filter"));
}

#[test]
fn airports_reports_unreachable_backend() {
    cmd()
        .env("FLYHIGH_API__BASE_URL", "http://127.0.0.1:1/api")
        .args(["airports", "jakarta"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("No airports match").not());
}

#[test]
fn trips_delete_with_yes_persists() {
    let dir = tempfile::tempdir().unwrap();
    seed_trips(dir.path());
    cmd_with_storage(dir.path())
        .args(["trips", "--delete", "BK1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted trip BK1."));

    let stored = fs::read_to_string(dir.path().join("myTrips.json")).unwrap();
    assert!(!stored.contains("\"BK1\""));
    assert!(stored.contains("\"BK2\""));
}

#[test]
fn trips_delete_declined_keeps_trip() {
    let dir = tempfile::tempdir().unwrap();
    seed_trips(dir.path());
    cmd_with_storage(dir.path())
        .args(["trips", "--delete", "BK1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kept trip BK1."));

    let stored = fs::read_to_string(dir.path().join("myTrips.json")).unwrap();
    assert!(stored.contains("\"BK1\""));
}

#[test]
fn trips_delete_unknown_id_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    seed_trips(dir.path());
    let before = fs::read_to_string(dir.path().join("myTrips.json")).unwrap();
    cmd_with_storage(dir.path())
        .args(["trips", "--delete", "BK999", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No trip with booking id BK999; nothing deleted."))
        .stdout(predicate::str::contains("BK1"));

    let after = fs::read_to_string(dir.path().join("myTrips.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn trips_delete_unknown_id_json_keeps_stdout_json() {
    let dir = tempfile::tempdir().unwrap();
    seed_trips(dir.path());
    let output = cmd_with_storage(dir.path())
        .args(["trips", "--delete", "BK999", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing deleted"));
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let listed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[test]
fn corrupt_trip_storage_exits_with_storage_code() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("myTrips.json"), "{not json").unwrap();
    cmd_with_storage(dir.path())
        .arg("trips")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("trip storage error"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["--config"])
        .arg(dir.path().join("absent.toml"))
        .arg("trips")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn config_file_sets_storage_dir() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("store");
    fs::create_dir_all(&storage).unwrap();
    seed_trips(&storage);
    let config = dir.path().join("flyhigh.toml");
    fs::write(
        &config,
        format!("[storage]\ndir = {:?}\n", storage.to_string_lossy()),
    )
    .unwrap();

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("trips")
        .assert()
        .success()
        .stdout(predicate::str::contains("BK2"));
}

#[test]
fn no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn unknown_subcommand_fails() {
    cmd().arg("fly").assert().failure();
}
