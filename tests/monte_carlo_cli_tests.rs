// tests/monte_carlo_cli_tests.rs
//
// Integration tests for the monte_carlo binary:
// 1. Same flags => identical mc_summary.json and mc_runs.jsonl
// 2. One JSONL record per run, tagged with run_index and seed
// 3. --season-length controls the reset cadence of every run
// 4. Invalid configuration exits non-zero

use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn run_monte_carlo(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_monte_carlo"))
        .args(args)
        .env_remove("ADDF_SECTORS")
        .env_remove("ADDF_OBSERVATIONS")
        .env_remove("ADDF_MAX_WAIT_FAST")
        .env_remove("ADDF_MAX_WAIT_SLOW")
        .env_remove("ADDF_SEASON_LENGTH")
        .env_remove("ADDF_MAX_FILLER")
        .env_remove("ADDF_PRESET")
        .output()
        .expect("Failed to execute monte_carlo binary")
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let content = fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&content).expect("Failed to parse JSON file")
}

#[test]
fn test_monte_carlo_is_deterministic() {
    let dir1 = tempdir().expect("Failed to create temp dir 1");
    let dir2 = tempdir().expect("Failed to create temp dir 2");

    for dir in [&dir1, &dir2] {
        let out = run_monte_carlo(&[
            "--runs",
            "6",
            "--days",
            "72",
            "--seed",
            "42",
            "--quiet",
            "--output-dir",
            dir.path().to_str().unwrap(),
        ]);
        assert!(
            out.status.success(),
            "monte_carlo failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
    }

    assert_eq!(
        read_json(&dir1.path().join("mc_summary.json")),
        read_json(&dir2.path().join("mc_summary.json"))
    );
    assert_eq!(
        fs::read_to_string(dir1.path().join("mc_runs.jsonl")).unwrap(),
        fs::read_to_string(dir2.path().join("mc_runs.jsonl")).unwrap()
    );
}

#[test]
fn test_monte_carlo_writes_one_record_per_run() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = run_monte_carlo(&[
        "--runs",
        "4",
        "--days",
        "30",
        "--seed",
        "10",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("addf-mc"));
    assert!(stdout.contains("summary |"));

    let content = fs::read_to_string(dir.path().join("mc_runs.jsonl")).unwrap();
    let records: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("Failed to parse JSONL line"))
        .collect();
    assert_eq!(records.len(), 4);
    for (i, r) in records.iter().enumerate() {
        assert_eq!(r["run_index"].as_u64(), Some(i as u64));
        assert_eq!(r["seed"].as_u64(), Some(10 + i as u64));
        assert_eq!(r["days"].as_u64(), Some(30));
    }

    let summary = read_json(&dir.path().join("mc_summary.json"));
    assert_eq!(summary["runs"], 4);
    assert_eq!(summary["stats"]["runs"], 4);
    let fast_mean = summary["stats"]["fast_accuracy_pct"]["mean"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&fast_mean));
}

#[test]
fn test_monte_carlo_season_length_flag() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = run_monte_carlo(&[
        "--runs",
        "2",
        "--days",
        "30",
        "--season-length",
        "10",
        "--quiet",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(
        out.status.success(),
        "monte_carlo failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let content = fs::read_to_string(dir.path().join("mc_runs.jsonl")).unwrap();
    for line in content.lines() {
        let r: serde_json::Value = serde_json::from_str(line).expect("Failed to parse JSONL line");
        assert_eq!(r["season_length"].as_u64(), Some(10));
        assert_eq!(r["seasons"].as_u64(), Some(3));
    }
    let summary = read_json(&dir.path().join("mc_summary.json"));
    assert_eq!(summary["season_length"], 10);
}

#[test]
fn test_monte_carlo_rejects_invalid_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = run_monte_carlo(&[
        "--runs",
        "2",
        "--observations",
        "1",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("observation granularity"));
}
