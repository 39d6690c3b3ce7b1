use std::fs;

use assert_cmd::Command;
use csv::Reader;
use predicates::prelude::*;
use tempfile::tempdir;

const HOVER_CASE: &str = "configs/cases/graupner_6x3_hover.yaml";

fn rotor_perf() -> Command {
    Command::cargo_bin("rotor_perf").expect("rotor_perf bin")
}

#[test]
fn hover_case_writes_performance_csv() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("out").join("hover.csv");

    rotor_perf()
        .args(["--case", HOVER_CASE, "--output", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== graupner_6x3_hover ==="))
        .stdout(predicate::str::contains("Wrote"));

    let mut reader = Reader::from_path(&output).expect("csv reader");
    let rows: Vec<_> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records");
    assert_eq!(rows.len(), 4);

    let thrust: f64 = rows[0][4].parse().expect("thrust");
    assert!((thrust - 3.2217).abs() < 1e-3, "hover thrust {thrust}");
    let airspeeds: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
    assert_eq!(airspeeds, ["0.000", "2.000", "5.000", "8.000"]);
    assert!(rows.iter().all(|r| &r[11] == "true"));
}

#[test]
fn case_directory_runs_every_case() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("all.csv");

    rotor_perf()
        .args(["--case", "configs/cases", "--output", output.to_str().unwrap()])
        .assert()
        .success();

    let mut reader = Reader::from_path(&output).expect("csv reader");
    let cases: Vec<String> = reader
        .records()
        .map(|r| r.expect("record")[0].to_string())
        .collect();
    assert_eq!(cases.len(), 7);
    assert_eq!(cases.iter().filter(|c| *c == "apc_10x7_synthetic").count(), 3);
    assert_eq!(cases[0], "apc_10x7_synthetic");
}

#[test]
fn dash_output_streams_csv_to_stdout() {
    rotor_perf()
        .args(["--case", HOVER_CASE, "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("case,airspeed_m_s,rpm"))
        .stdout(predicate::str::contains("graupner_6x3_hover,0.000,14020.0"))
        .stdout(predicate::str::contains("===").not());
}

#[test]
fn distributions_flag_writes_json_per_case() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("perf.csv");
    let json_dir = dir.path().join("stations");

    rotor_perf()
        .args([
            "--case",
            HOVER_CASE,
            "--output",
            output.to_str().unwrap(),
            "--distributions",
            json_dir.to_str().unwrap(),
            "--stations",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("dT/dr"));

    let json = fs::read_to_string(json_dir.join("graupner_6x3_hover_stations.json"))
        .expect("sidecar json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse json");
    assert_eq!(value["points"].as_array().map(Vec::len), Some(4));
}

#[test]
fn strict_mode_fails_on_unconverged_stations() {
    let dir = tempdir().expect("tempdir");
    let case = dir.path().join("capped.yaml");
    let text = fs::read_to_string(HOVER_CASE).expect("hover case");
    fs::write(&case, text.replace("max_iterations: 100", "max_iterations: 3")).expect("write");
    let output = dir.path().join("capped.csv");

    rotor_perf()
        .args([
            "--case",
            case.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    rotor_perf()
        .args([
            "--case",
            case.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--strict",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unconverged stations"));

    let contents = fs::read_to_string(&output).expect("csv");
    assert!(contents.lines().skip(1).all(|line| line.contains(",false,")));
}

#[test]
fn missing_case_file_fails() {
    let dir = tempdir().expect("tempdir");
    rotor_perf()
        .args([
            "--case",
            "configs/cases/does_not_exist.yaml",
            "--output",
            dir.path().join("never.csv").to_str().unwrap(),
        ])
        .assert()
        .failure();
}
