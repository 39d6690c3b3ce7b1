use std::fs::{self, File};

use csv::Reader;
use rotor_performance::case;
use rotor_performance::export::distributions::{self, Metadata};
use rotor_performance::export::performance::{HEADER, Record, write_header, writer_for_path};
use rotor_performance::solver::{RotorPerformance, sweep};
use serde_json::Value;
use tempfile::tempdir;

fn hover_results() -> (case::Case, Vec<RotorPerformance>) {
    let case = case::load_case("configs/cases/graupner_6x3_hover.yaml").expect("hover case");
    let results = sweep(&case.rotor, &case.points, &case.settings).expect("sweep");
    (case, results)
}

#[test]
fn performance_csv_matches_header() {
    let (case, results) = hover_results();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("performance.csv");

    {
        let mut writer = writer_for_path(&path).expect("writer");
        write_header(writer.as_mut()).expect("header");
        for performance in &results {
            Record::new(&case.name, performance)
                .write_to(writer.as_mut())
                .expect("record");
        }
    }

    let mut reader = Reader::from_path(&path).expect("csv reader");
    let headers = reader.headers().expect("headers").clone();
    let expected: Vec<&str> = HEADER.split(',').collect();
    assert_eq!(headers.iter().collect::<Vec<_>>(), expected);

    let rows: Vec<_> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records");
    assert_eq!(rows.len(), 4);

    let hover = &rows[0];
    assert_eq!(&hover[0], "graupner_6x3_hover");
    assert_eq!(&hover[1], "0.000");
    assert_eq!(&hover[2], "14020.0");
    let thrust: f64 = hover[4].parse().expect("thrust");
    assert!((thrust - 3.221745).abs() < 1e-3, "thrust {thrust}");
    assert_eq!(&hover[10], "0.000000", "no useful work in hover");
    assert_eq!(&hover[11], "true");
    assert_eq!(&hover[12], "0");

    for (row, performance) in rows.iter().zip(&results) {
        let airspeed: f64 = row[1].parse().expect("airspeed");
        assert!((airspeed - performance.airspeed_m_s).abs() < 1e-3);
        let power: f64 = row[6].parse().expect("power");
        assert!((power - performance.power_w).abs() < 1e-4);
        let max_residual: f64 = row[13].parse().expect("max residual");
        let expected = performance.max_residual();
        assert!((max_residual - expected).abs() <= 1e-3 * expected);
    }
}

#[test]
fn efficiency_column_is_empty_without_shaft_power() {
    let (case, mut results) = hover_results();
    let performance = &mut results[0];
    performance.power_w = 0.0;

    let mut buffer = Vec::new();
    Record::new(&case.name, performance)
        .write_to(&mut buffer)
        .expect("record");
    let line = String::from_utf8(buffer).expect("utf8");
    let fields: Vec<&str> = line.trim_end().split(',').collect();
    assert_eq!(fields.len(), HEADER.split(',').count());
    assert_eq!(fields[10], "");
}

#[test]
fn distribution_sidecar_lists_every_station() {
    let (case, results) = hover_results();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("json").join("hover_stations.json");

    let meta = Metadata {
        case: &case.name,
        diameter_m: case.rotor.diameter(),
        blades: case.rotor.blades(),
        stations: case.rotor.len(),
    };
    distributions::write_sidecar(&path, &meta, &results).expect("sidecar");

    let json: Value = serde_json::from_reader(File::open(&path).expect("open")).expect("json");
    assert_eq!(json["case"], "graupner_6x3_hover");
    assert_eq!(json["blades"], 2);
    assert_eq!(json["stations"], 25);
    assert!(json["generated_at"].as_str().expect("timestamp").ends_with('Z'));

    let points = json["points"].as_array().expect("points");
    assert_eq!(points.len(), 4);
    let hover = &points[0];
    assert_eq!(hover["converged"], true);
    assert_eq!(hover["quadrature"], "panel");
    let thrust = hover["thrust_n"].as_f64().expect("thrust");
    assert!((thrust - results[0].thrust_n).abs() < 1e-12);

    let stations = hover["stations"].as_array().expect("stations");
    assert_eq!(stations.len(), 25);
    for key in ["radius_m", "circulation_m2_s", "alpha_rad", "dt_dr", "dq_dr", "residual"] {
        assert!(stations[0].get(key).is_some(), "station field {key}");
    }
    assert!(fs::metadata(&path).expect("metadata").len() > 0);
}
