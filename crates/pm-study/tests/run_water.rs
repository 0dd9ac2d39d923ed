//! Runs studies against the CoolProp water provider.

use pm_fluids::{CoolPropProvider, Substance};
use pm_study::{JobStatus, StudyError, parse_yaml, run_study};

const STUDY: &str = r#"
name: regions
substance: water
jobs:
  - id: liquid
    type: state
    temperature: 25C
    specific_volume: 0.001001 m3/kg
  - id: wet
    type: state
    temperature: 50C
    specific_volume: 10 m3/kg
  - id: too_hot
    type: saturation
    pressure: 30 MPa
  - id: sat
    type: saturation
    pressure: 1 MPa
  - id: heat
    type: isobar
    pressure: 101.325 kPa
    temperature:
      start: 350 K
      end: 400 K
      points: 11
  - id: boil
    type: process
    process: isobaric
    hold: 1 MPa
    start: 0.0011 m3/kg
    end: 0.3 m3/kg
    points: 30
"#;

#[test]
fn failing_job_does_not_stop_the_rest() {
    let study = parse_yaml(STUDY).unwrap();
    let mut provider = CoolPropProvider::new(Substance::Water).unwrap();
    let run = run_study(&study, &mut provider).unwrap();

    assert_eq!(run.reports.len(), 6);
    assert_eq!(run.num_failed_jobs(), 1);
    assert_eq!(run.reports[2].id, "too_hot");
    assert_eq!(run.reports[2].status, JobStatus::Failed);
    assert!(run.reports[3..].iter().all(|r| r.status == JobStatus::Ok));

    assert!(run.reports[0].summary.contains("compressed liquid"));
    assert!(run.reports[1].summary.contains("saturated mixture"));
    assert!(run.reports[5].summary.contains("compressed liquid -> saturated mixture"));

    let sat = run.table("sat").unwrap();
    let v_g = sat.column("v_g_m3_kg").unwrap()[0];
    assert!((v_g - 0.1944).abs() < 2e-3);

    let heat = run.table("heat").unwrap();
    assert_eq!(heat.len(), 11);
}

#[test]
fn outputs_are_written() {
    let study = parse_yaml(STUDY).unwrap();
    let mut provider = CoolPropProvider::new(Substance::Water).unwrap();
    let run = run_study(&study, &mut provider).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let written = run.write_outputs(dir.path()).unwrap();
    assert_eq!(written.len(), run.tables.len() + 1);
    let report = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
    assert!(report.contains("\"status\": \"failed\""));
    assert!(dir.path().join("boil.csv").exists());
}

#[test]
fn provider_must_match_study() {
    let study = parse_yaml("name: n2\nsubstance: nitrogen\n").unwrap();
    let mut provider = CoolPropProvider::new(Substance::Water).unwrap();
    let err = run_study(&study, &mut provider).unwrap_err();
    assert!(matches!(err, StudyError::SubstanceMismatch { .. }));
}
