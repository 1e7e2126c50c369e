use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use hl_results::{
    ResultsError, RunManifest, RunStore, compute_loop_metrics, compute_run_id, export_csv_string,
    records_from_sim, sim_from_records,
};
use hl_sim::{SimConfig, run_sim};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn short_run() -> SimConfig {
    SimConfig {
        total_duration: 5.0,
        ..SimConfig::default()
    }
}

#[test]
fn save_list_load_roundtrip() {
    let root = unique_temp_dir("hl_results_store");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    let cfg = short_run();
    let sim = run_sim(&cfg).expect("simulation failed");
    let run_id = compute_run_id(&cfg).expect("failed to hash config");
    let manifest = RunManifest::new(run_id.clone(), cfg.clone(), &sim);

    assert!(!store.has_run(&run_id));
    store
        .save_run(&manifest, &records_from_sim(&sim))
        .expect("failed to save run");
    assert!(store.has_run(&run_id));

    let runs = store.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, run_id);

    let loaded_manifest = store.load_manifest(&run_id).expect("failed to load manifest");
    assert_eq!(loaded_manifest.config, cfg);
    assert_eq!(loaded_manifest.steps, 50);

    let loaded = store
        .load_timeseries(&run_id)
        .expect("failed to load records");
    assert_eq!(sim_from_records(&loaded), sim);

    store.delete_run(&run_id).expect("failed to delete run");
    assert!(!store.has_run(&run_id));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_run_is_reported() {
    let root = unique_temp_dir("hl_results_missing");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    match store.load_manifest("nope") {
        Err(ResultsError::RunNotFound { run_id }) => assert_eq!(run_id, "nope"),
        other => panic!("expected RunNotFound, got {other:?}"),
    }
    assert!(store.load_timeseries("nope").is_err());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn csv_export_of_real_run() {
    let sim = run_sim(&short_run()).expect("simulation failed");
    let csv = export_csv_string(&records_from_sim(&sim)).expect("export failed");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), sim.len() + 1);
    assert!(lines[1].starts_with("0,"));
    assert!(lines[1].ends_with(",100,80"));
}

#[test]
fn kettle_metrics_are_sane() {
    let cfg = SimConfig::default();
    let sim = run_sim(&cfg).expect("simulation failed");
    let m = compute_loop_metrics(&sim, &cfg);

    assert!(m.steady_state_error.unwrap().abs() <= 2.0);
    assert!(m.peak_temperature.unwrap() <= 85.0);
    assert!(m.rise_time_s.unwrap() > 0.0);
    let settle = m.settling_time_s.unwrap();
    assert!(settle > 0.0 && settle < cfg.total_duration);
    assert!(m.saturation_pct_upper.unwrap() > 0.0);
}

#[test]
fn cached_series_are_bit_identical() {
    let root = unique_temp_dir("hl_results_bits");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    let cfg = SimConfig {
        total_duration: 10.0,
        ..SimConfig::default()
    };
    let sim = run_sim(&cfg).expect("simulation failed");
    let run_id = compute_run_id(&cfg).expect("failed to hash config");
    store
        .save_run(
            &RunManifest::new(run_id.clone(), cfg, &sim),
            &records_from_sim(&sim),
        )
        .expect("failed to save run");

    let cached = sim_from_records(&store.load_timeseries(&run_id).expect("failed to load"));
    let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&cached.times), bits(&sim.times));
    assert_eq!(bits(&cached.temperatures), bits(&sim.temperatures));
    assert_eq!(bits(&cached.powers), bits(&sim.powers));

    let _ = fs::remove_dir_all(root);
}
