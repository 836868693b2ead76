use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use material_catalog::ingestion::{
    CatalogEvent, CatalogObserver, DiagnosticLevel, LoaderOptions, MaterialLoader, MemorySheet, MemoryWorkbook,
    MemoryWorkbookReader,
};

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<(DiagnosticLevel, &'static str)>>,
    alerts: Mutex<Vec<(DiagnosticLevel, &'static str)>>,
}

impl RecordingObserver {
    fn kinds_at(&self, level: DiagnosticLevel) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, k)| *k)
            .collect()
    }
}

impl CatalogObserver for RecordingObserver {
    fn on_event(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        self.events.lock().unwrap().push((level, event.kind()));
    }

    fn on_alert(&self, level: DiagnosticLevel, event: &CatalogEvent<'_>) {
        self.alerts.lock().unwrap().push((level, event.kind()));
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("material-catalog-obs-{name}-{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn mixed_reader() -> MemoryWorkbookReader {
    MemoryWorkbookReader::new()
        .with_workbook(
            "BLE_MATERIALS.xlsx",
            MemoryWorkbook::new().with_sheet(
                MemorySheet::new("Concrete", ["Code", "Name", "Density"])
                    .with_row(["CONC-001", "C30", "2400"])
                    .with_row(["CONC-002", "C35", "dense"])
                    .with_row(["", "Unnamed", "2300"]),
            ),
        )
        .with_corrupt("MEP_MATERIALS.xlsx")
}

#[test]
fn observer_sees_each_tolerated_failure() {
    init_tracing();
    let dir = tmp_dir("mixed");
    fs::write(dir.join("BLE_MATERIALS.xlsx"), b"").unwrap();
    fs::write(dir.join("MEP_MATERIALS.xlsx"), b"").unwrap();

    let obs = Arc::new(RecordingObserver::default());
    let load = MaterialLoader::with_reader(&dir, LoaderOptions::default(), mixed_reader())
        .unwrap()
        .with_observer(obs.clone())
        .load_all()
        .unwrap();

    assert_eq!(load.records.len(), 1);
    assert_eq!(obs.kinds_at(DiagnosticLevel::Error), vec!["file_skipped"]);
    assert_eq!(
        obs.kinds_at(DiagnosticLevel::Warning),
        vec!["row_skipped", "record_rejected", "validation_finished"]
    );
    assert_eq!(obs.kinds_at(DiagnosticLevel::Info), vec!["run_started", "run_finished"]);

    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(alerts, vec![(DiagnosticLevel::Error, "file_skipped")]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn alert_threshold_is_configurable() {
    let dir = tmp_dir("threshold");
    fs::write(dir.join("BLE_MATERIALS.xlsx"), b"").unwrap();
    fs::write(dir.join("MEP_MATERIALS.xlsx"), b"").unwrap();

    let obs = Arc::new(RecordingObserver::default());
    MaterialLoader::with_reader(&dir, LoaderOptions::default(), mixed_reader())
        .unwrap()
        .with_observer(obs.clone())
        .with_alert_threshold(DiagnosticLevel::Warning)
        .load_all()
        .unwrap();

    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(alerts.len(), 4);
    assert!(alerts.iter().all(|(level, _)| *level >= DiagnosticLevel::Warning));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn strict_run_reports_failure_before_returning() {
    let dir = tmp_dir("strict");
    fs::write(dir.join("MEP_MATERIALS.xlsx"), b"").unwrap();

    let obs = Arc::new(RecordingObserver::default());
    let opts = LoaderOptions {
        continue_on_error: false,
        ..Default::default()
    };
    let _ = MaterialLoader::with_reader(&dir, opts, mixed_reader())
        .unwrap()
        .with_observer(obs.clone())
        .load_all()
        .unwrap_err();

    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(alerts, vec![(DiagnosticLevel::Error, "run_failed")]);
    assert!(obs.kinds_at(DiagnosticLevel::Info).contains(&"run_started"));
}

#[test]
fn empty_directory_warns_about_missing_sources() {
    let dir = tmp_dir("none");

    let obs = Arc::new(RecordingObserver::default());
    let load = MaterialLoader::with_reader(&dir, LoaderOptions::default(), MemoryWorkbookReader::new())
        .unwrap()
        .with_observer(obs.clone())
        .load_all()
        .unwrap();

    assert!(load.records.is_empty());
    assert!(obs.kinds_at(DiagnosticLevel::Warning).contains(&"no_sources_found"));

    let _ = fs::remove_dir_all(&dir);
}
