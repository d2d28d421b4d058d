use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use workbook_export::normalize::DEFAULT_PLACEHOLDER_TITLE;
use workbook_export::observability::{
    CompositeObserver, ExportContext, ExportObserver, ExportSeverity, ExportStats, FileObserver,
};
use workbook_export::pipeline::{run, ExportOptions};
use workbook_export::ExportError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, ExportStats)>>,
    failures: Mutex<Vec<(Option<String>, ExportSeverity)>>,
    alerts: Mutex<Vec<ExportSeverity>>,
}

impl ExportObserver for RecordingObserver {
    fn on_success(&self, ctx: &ExportContext, stats: ExportStats) {
        let sheet = ctx.sheet.clone().unwrap_or_default();
        self.successes.lock().unwrap().push((sheet, stats));
    }

    fn on_failure(&self, ctx: &ExportContext, severity: ExportSeverity, _error: &ExportError) {
        self.failures.lock().unwrap().push((ctx.sheet.clone(), severity));
    }

    fn on_alert(&self, _ctx: &ExportContext, severity: ExportSeverity, _error: &ExportError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("workbook-export-obs-{name}-{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// "Titled" needs promotion but its header row has an empty cell; "Plain" is fine.
fn write_workbook(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let titled = wb.add_worksheet();
    titled.set_name("Titled").unwrap();
    titled.write_string(0, 0, DEFAULT_PLACEHOLDER_TITLE).unwrap();
    titled.write_string(1, 0, "Department").unwrap();
    titled.write_string(2, 0, "HR").unwrap();
    titled.write_string(2, 1, "x").unwrap();

    let plain = wb.add_worksheet();
    plain.set_name("Plain").unwrap();
    plain.write_string(0, 0, "Department").unwrap();
    plain.write_string(0, 1, "Job Role").unwrap();
    plain.write_string(1, 0, "HR").unwrap();
    plain.write_string(1, 1, "Recruiter").unwrap();
    plain.write_string(2, 0, "IT").unwrap();
    plain.write_string(2, 1, "Support").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn observer_sees_success_and_sheet_failure_without_alert() {
    let dir = tmp_dir("mixed");
    let input = dir.join("book.xlsx");
    write_workbook(&input);

    let obs = Arc::new(RecordingObserver::default());
    let opts = ExportOptions {
        input,
        output_dir: dir.join("out"),
        observer: Some(obs.clone()),
        alert_at_or_above: ExportSeverity::Critical,
        ..Default::default()
    };

    let summary = run(&opts, Vec::new()).unwrap();
    assert_eq!(summary.failed().count(), 1);

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![(
            "Plain".to_string(),
            ExportStats {
                rows: 2,
                columns: 2,
                promoted: false
            }
        )]
    );

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![(Some("Titled".to_string()), ExportSeverity::Error)]);
    assert!(obs.alerts.lock().unwrap().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_workbook_raises_critical_alert() {
    let dir = tmp_dir("missing");
    let obs = Arc::new(RecordingObserver::default());
    let opts = ExportOptions {
        input: dir.join("nope.xlsx"),
        output_dir: dir.join("out"),
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let _ = run(&opts, Vec::new()).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![(None, ExportSeverity::Critical)]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![ExportSeverity::Critical]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn composite_fans_out_to_file_log() {
    let dir = tmp_dir("file-log");
    let input = dir.join("book.xlsx");
    write_workbook(&input);
    let log = dir.join("export.log");

    let recorder = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn ExportObserver>> =
        vec![recorder.clone(), Arc::new(FileObserver::new(&log))];
    let composite = CompositeObserver::new(observers);
    let opts = ExportOptions {
        input,
        output_dir: dir.join("out"),
        observer: Some(Arc::new(composite)),
        alert_at_or_above: ExportSeverity::Error,
        ..Default::default()
    };

    run(&opts, Vec::new()).unwrap();

    assert_eq!(recorder.successes.lock().unwrap().len(), 1);
    assert_eq!(*recorder.alerts.lock().unwrap(), vec![ExportSeverity::Error]);

    let text = fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("fail severity=Error"));
    assert!(lines[0].contains("sheet=Titled"));
    assert!(lines[1].contains("ALERT severity=Error"));
    assert!(lines[2].contains(" ok "));
    assert!(lines[2].contains("sheet=Plain rows=2 columns=2 promoted=false"));

    let _ = fs::remove_dir_all(&dir);
}
