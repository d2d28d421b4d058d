use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ExportError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExportSeverity {
    /// The sheet or workbook could not be processed.
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl ExportSeverity {
    /// Severity for an error raised while loading or exporting.
    pub fn for_error(e: &ExportError) -> Self {
        match e {
            ExportError::Io(_) => ExportSeverity::Critical,
            // calamine wraps I/O failures in format-specific errors.
            ExportError::Excel(err) if error_chain_contains_io(err) => ExportSeverity::Critical,
            ExportError::Excel(_) | ExportError::Json(_) | ExportError::UnsupportedFormat { .. } => {
                ExportSeverity::Error
            }
            ExportError::HeaderPromotion { .. } => ExportSeverity::Error,
        }
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// Context about a workbook or sheet being processed.
#[derive(Debug, Clone)]
pub struct ExportContext {
    /// The workbook path.
    pub workbook: PathBuf,
    /// The sheet, or `None` for workbook-level events.
    pub sheet: Option<String>,
}

impl ExportContext {
    fn sheet_label(&self) -> &str {
        self.sheet.as_deref().unwrap_or("-")
    }
}

/// Minimal stats reported on a successful sheet export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    /// Number of exported records.
    pub rows: usize,
    /// Number of columns (keys per record).
    pub columns: usize,
    /// Whether the header row was promoted.
    pub promoted: bool,
}

/// Observer interface for export outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ExportObserver: Send + Sync {
    /// Called when a sheet is exported.
    fn on_success(&self, _ctx: &ExportContext, _stats: ExportStats) {}

    /// Called when a sheet or the whole workbook fails.
    fn on_failure(&self, _ctx: &ExportContext, _severity: ExportSeverity, _error: &ExportError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ExportContext, severity: ExportSeverity, error: &ExportError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ExportObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ExportObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ExportObserver for CompositeObserver {
    fn on_success(&self, ctx: &ExportContext, stats: ExportStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ExportContext, severity: ExportSeverity, error: &ExportError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ExportContext, severity: ExportSeverity, error: &ExportError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// How an event is labelled in log lines.
#[derive(Debug, Clone, Copy)]
enum EventKind {
    Ok,
    Fail,
    Alert,
}

impl EventKind {
    fn tag(self) -> &'static str {
        match self {
            EventKind::Ok => "ok",
            EventKind::Fail => "fail",
            EventKind::Alert => "ALERT",
        }
    }
}

fn success_line(ctx: &ExportContext, stats: ExportStats) -> String {
    format!(
        "{} workbook={} sheet={} rows={} columns={} promoted={}",
        EventKind::Ok.tag(),
        ctx.workbook.display(),
        ctx.sheet_label(),
        stats.rows,
        stats.columns,
        stats.promoted
    )
}

fn failure_line(
    kind: EventKind,
    ctx: &ExportContext,
    severity: ExportSeverity,
    error: &ExportError,
) -> String {
    format!(
        "{} severity={:?} workbook={} sheet={} err={}",
        kind.tag(),
        severity,
        ctx.workbook.display(),
        ctx.sheet_label(),
        error
    )
}

/// Logs export events to stderr, one `[export] ...` line per event.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ExportObserver for StdErrObserver {
    fn on_success(&self, ctx: &ExportContext, stats: ExportStats) {
        eprintln!("[export] {}", success_line(ctx, stats));
    }

    fn on_failure(&self, ctx: &ExportContext, severity: ExportSeverity, error: &ExportError) {
        eprintln!("[export] {}", failure_line(EventKind::Fail, ctx, severity, error));
    }

    fn on_alert(&self, ctx: &ExportContext, severity: ExportSeverity, error: &ExportError) {
        eprintln!("[export] {}", failure_line(EventKind::Alert, ctx, severity, error));
    }
}

/// Appends timestamped export events to a log file.
///
/// Writes are best-effort: a log file that cannot be opened or written never fails a run.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Log to `path`, creating it on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, line: String) {
        let _guard = self.lock.lock().ok();
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{secs} {line}");
        }
    }
}

impl ExportObserver for FileObserver {
    fn on_success(&self, ctx: &ExportContext, stats: ExportStats) {
        self.append(success_line(ctx, stats));
    }

    fn on_failure(&self, ctx: &ExportContext, severity: ExportSeverity, error: &ExportError) {
        self.append(failure_line(EventKind::Fail, ctx, severity, error));
    }

    fn on_alert(&self, ctx: &ExportContext, severity: ExportSeverity, error: &ExportError) {
        self.append(failure_line(EventKind::Alert, ctx, severity, error));
    }
}
