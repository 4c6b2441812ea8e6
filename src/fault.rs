//! Fault aggregation.
//!
//! Three nested boundaries (file, class, declaration) catch failures,
//! log them with the breadcrumb trail accumulated so far, and let the
//! batch resume with the next sibling unit. Nothing is swallowed without
//! a breadcrumb; nothing below the top level aborts the run.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;

use chrono::Local;

/// File name of the persistent fault log, created beside the executable.
pub const FAULT_LOG_NAME: &str = "callscan-faults.log";

/// Context labels accumulated outward-in while analyzing: a
/// declaration-level failure still names its class and file.
#[derive(Debug, Clone, Default)]
pub struct Breadcrumbs {
    pub file: Option<String>,
    pub namespace: Option<String>,
    pub class: Option<String>,
    pub method: Option<String>,
}

impl Breadcrumbs {
    pub fn for_file(path: impl Into<String>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// `[AnalyzingSourceFile: x,AnalyzingNamespace: y,...]` with only the
    /// levels known so far.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if let Some(file) = &self.file {
            parts.push(format!("AnalyzingSourceFile: {}", file));
        }
        if let Some(namespace) = &self.namespace {
            parts.push(format!("AnalyzingNamespace: {}", namespace));
        }
        if let Some(class) = &self.class {
            parts.push(format!("AnalyzingClass: {}", class));
        }
        if let Some(method) = &self.method {
            parts.push(format!("AnalyzingMethod: {}", method));
        }
        format!("[{}]", parts.join(","))
    }
}

/// Append-only fault log plus stderr echo.
pub struct FaultLog {
    path: PathBuf,
}

impl FaultLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: beside the running executable, falling back to
    /// the working directory when the executable path is unavailable.
    pub fn beside_executable() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(FAULT_LOG_NAME))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Record one caught failure: echo the report to stderr and append a
    /// separator-delimited entry to the log. Logging problems themselves
    /// must never take the batch down, so write errors only warn.
    pub fn record(&self, breadcrumbs: &Breadcrumbs, error: &anyhow::Error) {
        let report = render_report(breadcrumbs, error);
        eprintln!("{}", report);

        if let Err(write_error) = self.append(&report) {
            eprintln!(
                "Warning: could not write fault log {}: {}",
                self.path.display(),
                write_error
            );
        }
    }

    fn append(&self, report: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "========================================")?;
        writeln!(file, "{}", report)?;
        writeln!(file)?;
        Ok(())
    }
}

fn render_report(breadcrumbs: &Breadcrumbs, error: &anyhow::Error) -> String {
    let now = Local::now();
    let mut report = String::new();
    let _ = writeln!(report, "Date: {}", now.format("%Y/%m/%d"));
    let _ = writeln!(report, "Time: {}", now.format("%H:%M:%S"));
    let _ = writeln!(report, "Details:");
    let _ = writeln!(report, "{}", breadcrumbs.render());
    for (depth, cause) in error.chain().enumerate() {
        if depth == 0 {
            let _ = writeln!(report, "{}", cause);
        } else {
            let _ = writeln!(report, "caused by: {}", cause);
        }
    }
    report.trim_end().to_string()
}

/// Run one unit of work inside a fault boundary.
///
/// On failure the error is logged with the given breadcrumbs and `None` is
/// returned, so the caller resumes with the next sibling unit. Used at
/// file, class and declaration granularity.
pub fn guard<T>(
    log: &FaultLog,
    breadcrumbs: &Breadcrumbs,
    work: impl FnOnce() -> anyhow::Result<T>,
) -> Option<T> {
    match work() {
        Ok(value) => Some(value),
        Err(error) => {
            log.record(breadcrumbs, &error);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    fn temp_log() -> (tempfile::TempDir, FaultLog) {
        let dir = tempfile::TempDir::new().unwrap();
        let log = FaultLog::new(dir.path().join(FAULT_LOG_NAME));
        (dir, log)
    }

    #[test]
    fn breadcrumbs_accumulate_outward_in() {
        let crumbs = Breadcrumbs::for_file("a.cs")
            .with_namespace("N")
            .with_class("C")
            .with_method("M");
        assert_eq!(
            crumbs.render(),
            "[AnalyzingSourceFile: a.cs,AnalyzingNamespace: N,AnalyzingClass: C,AnalyzingMethod: M]"
        );
    }

    #[test]
    fn partial_breadcrumbs_render_known_levels_only() {
        let crumbs = Breadcrumbs::for_file("a.cs");
        assert_eq!(crumbs.render(), "[AnalyzingSourceFile: a.cs]");
    }

    #[test]
    fn guard_returns_value_on_success() {
        let (_dir, log) = temp_log();
        let result = guard(&log, &Breadcrumbs::default(), || Ok(7));
        assert_eq!(result, Some(7));
    }

    #[test]
    fn guard_logs_and_continues_on_failure() {
        let (_dir, log) = temp_log();
        let crumbs = Breadcrumbs::for_file("bad.cs").with_class("C");

        let result: Option<()> = guard(&log, &crumbs, || {
            Err(anyhow!("inner cause").context("outer context"))
        });
        assert!(result.is_none());

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(contents.starts_with("========================================"));
        assert!(contents.contains("AnalyzingSourceFile: bad.cs"));
        assert!(contents.contains("AnalyzingClass: C"));
        assert!(contents.contains("outer context"));
        assert!(contents.contains("caused by: inner cause"));
        assert!(contents.ends_with("\n\n"));
    }

    #[test]
    fn entries_append_rather_than_truncate() {
        let (_dir, log) = temp_log();
        let _: Option<()> = guard(&log, &Breadcrumbs::default(), || Err(anyhow!("first")));
        let _: Option<()> = guard(&log, &Breadcrumbs::default(), || Err(anyhow!("second")));

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents
                .matches("========================================\n")
                .count(),
            2
        );
        assert!(contents.contains("first"));
        assert!(contents.contains("second"));
    }
}
