// crates/liars-dice-harness/src/report.rs
// ============================================================================
// Module: Run Reports
// Description: Report artifacts for a suite run.
// Purpose: Write canonical JSON and Markdown summaries plus the transcript.
// Dependencies: serde, serde_jcs, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`TestReporter`] owns an output directory and writes three artifacts when
//! a run finishes:
//! - `report.json`: canonical (JCS) run summary with every case outcome.
//! - `summary.md`: the same summary for humans.
//! - `transcript.json`: every recorded request/response exchange.
//!
//! A reporter dropped before [`TestReporter::finish`] still writes a summary
//! whose status is `panic` or `unknown`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;

use crate::client::TranscriptEntry;
use crate::suite::CaseOutcome;
use crate::suite::CaseReport;
use crate::suite::SuiteReport;

/// Canonical run summary file name.
pub const REPORT_FILE: &str = "report.json";
/// Markdown summary file name.
pub const SUMMARY_FILE: &str = "summary.md";
/// Transcript file name.
pub const TRANSCRIPT_FILE: &str = "transcript.json";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while writing report artifacts.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A file or directory could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A value could not be serialized.
    #[error("failed to serialize {name}: {reason}")]
    Serialize {
        /// Artifact name.
        name: String,
        /// Serializer error.
        reason: String,
    },
}

// ============================================================================
// SECTION: Summary Model
// ============================================================================

/// Serialized run summary.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    run_name: &'a str,
    status: &'a str,
    server: Option<&'a str>,
    started_at_ms: u128,
    ended_at_ms: u128,
    duration_ms: u128,
    passed: usize,
    failed: usize,
    skipped: usize,
    notes: Vec<String>,
    cases: &'a [CaseReport],
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact writer rooted at one output directory.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    /// Output directory.
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ReportError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
        })
    }

    /// Returns the output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, ReportError> {
        let bytes = serde_jcs::to_vec(value).map_err(|err| ReportError::Serialize {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
        self.write_bytes(name, &bytes)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> Result<PathBuf, ReportError> {
        self.write_bytes(name, value.as_bytes())
    }

    fn write_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let path = self.root.join(name);
        fs::write(&path, bytes).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Writes run summaries, even when the run is abandoned.
pub struct TestReporter {
    artifacts: TestArtifacts,
    run_name: String,
    started_at_ms: u128,
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter writing into `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>, run_name: &str) -> Result<Self, ReportError> {
        Ok(Self {
            artifacts: TestArtifacts::new(root)?,
            run_name: run_name.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact writer.
    #[must_use]
    pub const fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes the report, summary, and transcript for a finished run.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when any artifact cannot be written.
    pub fn finish(
        &mut self,
        report: &SuiteReport,
        transcript: &[TranscriptEntry],
    ) -> Result<Vec<PathBuf>, ReportError> {
        let status = if report.success() { "passed" } else { "failed" };
        let summary = RunSummary {
            run_name: &self.run_name,
            status,
            server: Some(&report.server),
            started_at_ms: report.started_at_ms,
            ended_at_ms: report.started_at_ms.saturating_add(u128::from(report.duration_ms)),
            duration_ms: u128::from(report.duration_ms),
            passed: report.passed(),
            failed: report.failed(),
            skipped: report.skipped(),
            notes: Vec::new(),
            cases: &report.cases,
        };
        let written = vec![
            self.artifacts.write_json(REPORT_FILE, &summary)?,
            self.artifacts.write_text(SUMMARY_FILE, &summary_markdown(&summary))?,
            self.artifacts.write_json(TRANSCRIPT_FILE, &transcript)?,
        ];
        self.finalized = true;
        Ok(written)
    }

    /// Writes a summary with no cases.
    fn finish_abandoned(&mut self, status: &str) -> Result<(), ReportError> {
        let ended_at_ms = now_millis();
        let summary = RunSummary {
            run_name: &self.run_name,
            status,
            server: None,
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            passed: 0,
            failed: 0,
            skipped: 0,
            notes: vec!["run terminated without explicit summary".to_string()],
            cases: &[],
        };
        self.artifacts.write_json(REPORT_FILE, &summary)?;
        self.artifacts.write_text(SUMMARY_FILE, &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish_abandoned(status);
    }
}

// ============================================================================
// SECTION: Markdown
// ============================================================================

fn summary_markdown(summary: &RunSummary<'_>) -> String {
    let mut out = String::new();
    out.push_str("# Liar's Dice Test Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Run: {}", summary.run_name);
    let _ = writeln!(out, "- Server: {}", summary.server.unwrap_or("n/a"));
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(
        out,
        "- Cases: {} passed, {} failed, {} skipped",
        summary.passed, summary.failed, summary.skipped
    );
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    if !summary.notes.is_empty() {
        out.push_str("\n## Notes\n\n");
        for note in &summary.notes {
            let _ = writeln!(out, "- {note}");
        }
    }
    out.push_str("\n## Cases\n\n");
    if summary.cases.is_empty() {
        out.push_str("- None\n");
    }
    for case in summary.cases {
        match &case.outcome {
            CaseOutcome::Passed => {
                let _ = writeln!(out, "- PASS `{}` ({} ms)", case.name, case.duration_ms);
            }
            CaseOutcome::Skipped(reason) => {
                let _ = writeln!(out, "- SKIP `{}`: {reason}", case.name);
            }
            CaseOutcome::Failed(message) => {
                let _ = writeln!(out, "- FAIL `{}` ({} ms)", case.name, case.duration_ms);
                out.push_str("\n```text\n");
                out.push_str(message);
                out.push_str("\n```\n\n");
            }
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
