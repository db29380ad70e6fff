use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ErrorCategory, StepError};

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    SoftFailed,
    Skipped,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub name: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

/// Overall status of one scenario run. `Skipped` marks an environmental
/// short-circuit (e.g. rate limiting): a success-class outcome, never
/// reported like a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    Skipped,
    Failed,
}

impl RunStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, RunStatus::Failed)
    }
}

/// Ordered, append-only record of one scenario run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub status: RunStatus,
    pub records: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal_category: Option<ErrorCategory>,
}

impl RunReport {
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            status: RunStatus::Passed,
            records: Vec::new(),
            fatal_category: None,
        }
    }

    fn push(&mut self, name: &str, status: StepStatus, detail: Option<String>) -> &mut StepRecord {
        let index = self.records.len();
        self.records.push(StepRecord {
            index,
            name: name.to_string(),
            status,
            detail,
            captured: None,
            artifact: None,
        });
        self.records.last_mut().unwrap()
    }

    pub fn record_passed(
        &mut self,
        name: &str,
        captured: Option<String>,
        artifact: Option<PathBuf>,
    ) {
        let record = self.push(name, StepStatus::Passed, None);
        record.captured = captured;
        record.artifact = artifact;
    }

    pub fn record_soft_failure(&mut self, name: &str, err: &StepError) {
        self.push(name, StepStatus::SoftFailed, Some(err.to_string()));
    }

    pub fn record_skipped(&mut self, name: &str, reason: &str) {
        self.push(name, StepStatus::Skipped, Some(reason.to_string()));
    }

    /// Record a fatal step. The caller stops executing; nothing may be
    /// appended after this.
    pub fn record_fatal(&mut self, name: &str, err: &StepError) {
        self.push(name, StepStatus::Failed, Some(err.to_string()));
        self.fatal_category = Some(err.category());
        self.status = RunStatus::Failed;
    }

    /// Mark the run as environmentally skipped. Does not override a
    /// fatal status.
    pub fn mark_environmental_skip(&mut self) {
        if self.status != RunStatus::Failed {
            self.status = RunStatus::Skipped;
        }
    }

    pub fn fatal_detail(&self) -> Option<&str> {
        self.records
            .iter()
            .rev()
            .find(|r| r.status == StepStatus::Failed)
            .and_then(|r| r.detail.as_deref())
    }
}

/// Ordered remediation hints per failure class. Every fatal failure is
/// accompanied by at least one of these.
pub fn remediation_hints(category: ErrorCategory) -> &'static [&'static str] {
    match category {
        ErrorCategory::Connection => &[
            "check that the browser pool is up: kubectl get pods -n browser-pool",
            "check that the port-forward is active: kubectl port-forward -n browser-pool service/browser-pool 3000:3000",
            "print the endpoint the harness resolved: echo $BROWSER_SMOKE_WS_ENDPOINT",
        ],
        ErrorCategory::Session => &[
            "a page was requested after the session closed; close pages before the session, never after",
        ],
        ErrorCategory::Selector => &[
            "the page markup may have changed; compare the selector against the live page",
            "third-party pages move fast; update the scenario's selectors to match",
        ],
        ErrorCategory::Timeout => &[
            "the remote page may load slowly from the pool's network; raise the step timeout",
            "check the pool's egress connectivity to the target site",
        ],
        ErrorCategory::Assertion => &[
            "inspect the captured text and artifacts from this run",
            "run the same flow manually against the target site to see what changed",
        ],
        ErrorCategory::Artifact => &[
            "check that the artifacts directory exists and is writable",
            "pass --artifacts-dir to write somewhere else",
        ],
        ErrorCategory::Transport => &[
            "the session dropped mid-run; check the pool's logs for crashed browser instances",
            "re-run the check; the harness performs no automatic retry",
        ],
    }
}

/// Writes run outcomes for humans: step summaries on stdout, failures
/// with remediation guidance on stderr.
pub struct DiagnosticsReporter;

impl DiagnosticsReporter {
    pub fn print_summary(report: &RunReport) {
        let status = match report.status {
            RunStatus::Passed => "passed",
            RunStatus::Skipped => "skipped",
            RunStatus::Failed => "FAILED",
        };
        println!("\n{} — {}", report.scenario, status);
        for record in &report.records {
            let glyph = match record.status {
                StepStatus::Passed => " ok ",
                StepStatus::SoftFailed => "soft",
                StepStatus::Skipped => "skip",
                StepStatus::Failed => "FAIL",
            };
            println!("  [{glyph}] {}", record.name);
            if let Some(detail) = &record.detail {
                println!("         {detail}");
            }
            if let Some(captured) = &record.captured {
                println!("         captured: {captured}");
            }
            if let Some(artifact) = &record.artifact {
                println!("         artifact: {}", artifact.display());
            }
        }
    }

    /// Report a run that ended with a fatal step.
    pub fn print_failure(report: &RunReport) {
        eprintln!(
            "\nscenario {} failed: {}",
            report.scenario,
            report.fatal_detail().unwrap_or("unknown error")
        );
        if let Some(category) = report.fatal_category {
            Self::print_hints(category);
        }
    }

    /// Report an error that escaped before or between scenario runs
    /// (connect failures, page allocation, teardown).
    pub fn print_fatal(err: &StepError) {
        eprintln!("\nfatal: {err}");
        Self::print_hints(err.category());
    }

    fn print_hints(category: ErrorCategory) {
        eprintln!("\ntroubleshooting:");
        for (i, hint) in remediation_hints(category).iter().enumerate() {
            eprintln!("  {}. {}", i + 1, hint);
        }
    }
}
