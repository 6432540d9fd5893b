//! Analyzer facade — public API consumed by the host.
//!
//! The host feeds editor-style events through this single type. It gates
//! each request through the [`FileTracker`], spawns the checker task for
//! accepted runs, and publishes completed outcomes into the diagnostics
//! store, discarding stale runs.
//!
//! A run is stamped at commit time, before the external calls are issued.
//! Runs for the same file may overlap; publication compares the run's
//! stamp against the file's current stamp so a slow-finishing older run
//! never overwrites a newer run's diagnostics.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::lint::LintRunner;
use crate::merge::merge;
use crate::store::DiagnosticsStore;
use crate::syntax::{SyntaxChecker, SyntaxOutcome};
use crate::tracker::{FileTracker, RunStamp};
use crate::types::{
    AnalysisConfig, AnalysisTrigger, Diagnostic, DiagnosticsSnapshot, is_blade_path,
    is_tracked_path,
};

/// Channel capacity for run outcomes between checker tasks and the analyzer.
const OUTCOME_CHANNEL_CAPACITY: usize = 256;

/// A completed run, ready for publication.
#[derive(Debug)]
pub(crate) struct RunOutcome {
    path: PathBuf,
    stamp: RunStamp,
    diagnostics: Vec<Diagnostic>,
}

/// Execute the external checks for one accepted run and merge the results.
///
/// The lint check and the (blade-only) syntax check are independent and
/// run concurrently; the plain-mode probe follows only when the JSON-mode
/// lint result carries no signal. Checker failures have already degraded
/// to absent inputs by the time merging happens.
pub(crate) async fn execute_run(
    lint: LintRunner,
    syntax: SyntaxChecker,
    path: PathBuf,
    workspace_root: Option<PathBuf>,
    timeout: Option<Duration>,
    run_syntax: bool,
) -> Vec<Diagnostic> {
    let root = workspace_root.as_deref();

    let lint_check = lint.check_json(&path, root, timeout);
    let syntax_check = async {
        if run_syntax {
            syntax.check(&path, root, timeout).await
        } else {
            SyntaxOutcome::Unavailable
        }
    };
    let (lint_outcome, syntax_outcome) = tokio::join!(lint_check, syntax_check);

    let fallback = if lint_outcome.needs_plain_probe() {
        lint.probe_plain(&path, root, timeout).await
    } else {
        None
    };

    merge(lint_outcome.issues(), fallback.as_deref(), &syntax_outcome)
}

/// Public facade for the analysis subsystem.
pub struct Analyzer {
    lint: LintRunner,
    syntax: SyntaxChecker,
    timeout: Option<Duration>,
    workspace_root: Option<PathBuf>,
    tracker: FileTracker,
    store: DiagnosticsStore,
    outcome_tx: mpsc::Sender<RunOutcome>,
    outcome_rx: mpsc::Receiver<RunOutcome>,
    /// Accepted runs whose outcomes have not been received yet.
    in_flight: usize,
}

impl Analyzer {
    #[must_use]
    pub fn new(config: AnalysisConfig, workspace_root: Option<PathBuf>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            lint: LintRunner::new(config.lint),
            syntax: SyntaxChecker::new(config.syntax),
            timeout: config.check_timeout_secs.map(Duration::from_secs),
            workspace_root,
            tracker: FileTracker::new(Duration::from_millis(config.debounce_ms)),
            store: DiagnosticsStore::new(),
            outcome_tx,
            outcome_rx,
            in_flight: 0,
        }
    }

    /// Record a text change for a file. Never gated.
    pub fn mark_modified(&mut self, path: &Path) {
        if is_tracked_path(path) {
            self.tracker.mark_modified(path);
        }
    }

    /// Request an analysis run for a file.
    ///
    /// Returns whether the run was accepted. An accepted run commits its
    /// tracking state synchronously, then performs the external checks on
    /// a background task; collect the outcome via
    /// [`poll_outcomes`](Self::poll_outcomes) or [`drain`](Self::drain).
    pub fn request(&mut self, path: &Path, trigger: AnalysisTrigger, is_dirty: bool) -> bool {
        if !is_tracked_path(path) {
            return false;
        }

        let now = Instant::now();
        if self.tracker.should_skip(path, now, trigger) {
            tracing::debug!("skipping analysis of {} ({})", path.display(), trigger.label());
            return false;
        }

        let stamp = self.tracker.commit(path, now, is_dirty);
        tracing::info!("analyzing {} ({})", path.display(), trigger.label());

        let lint = self.lint.clone();
        let syntax = self.syntax.clone();
        let timeout = self.timeout;
        let workspace_root = self.workspace_root.clone();
        let run_syntax = is_blade_path(path);
        let task_path = path.to_path_buf();
        let outcome_tx = self.outcome_tx.clone();

        self.in_flight += 1;
        tokio::spawn(async move {
            let diagnostics =
                execute_run(lint, syntax, task_path.clone(), workspace_root, timeout, run_syntax)
                    .await;
            let _ = outcome_tx
                .send(RunOutcome {
                    path: task_path,
                    stamp,
                    diagnostics,
                })
                .await;
        });

        true
    }

    /// Drain pending run outcomes, up to `budget`. Non-blocking.
    pub fn poll_outcomes(&mut self, budget: usize) -> usize {
        let mut count = 0;
        while count < budget {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    self.publish(outcome);
                    count += 1;
                }
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
        count
    }

    /// Wait for every accepted run to complete and publish.
    pub async fn drain(&mut self) {
        while self.in_flight > 0 {
            match self.outcome_rx.recv().await {
                Some(outcome) => self.publish(outcome),
                None => break,
            }
        }
    }

    /// Publish one outcome, unless a newer run for the file committed
    /// after it did.
    fn publish(&mut self, outcome: RunOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.tracker.is_stale(&outcome.path, outcome.stamp) {
            tracing::debug!(
                "discarding stale analysis result for {}",
                outcome.path.display()
            );
            return;
        }

        tracing::debug!(
            "finished analyzing {}: {} diagnostics",
            outcome.path.display(),
            outcome.diagnostics.len()
        );
        self.store.update(outcome.path, outcome.diagnostics);
    }

    /// Immutable snapshot of all published diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        self.store.snapshot()
    }

    /// Diagnostics currently published for one path.
    #[must_use]
    pub fn diagnostics_for(&self, path: &Path) -> Option<&[Diagnostic]> {
        self.store.get(path)
    }

    /// Whether the file was dirty when its last run was accepted. Host
    /// surfaces use this for modified indicators.
    #[must_use]
    pub fn is_dirty(&self, path: &Path) -> bool {
        self.tracker.is_dirty(path)
    }
}
