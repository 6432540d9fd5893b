//! Per-file activity tracking — gates redundant analysis runs.
//!
//! Editors fire overlapping events (open + active-editor-changed) for one
//! user action; without gating, each would spawn a duplicate checker
//! process. The debounce window suppresses those duplicates, and the
//! modified-since-analysis flag guarantees a real edit always gets
//! analyzed on the next eligible trigger even inside the window.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::types::AnalysisTrigger;

/// Commit-time identity of an analysis run.
///
/// Allocated monotonically when a run is accepted; publication compares
/// its stamp against the file's current stamp and discards stale runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunStamp(u64);

#[derive(Debug, Default)]
struct FileState {
    /// When the last analysis for this file was accepted.
    last_analyzed_at: Option<Instant>,
    /// Stamp of the most recently accepted run.
    last_stamp: Option<RunStamp>,
    /// Whether the file had unsaved modifications at last observation.
    is_dirty: bool,
    /// Set on edit events, cleared when a run is accepted.
    modified_since_analysis: bool,
}

/// Per-file analysis state, keyed by path.
///
/// Entries are created lazily on first event and live for the process
/// lifetime. Mutated only by [`commit`](FileTracker::commit) and
/// [`mark_modified`](FileTracker::mark_modified).
pub struct FileTracker {
    files: HashMap<PathBuf, FileState>,
    debounce: Duration,
    next_stamp: u64,
}

impl FileTracker {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            files: HashMap::new(),
            debounce,
            next_stamp: 0,
        }
    }

    /// Whether a run requested now should be suppressed.
    ///
    /// Skips only when the trigger is not manual, the debounce window has
    /// not elapsed, and the file was not modified since the last accepted
    /// run. A file seen for the first time is never skipped.
    #[must_use]
    pub fn should_skip(&self, path: &Path, now: Instant, trigger: AnalysisTrigger) -> bool {
        if trigger.is_manual() {
            return false;
        }
        let Some(state) = self.files.get(path) else {
            return false;
        };
        if state.modified_since_analysis {
            return false;
        }
        let Some(last) = state.last_analyzed_at else {
            return false;
        };
        now.duration_since(last) < self.debounce
    }

    /// Record an accepted run and return its stamp.
    ///
    /// Must be called once per accepted run, before the external checks
    /// are invoked, so a burst of events arriving during a slow checker
    /// call is not accepted wholesale. Clears the modified flag.
    pub fn commit(&mut self, path: &Path, now: Instant, is_dirty: bool) -> RunStamp {
        self.next_stamp += 1;
        let stamp = RunStamp(self.next_stamp);
        let state = self.files.entry(path.to_path_buf()).or_default();
        state.last_analyzed_at = Some(now);
        state.last_stamp = Some(stamp);
        state.is_dirty = is_dirty;
        state.modified_since_analysis = false;
        stamp
    }

    /// Record a text change. Called on every edit event regardless of
    /// debounce state; this is what lets a rapid edit defeat the window
    /// on the next eligible trigger.
    pub fn mark_modified(&mut self, path: &Path) {
        self.files
            .entry(path.to_path_buf())
            .or_default()
            .modified_since_analysis = true;
    }

    /// Whether the file had unsaved modifications when its last run was
    /// accepted.
    #[must_use]
    pub fn is_dirty(&self, path: &Path) -> bool {
        self.files.get(path).is_some_and(|s| s.is_dirty)
    }

    /// Stamp of the most recently accepted run for this file.
    #[must_use]
    pub fn current_stamp(&self, path: &Path) -> Option<RunStamp> {
        self.files.get(path).and_then(|s| s.last_stamp)
    }

    /// Whether a completed run's results are stale — a newer run for the
    /// same file was accepted after it committed.
    #[must_use]
    pub fn is_stale(&self, path: &Path, stamp: RunStamp) -> bool {
        self.current_stamp(path) != Some(stamp)
    }
}
