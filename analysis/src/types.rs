//! Public types consumed by hosts of the analysis engine.
//!
//! Hosts construct an [`AnalysisConfig`], feed editor-style events to the
//! analyzer, and read [`DiagnosticsSnapshot`]s for display.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Source tag attached to every diagnostic this engine produces.
pub const DIAGNOSTIC_SOURCE: &str = "bladelint";

/// End column for full-line diagnostic ranges. The checkers report lines,
/// not columns, so every diagnostic spans the line.
pub(crate) const LINE_SPAN_END: u32 = 1000;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticSeverity {
    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A single diagnostic produced from checker output.
///
/// Fields are private; construction is restricted to `pub(crate)`.
/// External consumers read via accessors. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: DiagnosticSeverity,
    message: String,
    /// 0-indexed line number.
    line: u32,
    /// Column range covered, 0-indexed.
    col_start: u32,
    col_end: u32,
}

impl Diagnostic {
    /// Construct a diagnostic spanning the whole line.
    ///
    /// This is the single construction path; the checkers only report
    /// line positions.
    pub(crate) fn spanning_line(severity: DiagnosticSeverity, message: String, line: u32) -> Self {
        Self {
            severity,
            message,
            line,
            col_start: 0,
            col_end: LINE_SPAN_END,
        }
    }

    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 0-indexed line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Column range covered, 0-indexed.
    #[must_use]
    pub fn col_range(&self) -> (u32, u32) {
        (self.col_start, self.col_end)
    }

    /// Source tag (same for every diagnostic this engine emits).
    #[must_use]
    pub fn source(&self) -> &'static str {
        DIAGNOSTIC_SOURCE
    }

    /// Format as `path:line: severity: message` (1-indexed for display).
    #[must_use]
    pub fn display_with_path(&self, path: &Path) -> String {
        format!(
            "{}:{}: {}: [{}] {}",
            path.display(),
            self.line + 1,
            self.severity.label(),
            DIAGNOSTIC_SOURCE,
            self.message,
        )
    }
}

/// Why an analysis run was requested.
///
/// Carried through for logging and gating nuance: a manual command
/// bypasses the debounce window, everything else is subject to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTrigger {
    InitialActivation,
    DocumentOpened,
    ActiveEditorChanged,
    DocumentSaved,
    ManualCommand,
}

impl AnalysisTrigger {
    #[must_use]
    pub fn is_manual(self) -> bool {
        self == Self::ManualCommand
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InitialActivation => "initial activation",
            Self::DocumentOpened => "opened document",
            Self::ActiveEditorChanged => "changed active editor",
            Self::DocumentSaved => "saved document",
            Self::ManualCommand => "manually triggered",
        }
    }
}

/// Whether the lint check applies to this file at all.
#[must_use]
pub fn is_tracked_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("php")
}

/// Whether this is a Blade template (double extension), which also gets
/// the compile-time syntax check.
#[must_use]
pub fn is_blade_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".blade.php"))
}

/// Immutable snapshot of all published diagnostics, suitable for display.
///
/// Counts are computed from the canonical source (`files`) rather than
/// cached alongside it.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSnapshot {
    /// Per-file diagnostics, sorted with error-containing files first.
    files: Vec<(PathBuf, Vec<Diagnostic>)>,
}

impl DiagnosticsSnapshot {
    pub(crate) fn new(files: Vec<(PathBuf, Vec<Diagnostic>)>) -> Self {
        Self { files }
    }

    /// Per-file diagnostics, sorted with error-containing files first.
    #[must_use]
    pub fn files(&self) -> &[(PathBuf, Vec<Diagnostic>)] {
        &self.files
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn count_by_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.files
            .iter()
            .flat_map(|(_, items)| items)
            .filter(|d| d.severity() == severity)
            .count()
    }

    /// Number of error-level diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Error)
    }

    /// Number of warning-level diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Warning)
    }

    /// Total diagnostic count across all files.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.files.iter().map(|(_, items)| items.len()).sum()
    }

    /// Format a compact status string like "E:3 W:5".
    #[must_use]
    pub fn status_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!("E:{} W:{}", self.error_count(), self.warning_count())
    }
}

// Default value functions for serde.
fn default_lint_binary() -> String {
    "tlint".to_string()
}

fn default_error_format() -> String {
    "json".to_string()
}

fn default_php_binary() -> String {
    "php".to_string()
}

fn default_syntax_script() -> PathBuf {
    PathBuf::from("scripts/blade-syntax-check.php")
}

const fn default_debounce_ms() -> u64 {
    1000
}

/// Configuration for the analysis engine.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub lint: LintConfig,
    #[serde(default)]
    pub syntax: SyntaxConfig,
    /// Minimum elapsed time between two accepted runs for the same file,
    /// absent an intervening modification or manual trigger.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Upper bound on each external checker invocation. Unset means
    /// unbounded, matching the checkers' own behaviour.
    #[serde(default)]
    pub check_timeout_secs: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lint: LintConfig::default(),
            syntax: SyntaxConfig::default(),
            debounce_ms: default_debounce_ms(),
            check_timeout_secs: None,
        }
    }
}

/// Configuration for the external linter.
#[derive(Debug, Clone, Deserialize)]
pub struct LintConfig {
    /// Linter executable, resolved from PATH (e.g. "tlint").
    #[serde(default = "default_lint_binary")]
    pub binary_path: String,
    /// Extra arguments appended to every invocation.
    #[serde(default)]
    pub args: Vec<String>,
    /// Machine-readable output format flag (passed as `--<format>`).
    #[serde(default = "default_error_format")]
    pub error_format: String,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            binary_path: default_lint_binary(),
            args: Vec::new(),
            error_format: default_error_format(),
        }
    }
}

/// Configuration for the Blade compile-time syntax check.
#[derive(Debug, Clone, Deserialize)]
pub struct SyntaxConfig {
    /// PHP executable used to run the check script.
    #[serde(default = "default_php_binary")]
    pub php_binary_path: String,
    /// Check script path; relative paths resolve against the workspace root.
    #[serde(default = "default_syntax_script")]
    pub script: PathBuf,
    /// Full command override as an argv vector. Each `{file}` occurrence
    /// is replaced with the file under check.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            php_binary_path: default_php_binary(),
            script: default_syntax_script(),
            command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diag(severity: DiagnosticSeverity, msg: &str, line: u32) -> Diagnostic {
        Diagnostic::spanning_line(severity, msg.to_string(), line)
    }

    // ── DiagnosticSeverity ─────────────────────────────────────────────

    #[test]
    fn test_is_error() {
        assert!(DiagnosticSeverity::Error.is_error());
        assert!(!DiagnosticSeverity::Warning.is_error());
    }

    #[test]
    fn test_severity_label() {
        assert_eq!(DiagnosticSeverity::Error.label(), "error");
        assert_eq!(DiagnosticSeverity::Warning.label(), "warning");
    }

    // ── Diagnostic ─────────────────────────────────────────────────────

    #[test]
    fn test_spanning_line_covers_full_line() {
        let diag = make_diag(DiagnosticSeverity::Warning, "unused directive", 4);
        assert_eq!(diag.line(), 4);
        assert_eq!(diag.col_range(), (0, LINE_SPAN_END));
        assert_eq!(diag.source(), DIAGNOSTIC_SOURCE);
    }

    #[test]
    fn test_display_with_path() {
        let diag = make_diag(DiagnosticSeverity::Error, "unexpected token", 10);
        let path = PathBuf::from("resources/views/home.blade.php");
        // line is 0-indexed internally, displayed as 1-indexed
        assert_eq!(
            diag.display_with_path(&path),
            "resources/views/home.blade.php:11: error: [bladelint] unexpected token"
        );
    }

    // ── AnalysisTrigger ────────────────────────────────────────────────

    #[test]
    fn test_only_manual_trigger_is_manual() {
        assert!(AnalysisTrigger::ManualCommand.is_manual());
        assert!(!AnalysisTrigger::InitialActivation.is_manual());
        assert!(!AnalysisTrigger::DocumentOpened.is_manual());
        assert!(!AnalysisTrigger::ActiveEditorChanged.is_manual());
        assert!(!AnalysisTrigger::DocumentSaved.is_manual());
    }

    // ── Path routing ───────────────────────────────────────────────────

    #[test]
    fn test_blade_path_detection() {
        assert!(is_blade_path(Path::new("resources/views/home.blade.php")));
        assert!(!is_blade_path(Path::new("app/Models/User.php")));
        assert!(!is_blade_path(Path::new("home.blade")));
        assert!(!is_blade_path(Path::new("notes.txt")));
    }

    #[test]
    fn test_tracked_path_includes_plain_php_and_blade() {
        assert!(is_tracked_path(Path::new("app/Models/User.php")));
        assert!(is_tracked_path(Path::new("home.blade.php")));
        assert!(!is_tracked_path(Path::new("README.md")));
        assert!(!is_tracked_path(Path::new("Makefile")));
    }

    // ── DiagnosticsSnapshot ────────────────────────────────────────────

    #[test]
    fn test_snapshot_default_is_empty() {
        let snap = DiagnosticsSnapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.total_count(), 0);
        assert_eq!(snap.status_string(), "");
    }

    #[test]
    fn test_snapshot_counts() {
        let snap = DiagnosticsSnapshot::new(vec![(
            PathBuf::from("a.blade.php"),
            vec![
                make_diag(DiagnosticSeverity::Error, "e1", 0),
                make_diag(DiagnosticSeverity::Warning, "w1", 1),
                make_diag(DiagnosticSeverity::Warning, "w2", 2),
            ],
        )]);
        assert_eq!(snap.total_count(), 3);
        assert_eq!(snap.error_count(), 1);
        assert_eq!(snap.warning_count(), 2);
        assert_eq!(snap.status_string(), "E:1 W:2");
        assert!(!snap.is_empty());
    }

    // ── Config deserialization ─────────────────────────────────────────

    #[test]
    fn test_analysis_config_defaults() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.lint.binary_path, "tlint");
        assert_eq!(config.lint.error_format, "json");
        assert!(config.lint.args.is_empty());
        assert_eq!(config.syntax.php_binary_path, "php");
        assert_eq!(
            config.syntax.script,
            PathBuf::from("scripts/blade-syntax-check.php")
        );
        assert!(config.syntax.command.is_none());
        assert_eq!(config.debounce_ms, 1000);
        assert!(config.check_timeout_secs.is_none());
    }

    #[test]
    fn test_analysis_config_overrides() {
        let config: AnalysisConfig = serde_json::from_value(serde_json::json!({
            "lint": {
                "binary_path": "/usr/local/bin/tlint",
                "args": ["--only", "blade"],
                "error_format": "json"
            },
            "syntax": {
                "php_binary_path": "php8.3",
                "command": ["php8.3", "check.php", "{file}"]
            },
            "debounce_ms": 800,
            "check_timeout_secs": 30
        }))
        .unwrap();
        assert_eq!(config.lint.binary_path, "/usr/local/bin/tlint");
        assert_eq!(config.lint.args, vec!["--only", "blade"]);
        assert_eq!(config.syntax.php_binary_path, "php8.3");
        assert_eq!(
            config.syntax.command.as_deref(),
            Some(&["php8.3".to_string(), "check.php".to_string(), "{file}".to_string()][..])
        );
        assert_eq!(config.debounce_ms, 800);
        assert_eq!(config.check_timeout_secs, Some(30));
    }
}
