//! Analysis engine for Blade template diagnostics.
//!
//! Consumes two external checkers (a linter and a compile-time syntax
//! check) as black boxes and turns a stream of editor-style events into
//! per-file diagnostic sets, debouncing redundant runs and discarding
//! stale results.

pub mod types;

pub(crate) mod lint;
pub(crate) mod merge;
pub(crate) mod process;
pub(crate) mod store;
pub(crate) mod syntax;
pub(crate) mod tracker;

mod analyzer;

pub use analyzer::Analyzer;
pub use types::{
    AnalysisConfig, AnalysisTrigger, Diagnostic, DiagnosticSeverity, DiagnosticsSnapshot,
    LintConfig, SyntaxConfig, is_blade_path, is_tracked_path,
};
