//! Result merging — one ordered diagnostic set per analysis run.

use crate::lint::RawLintIssue;
use crate::syntax::SyntaxOutcome;
use crate::types::{Diagnostic, DiagnosticSeverity};

/// Message prefix distinguishing compile-failure diagnostics from lint
/// warnings in the published set.
const SYNTAX_ERROR_PREFIX: &str = "Blade syntax error: ";

/// Combine the outputs of one run's checks into the final ordered set.
///
/// `fallback_error` is the plain-probe stderr, present only when the
/// JSON-mode lint run produced no signal and the probe positively
/// identified a parse failure; it replaces the (empty) lint result.
/// Lint-derived diagnostics keep the linter's reporting order, followed
/// by the syntax-check diagnostic if any. Never fails.
pub(crate) fn merge(
    lint_issues: &[RawLintIssue],
    fallback_error: Option<&str>,
    syntax: &SyntaxOutcome,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    if let Some(text) = fallback_error {
        out.push(Diagnostic::spanning_line(
            DiagnosticSeverity::Error,
            format!("{SYNTAX_ERROR_PREFIX}{text}"),
            0,
        ));
    } else {
        for issue in lint_issues {
            // The linter reports 1-based lines; diagnostics are 0-based.
            out.push(Diagnostic::spanning_line(
                DiagnosticSeverity::Warning,
                issue.message.clone(),
                issue.line.saturating_sub(1),
            ));
        }
    }

    if let SyntaxOutcome::SyntaxError(message) = syntax {
        out.push(Diagnostic::spanning_line(
            DiagnosticSeverity::Error,
            format!("{SYNTAX_ERROR_PREFIX}{message}"),
            0,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(line: u32, message: &str) -> RawLintIssue {
        RawLintIssue {
            line,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_lint_issues_become_warnings_in_order() {
        let issues = [issue(3, "first"), issue(7, "second")];
        let merged = merge(&issues, None, &SyntaxOutcome::Clean);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].line(), 2);
        assert_eq!(merged[0].message(), "first");
        assert_eq!(merged[1].line(), 6);
        assert_eq!(merged[1].message(), "second");
        assert!(merged.iter().all(|d| d.severity() == DiagnosticSeverity::Warning));
    }

    #[test]
    fn test_line_one_translates_to_zero() {
        let merged = merge(&[issue(1, "top of file")], None, &SyntaxOutcome::Clean);
        assert_eq!(merged[0].line(), 0);
    }

    #[test]
    fn test_line_zero_never_underflows() {
        // A zero from a misbehaving linter stays at line 0.
        let merged = merge(&[issue(0, "odd")], None, &SyntaxOutcome::Clean);
        assert_eq!(merged[0].line(), 0);
    }

    #[test]
    fn test_fallback_replaces_empty_lint_result() {
        let merged = merge(&[], Some("ParseError: unexpected token"), &SyntaxOutcome::Clean);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].severity(), DiagnosticSeverity::Error);
        assert_eq!(merged[0].line(), 0);
        assert!(merged[0].message().contains("ParseError: unexpected token"));
        assert_eq!(
            merged
                .iter()
                .filter(|d| d.severity() == DiagnosticSeverity::Warning)
                .count(),
            0
        );
    }

    #[test]
    fn test_syntax_error_appends_after_lint_warnings() {
        let issues = [issue(5, "style issue")];
        let merged = merge(
            &issues,
            None,
            &SyntaxOutcome::SyntaxError("Unexpected end of file".to_string()),
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].severity(), DiagnosticSeverity::Warning);
        assert_eq!(merged[1].severity(), DiagnosticSeverity::Error);
        assert_eq!(merged[1].line(), 0);
        assert_eq!(
            merged[1].message(),
            "Blade syntax error: Unexpected end of file"
        );
    }

    #[test]
    fn test_clean_run_produces_nothing() {
        assert!(merge(&[], None, &SyntaxOutcome::Clean).is_empty());
    }

    #[test]
    fn test_unavailable_syntax_check_appends_nothing() {
        let merged = merge(&[issue(2, "w")], None, &SyntaxOutcome::Unavailable);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].severity(), DiagnosticSeverity::Warning);
    }

    #[test]
    fn test_fallback_and_syntax_error_both_surface() {
        let merged = merge(
            &[],
            Some("syntax error, unexpected '@'"),
            &SyntaxOutcome::SyntaxError("compile failed".to_string()),
        );
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|d| d.severity().is_error()));
    }
}
