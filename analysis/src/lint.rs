//! External linter invocation and output decoding.
//!
//! The linter is a black box invoked as `<binary> lint <file> --<format>
//! <args…>`. JSON mode reports per-issue `{line, message}` records;
//! plain mode is re-run as a probe when JSON mode produces no signal,
//! because the linter's JSON mode can report "no issues" for a file it
//! failed to parse at all.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::process::run_checker;
use crate::types::LintConfig;

/// One issue as reported by the linter. Line numbers are 1-based on the
/// wire and translated at merge time.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawLintIssue {
    pub line: u32,
    pub message: String,
}

/// The linter's JSON-mode stdout: either `{"errors": […]}` or a bare
/// array of the same records. Anything else is a decode failure.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LintReport {
    Wrapped { errors: Vec<RawLintIssue> },
    Bare(Vec<RawLintIssue>),
}

/// Result of a JSON-mode lint invocation.
#[derive(Debug)]
pub(crate) enum LintOutcome {
    /// Output decoded; may be empty.
    Issues(Vec<RawLintIssue>),
    /// The process produced stdout that did not decode.
    ParseFailed,
    /// The process could not run or produced no usable stdout.
    Failed,
}

impl LintOutcome {
    /// Whether the plain-mode probe should run: JSON mode produced no
    /// signal, either as a clean empty report or as undecodable output.
    pub fn needs_plain_probe(&self) -> bool {
        match self {
            Self::Issues(issues) => issues.is_empty(),
            Self::ParseFailed => true,
            Self::Failed => false,
        }
    }

    pub fn issues(&self) -> &[RawLintIssue] {
        match self {
            Self::Issues(issues) => issues,
            Self::ParseFailed | Self::Failed => &[],
        }
    }
}

/// The stderr markers the linter emits when it could not parse the file.
/// The heuristic is isolated here so it can be swapped without touching
/// orchestration.
pub(crate) fn looks_like_syntax_error(text: &str) -> bool {
    text.contains("syntax error") || text.contains("ParseError")
}

fn decode_report(stdout: &str) -> Result<Vec<RawLintIssue>, serde_json::Error> {
    serde_json::from_str::<LintReport>(stdout).map(|report| match report {
        LintReport::Wrapped { errors } => errors,
        LintReport::Bare(issues) => issues,
    })
}

/// Invokes the external linter.
#[derive(Debug, Clone)]
pub(crate) struct LintRunner {
    config: LintConfig,
}

impl LintRunner {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    /// Argv for the JSON-mode invocation, excluding the binary itself.
    fn json_args(&self, file: &Path) -> Vec<String> {
        let mut args = vec![
            "lint".to_string(),
            file.display().to_string(),
            format!("--{}", self.config.error_format),
        ];
        args.extend(self.config.args.iter().cloned());
        args
    }

    /// Argv for the plain-mode probe, excluding the binary itself.
    fn plain_args(&self, file: &Path) -> Vec<String> {
        let mut args = vec!["lint".to_string(), file.display().to_string()];
        args.extend(self.config.args.iter().cloned());
        args
    }

    fn resolve_binary(&self) -> Option<PathBuf> {
        match which::which(&self.config.binary_path) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("{} not found in PATH: {e}", self.config.binary_path);
                None
            }
        }
    }

    /// Run the linter in JSON mode against one file.
    pub async fn check_json(
        &self,
        file: &Path,
        workspace_root: Option<&Path>,
        timeout: Option<Duration>,
    ) -> LintOutcome {
        let Some(binary) = self.resolve_binary() else {
            return LintOutcome::Failed;
        };
        let args = self.json_args(file);
        tracing::debug!(
            "Executing: {} {}",
            binary.display(),
            args.join(" ")
        );

        let captured = match run_checker(&binary, &args, workspace_root, timeout).await {
            Ok(captured) => captured,
            Err(e) => {
                tracing::warn!("lint invocation failed for {}: {e:#}", file.display());
                return LintOutcome::Failed;
            }
        };

        if !captured.stdout.is_empty() {
            tracing::trace!("lint stdout: {}", captured.stdout);
        }
        if !captured.stderr.is_empty() {
            tracing::trace!("lint stderr: {}", captured.stderr);
        }

        // Only a clean stdout is trusted as a machine-readable report.
        if captured.stdout.is_empty() || !captured.stderr.is_empty() {
            tracing::debug!("lint produced no usable JSON output for {}", file.display());
            return LintOutcome::Failed;
        }

        match decode_report(&captured.stdout) {
            Ok(issues) => {
                tracing::debug!("parsed {} lint issues for {}", issues.len(), file.display());
                LintOutcome::Issues(issues)
            }
            Err(e) => {
                tracing::warn!("failed to parse lint JSON output for {}: {e}", file.display());
                LintOutcome::ParseFailed
            }
        }
    }

    /// Re-run the linter without the format flag and return stderr when it
    /// positively identifies a parse failure of the file itself.
    pub async fn probe_plain(
        &self,
        file: &Path,
        workspace_root: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Option<String> {
        let binary = self.resolve_binary()?;
        let args = self.plain_args(file);
        tracing::debug!(
            "Executing plain probe: {} {}",
            binary.display(),
            args.join(" ")
        );

        let captured = match run_checker(&binary, &args, workspace_root, timeout).await {
            Ok(captured) => captured,
            Err(e) => {
                tracing::warn!("plain lint probe failed for {}: {e:#}", file.display());
                return None;
            }
        };

        if !captured.stderr.is_empty() {
            tracing::trace!("plain lint stderr: {}", captured.stderr);
        }

        if looks_like_syntax_error(&captured.stderr) {
            tracing::debug!("syntax error detected for {}", file.display());
            Some(captured.stderr.trim().to_string())
        } else {
            None
        }
    }
}
