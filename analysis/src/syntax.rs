//! Blade compile-time syntax check.
//!
//! The check is a black-box script: given a template path it compiles the
//! template and prints `{"success": true}` or `{"error": "…"}` on stdout,
//! exiting non-zero in the error case.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::process::run_checker;
use crate::types::SyntaxConfig;

/// Placeholder replaced with the file under check in a command override.
const FILE_PLACEHOLDER: &str = "{file}";

/// The check script's stdout, one of two shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SyntaxReport {
    Failure { error: String },
    Success { success: bool },
}

/// Result of a syntax-check invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SyntaxOutcome {
    /// The template compiled.
    Clean,
    /// The compiler reported a syntax error.
    SyntaxError(String),
    /// The check could not run or produced no usable output.
    Unavailable,
}

fn decode_report(stdout: &str) -> Option<SyntaxOutcome> {
    match serde_json::from_str::<SyntaxReport>(stdout) {
        Ok(SyntaxReport::Failure { error }) => Some(SyntaxOutcome::SyntaxError(error)),
        Ok(SyntaxReport::Success { success: true }) => Some(SyntaxOutcome::Clean),
        // `{"success": false}` is not a shape the script emits.
        Ok(SyntaxReport::Success { success: false }) | Err(_) => None,
    }
}

/// Invokes the external syntax-check script.
#[derive(Debug, Clone)]
pub(crate) struct SyntaxChecker {
    config: SyntaxConfig,
}

impl SyntaxChecker {
    pub fn new(config: SyntaxConfig) -> Self {
        Self { config }
    }

    /// Build program + argv for one file, honouring the command override.
    fn invocation(&self, file: &Path, workspace_root: &Path) -> (PathBuf, Vec<String>) {
        if let Some(command) = &self.config.command
            && let Some((program, rest)) = command.split_first()
        {
            let file_str = file.display().to_string();
            let args = rest
                .iter()
                .map(|arg| arg.replace(FILE_PLACEHOLDER, &file_str))
                .collect();
            return (PathBuf::from(program), args);
        }

        let script = if self.config.script.is_absolute() {
            self.config.script.clone()
        } else {
            workspace_root.join(&self.config.script)
        };
        let args = vec![script.display().to_string(), file.display().to_string()];
        (PathBuf::from(&self.config.php_binary_path), args)
    }

    /// Run the syntax check for one template.
    ///
    /// The check needs a workspace root (the compiler writes its scratch
    /// output relative to it); without one the check is skipped.
    pub async fn check(
        &self,
        file: &Path,
        workspace_root: Option<&Path>,
        timeout: Option<Duration>,
    ) -> SyntaxOutcome {
        let Some(root) = workspace_root else {
            tracing::debug!(
                "no workspace root; skipping syntax check for {}",
                file.display()
            );
            return SyntaxOutcome::Unavailable;
        };

        let (program, args) = self.invocation(file, root);
        tracing::debug!("Checking syntax: {} {}", program.display(), args.join(" "));

        let captured = match run_checker(&program, &args, Some(root), timeout).await {
            Ok(captured) => captured,
            Err(e) => {
                tracing::warn!("syntax check failed to run for {}: {e:#}", file.display());
                return SyntaxOutcome::Unavailable;
            }
        };

        if !captured.stdout.is_empty() {
            tracing::trace!("syntax check stdout: {}", captured.stdout);
        }
        if !captured.stderr.is_empty() {
            tracing::warn!("syntax check stderr: {}", captured.stderr.trim());
        }

        match decode_report(&captured.stdout) {
            Some(outcome) => outcome,
            None => {
                tracing::warn!(
                    "failed to parse syntax check output for {}: {}",
                    file.display(),
                    captured.stdout
                );
                SyntaxOutcome::Unavailable
            }
        }
    }
}
