//! Checker process execution — spawn, capture, optional timeout.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::process::Command;

/// Captured output of a finished checker process, stdout/stderr decoded
/// lossily (checker output is not guaranteed UTF-8).
#[derive(Debug)]
pub(crate) struct Captured {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Run `program args…` to completion and capture its output.
///
/// `cwd` is the workspace root when one is known. The timeout, when set,
/// bounds the whole invocation; on expiry the child is dropped (killed)
/// and an error is returned.
pub(crate) async fn run_checker(
    program: &Path,
    args: &[String],
    cwd: Option<&Path>,
    timeout: Option<Duration>,
) -> Result<Captured> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
            Ok(result) => result,
            Err(_) => bail!("{} timed out after {:?}", program.display(), limit),
        },
        None => cmd.output().await,
    }
    .with_context(|| format!("spawning {}", program.display()))?;

    Ok(capture(&output))
}

fn capture(output: &Output) -> Captured {
    Captured {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    }
}
