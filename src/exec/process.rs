// src/exec/process.rs

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::Result;

/// Run a shell command line to completion and return its exit status.
///
/// The command string is handed to the platform shell (`sh -c` on Unix,
/// `cmd /C` on Windows). stdout and stderr are piped and drained line by
/// line at debug level so OS buffers never fill.
///
/// Extra environment variables are applied via `Command::env` only; they
/// never appear in the argument list, so a credential passed here stays
/// out of process-list logs. Callers log variable *names* if they need to.
pub async fn run_shell(
    label: &str,
    command: &str,
    cwd: &Path,
    envs: &[(String, String)],
) -> Result<ExitStatus> {
    info!(task = %label, cmd = %command, "starting process");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    for (key, value) in envs {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn()?;

    if let Some(stdout) = child.stdout.take() {
        let label = label.to_string();
        tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %label, "stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let label = label.to_string();
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %label, "stderr: {}", line);
            }
        });
    }

    let status = child.wait().await?;

    info!(
        task = %label,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "process exited"
    );

    Ok(status)
}
