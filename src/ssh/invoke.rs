// SPDX-License-Identifier: MIT

//! SSH fallback invocation
//!
//! Shells a single non-interactive command to the device and captures the
//! console text. This path is used when the binary API port is unreachable;
//! it is an external-process boundary, not a managed SSH implementation.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{ClientError, Result};

/// Hard bound on one SSH attempt
const SSH_TIMEOUT: Duration = Duration::from_secs(8);

/// Runs an external program and captures its combined output.
///
/// The production implementation is [`SystemRunner`]; tests substitute a
/// recording mock. Arguments are always a discrete vector, never an
/// interpolated shell string.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<String>;
}

/// [`CommandRunner`] backed by `tokio::process`.
///
/// The child is spawned with `kill_on_drop`, so an expired timeout kills the
/// process rather than orphaning it.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<String> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ClientError::Process(format!("failed to spawn {program}: {e}")))?;

        let output = timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| ClientError::Timeout(limit))?
            .map_err(|e| ClientError::Process(format!("{program} did not complete: {e}")))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

/// Runs `command` on the device over SSH, returning combined stdout/stderr.
///
/// Password auth via `sshpass` is attempted first; when it is refused or
/// produces no output, a plain `ssh` attempt follows so ambient key-based
/// auth still works. Each attempt is bounded by an 8 second kill timeout.
pub async fn ssh_execute(
    host: &str,
    user: &str,
    secret: &str,
    command: &str,
    port: u16,
) -> Result<String> {
    ssh_execute_with(&SystemRunner, host, user, secret, command, port).await
}

/// [`ssh_execute`] with an explicit runner, for tests.
pub async fn ssh_execute_with<R: CommandRunner>(
    runner: &R,
    host: &str,
    user: &str,
    secret: &str,
    command: &str,
    port: u16,
) -> Result<String> {
    let target = format!("{user}@{host}");
    let ssh_args: Vec<String> = vec![
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        "-o".to_string(),
        "ConnectTimeout=5".to_string(),
        "-p".to_string(),
        port.to_string(),
        target.clone(),
        command.to_string(),
    ];

    let mut sshpass_args: Vec<String> =
        vec!["-p".to_string(), secret.to_string(), "ssh".to_string()];
    sshpass_args.extend(ssh_args.iter().cloned());

    tracing::debug!("Running SSH fallback against {}", target);
    match runner.run("sshpass", &sshpass_args, SSH_TIMEOUT).await {
        Ok(output) if !output.trim().is_empty() && !output.contains("Permission denied") => {
            return Ok(output);
        }
        Ok(_) => {
            tracing::debug!("Password auth yielded nothing, retrying with key auth");
        }
        Err(e) => {
            tracing::debug!("sshpass attempt failed ({}), retrying with key auth", e);
        }
    }

    runner.run("ssh", &ssh_args, SSH_TIMEOUT).await
}
