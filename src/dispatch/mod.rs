//! Dispatcher: run a command on each selected server through the external
//! remote-execution helper.
//!
//! parse_helper -> HelperSpec { program, args }
//! Dispatcher::dispatch      : one server, one helper subprocess
//! Dispatcher::dispatch_all  : sequential fan-out in inventory order
//!
//! Invocation shape: `<program> [args..] -h <server> <user> <command>`.
//! The command is handed over as a single argument, never shell-interpreted here.
//!
//! Failure boundary:
//!   - helper could not be spawned => Err (aborts the whole run)
//!   - helper ran, exited non-zero => Ok(DispatchResult) with that exit code

use anyhow::{Context, Result, bail};
use shell_words::split as shell_split;
use std::fmt;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::inventory::Server;

/// Helper used when neither `--helper` nor `DCR_HELPER` is given.
pub const DEFAULT_HELPER: &str = "pmrun";

/// Exit code reported when the helper died without one (killed by a signal).
pub const NO_EXIT_CODE: i32 = -1;

/// Parsed remote-execution helper command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperSpec {
    pub program: String,
    /// Fixed leading arguments placed before `-h <server> ..`.
    pub args: Vec<String>,
}

impl HelperSpec {
    pub fn from_parts(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command_for(&self, server: &Server, user: &str, command: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-h")
            .arg(&server.name)
            .arg(user)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl fmt::Display for HelperSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Split a helper command line (e.g. `"sudo pmrun"`) with shell-style rules.
pub fn parse_helper(raw: &str) -> Result<HelperSpec> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Helper command is empty");
    }
    let mut parts =
        shell_split(trimmed).context("Failed to parse helper command line (shell splitting)")?;
    if parts.is_empty() {
        bail!("No tokens produced when parsing helper command line");
    }
    let program = parts.remove(0);
    Ok(HelperSpec::from_parts(program, parts))
}

/// Outcome of one helper invocation. Borrowed from the selection; never stored.
#[derive(Debug)]
pub struct DispatchResult<'a> {
    pub server: &'a Server,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl DispatchResult<'_> {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Totals for a completed fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub failed: usize,
}

/// Synchronous facade over a current-thread Tokio runtime. Invocations are
/// awaited one at a time, so there is never more than one helper alive.
pub struct Dispatcher {
    helper: HelperSpec,
    rt: tokio::runtime::Runtime,
}

impl Dispatcher {
    pub fn new(helper: HelperSpec) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create Tokio runtime")?;
        Ok(Self { helper, rt })
    }

    pub fn helper(&self) -> &HelperSpec {
        &self.helper
    }

    /// Run `command` on one server as `user`.
    pub fn dispatch<'a>(
        &self,
        server: &'a Server,
        user: &str,
        command: &str,
    ) -> Result<DispatchResult<'a>> {
        self.rt
            .block_on(run_helper(&self.helper, server, user, command))
    }

    /// Dispatch to every server in order, handing each result to `on_result`
    /// as soon as its helper exits. Stops at the first launch failure or the
    /// first error returned by `on_result`.
    pub fn dispatch_all<'a, F>(
        &self,
        servers: &'a [Server],
        user: &str,
        command: &str,
        mut on_result: F,
    ) -> Result<DispatchSummary>
    where
        F: FnMut(&DispatchResult<'a>) -> Result<()>,
    {
        let mut summary = DispatchSummary::default();
        for server in servers {
            let result = self.dispatch(server, user, command)?;
            summary.dispatched += 1;
            if !result.success() {
                summary.failed += 1;
            }
            on_result(&result)?;
        }
        Ok(summary)
    }
}

async fn run_helper<'a>(
    helper: &HelperSpec,
    server: &'a Server,
    user: &str,
    command: &str,
) -> Result<DispatchResult<'a>> {
    let started = Instant::now();
    debug!(server = %server.name, user, helper = %helper, "dispatching");
    trace!(command, "remote command");

    let output = helper
        .command_for(server, user, command)
        .output()
        .await
        .with_context(|| {
            format!(
                "Failed to launch remote-execution helper '{}' for server '{}'",
                helper.program, server.name
            )
        })?;

    let exit_code = output.status.code().unwrap_or(NO_EXIT_CODE);
    debug!(
        server = %server.name,
        exit_code,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "helper finished"
    );

    Ok(DispatchResult {
        server,
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
