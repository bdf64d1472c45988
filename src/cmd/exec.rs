/*!
`exec.rs`

Implements the `exec` subcommand (aliases `x`, `run`): run one command on every
server selected by the global `--env` / `--tags` filter.

Behavior:
  - Servers are handled one after another, in inventory order.
  - Each result is printed as soon as its helper exits:
        <code>[      name] STDOUT: <stdout>
        STDERR: <stderr>            (only when stderr is non-empty)
  - A non-zero remote exit code is reported, never propagated to dcr's own
    exit status.
  - If the helper cannot be launched the run stops with an error.

Output ends with a blank line.
*/

use anyhow::Result;
use clap::Args;
use std::io::{self, Write};
use tracing::{info, warn};

use crate::cmd::format::{StyleOptions, render_dispatch_result};
use crate::cmd::shared::load_selection;
use crate::config::RunConfig;
use crate::dispatch::{DispatchSummary, Dispatcher};
use crate::inventory::Server;

/* -------------------------------------------------------------------------- */
/* Argument Struct                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// User to run as on the remote host
    #[arg(short = 'u', long, value_name = "USER", default_value = "")]
    pub user: String,

    /// Command to run remotely (passed to the helper as a single argument)
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Words after COMMAND are accepted and ignored; quote multi-word commands
    #[arg(trailing_var_arg = true, hide = true)]
    pub extra: Vec<String>,
}

/* -------------------------------------------------------------------------- */
/* Public Entry Point                                                         */
/* -------------------------------------------------------------------------- */

pub fn execute_exec(args: ExecArgs, config: &RunConfig) -> Result<()> {
    let servers = load_selection(config)?;
    let dispatcher = Dispatcher::new(config.helper.clone())?;
    let style = StyleOptions::detect();

    if !args.extra.is_empty() {
        warn!(
            ignored = %args.extra.join(" "),
            "extra arguments after the command are ignored; quote the whole command"
        );
    }

    let mut out = io::stdout().lock();
    let summary = write_report(&mut out, &dispatcher, &servers, &args, &style)?;

    info!(
        helper = %dispatcher.helper(),
        dispatched = summary.dispatched,
        failed = summary.failed,
        "exec finished"
    );
    Ok(())
}

/// Each result is preceded by a blank line; the report ends with one.
fn write_report<W: Write>(
    out: &mut W,
    dispatcher: &Dispatcher,
    servers: &[Server],
    args: &ExecArgs,
    style: &StyleOptions,
) -> Result<DispatchSummary> {
    let summary = dispatcher.dispatch_all(servers, &args.user, &args.command, |result| {
        writeln!(out)?;
        writeln!(out, "{}", render_dispatch_result(result, style))?;
        out.flush()?;
        Ok(())
    })?;
    writeln!(out)?;
    out.flush()?;
    Ok(summary)
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
