/*!
`list.rs`

Implements the `list` subcommand (aliases `l`, `ls`): print the servers that
survive the global `--env` / `--tags` filter.

Formats (`-f/--format`):
  names    -> `A,B,C`
  json     -> pretty JSON array
  (other)  -> `<environment> <name> <tags>` per line

Output always ends with a blank line.
*/

use anyhow::Result;
use clap::Args;
use std::io::{self, Write};

use crate::cmd::format::{ListFormat, render_list};
use crate::cmd::shared::load_selection;
use crate::config::RunConfig;
use crate::inventory::Server;

/// CLI arguments for `dcr list`
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Output format (names|json); anything else prints columns
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Entry point for the list subcommand.
pub fn execute_list(args: ListArgs, config: &RunConfig) -> Result<()> {
    let servers = load_selection(config)?;
    let format = ListFormat::from_opt(args.format.as_deref());
    let mut out = io::stdout().lock();
    write_list(&mut out, &servers, format)
}

/// Names always get their (possibly empty) line; an empty columnar listing
/// prints nothing before the closing blank line.
fn write_list<W: Write>(out: &mut W, servers: &[Server], format: ListFormat) -> Result<()> {
    let rendered = render_list(servers, format)?;
    if !rendered.is_empty() || format == ListFormat::Names {
        writeln!(out, "{rendered}")?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
