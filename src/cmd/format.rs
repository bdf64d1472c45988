/*!
format.rs

Rendering for `dcr` output. Every function returns a `String`; printing is left
to the subcommand modules.

Selection (`list`):
  - names     : `A,B,C`
  - json      : pretty JSON array (keys: name, environment, tags)
  - columnar  : `<environment> <name> <tags>` per line (default / unknown format)

Dispatch (`exec`):
  `<code>[      name] STDOUT: <stdout>`
  `STDERR: <stderr>`                     (only when stderr is non-empty)
  Exit code 0 renders white on green, anything else white on red.

Color is disabled when `NO_COLOR` is set.
*/

use anyhow::{Context, Result};

use crate::dispatch::DispatchResult;
use crate::inventory::Server;

/* -------------------------------------------------------------------------- */
/* Style                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions { use_color: false }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    /// White on green.
    Success,
    /// White on red.
    Failure,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Success => "38;2;255;255;255;48;2;0;255;0",
        Role::Failure => "38;2;255;255;255;48;2;255;0;0",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Selection Rendering                                                        */
/* -------------------------------------------------------------------------- */

/// Output shape for `list`. Unknown or missing values fall back to columnar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    Names,
    Json,
    #[default]
    Columnar,
}

impl ListFormat {
    pub fn from_opt(raw: Option<&str>) -> Self {
        match raw {
            Some("names") => ListFormat::Names,
            Some("json") => ListFormat::Json,
            _ => ListFormat::Columnar,
        }
    }
}

pub fn render_list(servers: &[Server], format: ListFormat) -> Result<String> {
    match format {
        ListFormat::Names => Ok(render_names(servers)),
        ListFormat::Json => render_json(servers),
        ListFormat::Columnar => Ok(render_columnar(servers)),
    }
}

pub fn render_names(servers: &[Server]) -> String {
    servers
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn render_json(servers: &[Server]) -> Result<String> {
    serde_json::to_string_pretty(servers).context("failed to serialize server list")
}

/// Tags print bracketed and space-separated, e.g. `prod web-01 [web db]`.
pub fn render_columnar(servers: &[Server]) -> String {
    servers
        .iter()
        .map(|s| format!("{} {} [{}]", s.environment, s.name, s.tags.join(" ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/* -------------------------------------------------------------------------- */
/* Dispatch Rendering                                                         */
/* -------------------------------------------------------------------------- */

pub fn exit_code_badge(exit_code: i32, style: &StyleOptions) -> String {
    let role = if exit_code == 0 { Role::Success } else { Role::Failure };
    color(role, exit_code.to_string(), style)
}

/// Strip leading and trailing `\n` only; other whitespace is kept.
pub fn trim_newlines(s: &str) -> &str {
    s.trim_matches('\n')
}

pub fn render_dispatch_result(result: &DispatchResult<'_>, style: &StyleOptions) -> String {
    let badge = exit_code_badge(result.exit_code, style);
    let mut out = format!(
        "{badge:>2}[{:>10}] STDOUT: {:>10}",
        result.server.name,
        trim_newlines(&result.stdout)
    );
    if !result.stderr.is_empty() {
        out.push_str("\nSTDERR: ");
        out.push_str(trim_newlines(&result.stderr));
    }
    out
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
