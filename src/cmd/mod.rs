/*!
Subcommand modules.

Layout:
  src/cmd/
    mod.rs      (this file: declarations + re-exports only)
    list.rs     (ListArgs + execute_list)
    exec.rs     (ExecArgs + execute_exec)
    format.rs   (selection / dispatch rendering, color)
    shared.rs   (inventory load + selection used by both commands)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that takes its clap args plus the run's `&RunConfig` and returns
    `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and hold only subcommand-local flags;
    filtering flags are global and live in `RunConfig`.
*/

pub mod exec;
pub mod format;
pub mod list;
pub mod shared;

pub use exec::{ExecArgs, execute_exec};
pub use list::{ListArgs, execute_list};
