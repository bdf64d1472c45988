use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod dispatch;
mod inventory;
mod select;
mod utils;

use cmd::{ExecArgs, ListArgs};
use config::{GlobalFlags, RunConfig};

/// dcr - list servers from an inventory and run commands on them.
///
/// Command layout:
///   dcr [-c FILE] [-e ENV] [-t TAGS] list [-f names|json]
///   dcr [-c FILE] [-e ENV] [-t TAGS] exec [-u USER] "<command>"
///
/// Filtering:
///   -e / --env      exact environment match
///   -t / --tags     comma-separated tags; `!tag` excludes servers carrying it
///                   e.g. -t web,!canary
///
/// Global flags / env:
///   -c / --config   inventory file (or DCR_CONFIG; default ~/.dcr/servers.json)
///   --helper        remote-execution helper (or DCR_HELPER; default pmrun)
///   -v / -vv        more log output on stderr
///   -q / --quiet    errors only
///
/// Examples:
///   dcr -e prod list -f names
///   dcr -t web,!db ls
///   dcr -e staging x -u deploy "systemctl restart app"
#[derive(Parser, Debug)]
#[command(
    name = "dcr",
    version,
    about = "List and filter servers, run commands on them",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Load inventory from FILE
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    config: Option<String>,

    /// Filter by environment
    #[arg(short = 'e', long = "env", global = true, value_name = "ENV")]
    env: Option<String>,

    /// Filter by tags (comma-separated, `!tag` to exclude)
    #[arg(short = 't', long = "tags", global = true, value_name = "TAGS")]
    tags: Option<String>,

    /// Remote-execution helper command line
    #[arg(long = "helper", global = true, value_name = "PROGRAM")]
    helper: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List servers
    #[command(visible_aliases = ["l", "ls"])]
    List(ListArgs),

    /// Execute command
    #[command(visible_aliases = ["x", "run"])]
    Exec(ExecArgs),
}

impl Cli {
    fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            config: self.config.clone(),
            environment: self.env.clone(),
            tags: self.tags.clone(),
            helper: self.helper.clone(),
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RunConfig::from_flags(cli.global_flags())?;
    tracing::debug!(
        inventory = %config.inventory_path.display(),
        helper = %config.helper,
        "configuration resolved"
    );

    match cli.command {
        Commands::List(args) => cmd::execute_list(args, &config),
        Commands::Exec(args) => cmd::execute_exec(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    if let Err(e) = run(cli) {
        eprintln!("dcr: {e:#}");
        std::process::exit(1);
    }
}
