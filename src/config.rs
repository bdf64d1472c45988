//! Run configuration, built once from parsed flags and never mutated.
//!
//! Precedence for each value: CLI flag > environment variable > default.
//!   inventory path : --config / DCR_CONFIG / ~/.dcr/servers.json
//!   helper         : --helper / DCR_HELPER / pmrun

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::dispatch::{DEFAULT_HELPER, HelperSpec, parse_helper};
use crate::select::Filter;

pub const CONFIG_ENV: &str = "DCR_CONFIG";
pub const HELPER_ENV: &str = "DCR_HELPER";

/// Raw global flag values as they come off the command line.
#[derive(Debug, Clone, Default)]
pub struct GlobalFlags {
    pub config: Option<String>,
    pub environment: Option<String>,
    pub tags: Option<String>,
    pub helper: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub inventory_path: PathBuf,
    pub filter: Filter,
    pub helper: HelperSpec,
}

impl RunConfig {
    /// Resolve flags against the process environment.
    pub fn from_flags(flags: GlobalFlags) -> Result<Self> {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    /// Resolve flags using `lookup` for environment fallbacks.
    pub fn resolve(flags: GlobalFlags, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let inventory_path = non_blank(flags.config)
            .or_else(|| non_blank(lookup(CONFIG_ENV)))
            .map(PathBuf::from)
            .unwrap_or_else(default_inventory_path);

        let helper_raw = non_blank(flags.helper)
            .or_else(|| non_blank(lookup(HELPER_ENV)))
            .unwrap_or_else(|| DEFAULT_HELPER.to_string());
        let helper = parse_helper(&helper_raw)
            .with_context(|| format!("Invalid helper command: '{helper_raw}'"))?;

        let filter = Filter::parse(flags.environment.as_deref(), flags.tags.as_deref());

        Ok(Self {
            inventory_path,
            filter,
            helper,
        })
    }
}

/// `~/.dcr/servers.json`, or `.dcr/servers.json` when no home directory is known.
pub fn default_inventory_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".dcr")
        .join("servers.json")
}
