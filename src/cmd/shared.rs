/*!
shared.rs - helpers used by both `list` and `exec`.

load_selection: read the inventory named by the run config and narrow it
with the configured filter. The inventory read is the only fatal step here.
*/

use anyhow::Result;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::inventory::{Server, load_inventory};
use crate::select::select;

/// Load the inventory and apply the run's filter.
pub fn load_selection(config: &RunConfig) -> Result<Vec<Server>> {
    let inventory = load_inventory(&config.inventory_path)?;
    if config.filter.is_empty() {
        debug!("no filter given; selecting the whole inventory");
    } else {
        debug!(filter = %config.filter, "selection applied");
    }
    let selected = select(&inventory, &config.filter);
    info!(
        total = inventory.len(),
        selected = selected.len(),
        "servers selected"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalFlags;
    use std::io::Write;

    fn config_for(path: &std::path::Path, env: Option<&str>, tags: Option<&str>) -> RunConfig {
        let flags = GlobalFlags {
            config: Some(path.to_string_lossy().into_owned()),
            environment: env.map(str::to_string),
            tags: tags.map(str::to_string),
            helper: None,
        };
        RunConfig::resolve(flags, |_| None).unwrap()
    }

    #[test]
    fn loads_and_filters() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"name":"A","environment":"prod","tags":["db"]}},
                {{"name":"B","environment":"staging","tags":["web"]}},
                {{"name":"C","environment":"prod","tags":["web","db"]}}
            ]"#
        )
        .unwrap();

        let cfg = config_for(file.path(), Some("prod"), Some("web"));
        let names: Vec<String> = load_selection(&cfg)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["C"]);
    }

    #[test]
    fn missing_inventory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(&dir.path().join("servers.json"), None, None);
        assert!(load_selection(&cfg).is_err());
    }
}
