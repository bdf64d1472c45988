//! Server inventory: data model + loading.
//!
//! load_inventory(path) -> Vec<Server>
//!   - unreadable file      => error (fatal for the run)
//!   - malformed content    => best-effort, silently partial / empty
//!   - null / wrong-typed `environment` or `tags` => zero-filled, entry kept
//!   - `.yaml` / `.yml`     => decoded as YAML, everything else as JSON

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::debug;

/// One manageable host. Field order is the JSON key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Display name, also the remote-execution target.
    pub name: String,
    /// Free-form classification; empty means unclassified.
    #[serde(default, deserialize_with = "null_as_default")]
    pub environment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// `null` decodes the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Server {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, environment: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            name: name.into(),
            environment: environment.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Set-style containment over the ordered tag list.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Read and decode the inventory at `path`.
pub fn load_inventory(path: &Path) -> Result<Vec<Server>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read inventory file: {}", path.display()))?;

    let servers = if is_yaml_path(path) {
        decode_yaml(&raw)
    } else {
        decode_json(&raw)
    };

    debug!(path = %path.display(), count = servers.len(), "inventory loaded");
    Ok(servers)
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Best-effort JSON decode. Silent on malformed content.
pub fn decode_json(raw: &str) -> Vec<Server> {
    match serde_json::from_str::<Vec<Server>>(raw) {
        Ok(servers) => servers,
        Err(e) => {
            debug!(error = %e, "strict inventory decode failed; salvaging entries");
            match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(value) => salvage_entries(value),
                Err(_) => Vec::new(),
            }
        }
    }
}

/// Same schema as JSON; YAML values are routed through `serde_json::Value`
/// so salvage behaves identically.
pub fn decode_yaml(raw: &str) -> Vec<Server> {
    let Ok(yaml_v) = serde_yaml::from_str::<serde_yaml::Value>(raw) else {
        return Vec::new();
    };
    match serde_json::to_value(yaml_v) {
        Ok(value) => salvage_entries(value),
        Err(_) => Vec::new(),
    }
}

/// Keep every array element that has a string `name`, in order.
fn salvage_entries(value: serde_json::Value) -> Vec<Server> {
    let serde_json::Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let server = salvage_server(item);
            if server.is_none() {
                debug!(index = idx, "skipping inventory entry without a string name");
            }
            server
        })
        .collect()
}

/// Field-by-field decode: a wrong-typed `environment` or `tags` is zero-filled
/// and non-string tag elements are dropped.
fn salvage_server(item: &serde_json::Value) -> Option<Server> {
    let obj = item.as_object()?;
    let name = obj.get("name")?.as_str()?.to_string();
    let environment = obj
        .get("environment")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let tags = obj
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Some(Server {
        name,
        environment,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn decodes_well_formed_array() {
        let raw = r#"[
            {"name":"A","environment":"prod","tags":["db"]},
            {"name":"B","environment":"staging","tags":["web"]}
        ]"#;
        let servers = decode_json(raw);
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0], Server::new("A", "prod", &["db"]));
        assert_eq!(servers[1].name, "B");
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let servers = decode_json(r#"[{"name":"solo"}]"#);
        assert_eq!(servers, vec![Server::new("solo", "", &[])]);
    }

    #[test]
    fn entries_without_string_name_are_skipped() {
        let raw = r#"[
            {"name":"A","environment":"prod","tags":["db"]},
            {"name":42},
            {"environment":"prod"},
            "just a string",
            {"name":"D"}
        ]"#;
        let names: Vec<String> = decode_json(raw).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["A", "D"]);
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let raw = r#"[
            {"name":"A","environment":"prod","tags":null},
            {"name":"B","environment":null,"tags":["web"]},
            {"name":"C","environment":"prod","tags":["db"]}
        ]"#;
        let servers = decode_json(raw);
        assert_eq!(
            servers,
            vec![
                Server::new("A", "prod", &[]),
                Server::new("B", "", &["web"]),
                Server::new("C", "prod", &["db"]),
            ]
        );
    }

    #[test]
    fn wrong_typed_fields_are_zero_filled() {
        let raw = r#"[
            {"name":"D","environment":"prod","tags":"oops"},
            {"name":"E","environment":7,"tags":["web",3,"db"]},
            {"name":"F","environment":"prod","tags":["x"]}
        ]"#;
        let servers = decode_json(raw);
        assert_eq!(
            servers,
            vec![
                Server::new("D", "prod", &[]),
                Server::new("E", "", &["web", "db"]),
                Server::new("F", "prod", &["x"]),
            ]
        );
    }

    #[test]
    fn yaml_empty_tags_key_is_kept() {
        let servers = decode_yaml("- name: A\n  environment: prod\n  tags:\n");
        assert_eq!(servers, vec![Server::new("A", "prod", &[])]);
    }

    #[test]
    fn syntax_error_yields_empty_inventory() {
        assert!(decode_json("[{\"name\":\"A\",").is_empty());
        assert!(decode_json("not json at all").is_empty());
        assert!(decode_json(r#"{"name":"A"}"#).is_empty());
    }

    #[test]
    fn yaml_inventory_decodes() {
        let raw = "- name: A\n  environment: prod\n  tags: [db]\n- name: B\n";
        let servers = decode_yaml(raw);
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].tags, vec!["db"]);
        assert_eq!(servers[1].environment, "");
    }

    #[test]
    fn duplicate_names_are_kept() {
        let servers = decode_json(r#"[{"name":"A"},{"name":"A"}]"#);
        assert_eq!(servers.len(), 2);
    }

    #[test]
    fn has_tag_is_exact_and_case_sensitive() {
        let s = Server::new("A", "prod", &["web", "web", "db"]);
        assert!(s.has_tag("web"));
        assert!(!s.has_tag("Web"));
        assert!(!s.has_tag(""));
    }

    #[test]
    fn load_inventory_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"name":"A","environment":"prod","tags":[]}}]"#).unwrap();
        let servers = load_inventory(file.path()).unwrap();
        assert_eq!(servers.len(), 1);
    }

    #[test]
    fn load_inventory_yaml_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        write!(file, "- name: A\n  tags: [web]\n").unwrap();
        let servers = load_inventory(file.path()).unwrap();
        assert_eq!(servers, vec![Server::new("A", "", &["web"])]);
    }

    #[test]
    fn unreadable_inventory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_inventory(&missing).unwrap_err();
        assert!(err.to_string().contains("failed to read inventory file"));
    }
}
