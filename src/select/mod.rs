//! Selection engine: narrow an inventory by environment and tag expressions.
//!
//! Filter::parse(env, tags) -> Filter
//! select(&[Server], &Filter) -> Vec<Server>   (order-preserving, input untouched)
//!
//! Tag expressions:
//!   web     => server must carry `web`
//!   !web    => server must NOT carry `web`
//! Multiple expressions are AND-ed, applied left to right.

use std::fmt;

use crate::inventory::Server;

/// A single tag filter token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagExpr {
    Include(String),
    Exclude(String),
}

impl TagExpr {
    /// `!name` => Exclude(name), anything else => Include(whole token).
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix('!') {
            Some(rest) => TagExpr::Exclude(rest.to_string()),
            None => TagExpr::Include(token.to_string()),
        }
    }

    pub fn matches(&self, server: &Server) -> bool {
        match self {
            TagExpr::Include(tag) => server.has_tag(tag),
            TagExpr::Exclude(tag) => !server.has_tag(tag),
        }
    }
}

impl fmt::Display for TagExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagExpr::Include(t) => f.write_str(t),
            TagExpr::Exclude(t) => write!(f, "!{t}"),
        }
    }
}

/// Selection intent for one run. `None` / empty means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub environment: Option<String>,
    pub tags: Vec<TagExpr>,
}

impl Filter {
    /// Build from raw flag values.
    ///
    /// Empty environment collapses to `None`. The tag list is split on `,`
    /// and empty tokens are dropped, so an absent or empty `--tags` never
    /// turns into a "must carry the empty tag" constraint.
    pub fn parse(environment: Option<&str>, tags: Option<&str>) -> Self {
        let environment = environment
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        let tags = tags
            .map(|raw| {
                raw.split(',')
                    .filter(|tok| !tok.is_empty())
                    .map(TagExpr::parse)
                    .collect()
            })
            .unwrap_or_default();
        Self { environment, tags }
    }

    pub fn is_empty(&self) -> bool {
        self.environment.is_none() && self.tags.is_empty()
    }

    pub fn matches(&self, server: &Server) -> bool {
        if let Some(env) = &self.environment
            && server.environment != *env
        {
            return false;
        }
        self.tags.iter().all(|expr| expr.matches(server))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env = self.environment.as_deref().unwrap_or("*");
        let tags: Vec<String> = self.tags.iter().map(|t| t.to_string()).collect();
        write!(f, "env={env} tags=[{}]", tags.join(","))
    }
}

/// Return the servers matching `filter`, in inventory order.
pub fn select(inventory: &[Server], filter: &Filter) -> Vec<Server> {
    inventory
        .iter()
        .filter(|s| filter.matches(s))
        .cloned()
        .collect()
}
