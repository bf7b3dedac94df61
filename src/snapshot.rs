//! Persisted site state.
//!
//! Two logical tables — slugs and cached paths, both keyed by
//! (node_id, locale) — plus the locale registry and the node tree,
//! serialized as one JSON document. Slugs are authoritative; cached
//! paths are derived and tolerated stale or corrupt on load (the repair
//! tool overwrites them).

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{SiteError, SiteResult};
use crate::locale::{Locale, LocaleRegistry};
use crate::path::PathCache;
use crate::site::Site;
use crate::slug::validate_slug;
use crate::tree::{Node, PageTree};

/// One row of the slug table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlugRecord {
    pub node_id: Uuid,
    pub locale: String,
    pub slug: String,
}

/// One row of the cached-path table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub node_id: Uuid,
    pub locale: String,
    pub path: String,
}

/// Full persisted site state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSnapshot {
    pub locales: Vec<Locale>,
    pub nodes: Vec<Node>,
    pub slugs: Vec<SlugRecord>,
    pub paths: Vec<PathRecord>,
}

impl SiteSnapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read site file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse site file {}", path.display()))
    }

    /// Write the snapshot to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data =
            serde_json::to_string_pretty(self).context("failed to serialize site snapshot")?;
        fs::write(path, data)
            .with_context(|| format!("failed to write site file {}", path.display()))
    }
}

impl Site {
    /// Export the current state. Nodes appear in tree order and table
    /// rows are sorted, so repeated exports of the same state are
    /// byte-identical.
    pub fn snapshot(&self) -> SiteSnapshot {
        let nodes: Vec<Node> = self.tree.iter_path_order().cloned().collect();

        let mut slugs: Vec<SlugRecord> = self
            .slugs
            .iter()
            .map(|((node_id, locale), slug)| SlugRecord {
                node_id: *node_id,
                locale: locale.clone(),
                slug: slug.clone(),
            })
            .collect();
        slugs.sort_by(|a, b| (a.node_id, &a.locale).cmp(&(b.node_id, &b.locale)));

        let mut paths: Vec<PathRecord> = Vec::new();
        for node in &nodes {
            for locale in self.registry.locales() {
                if let Some(path) = self.cache.get(node.id, &locale.id) {
                    paths.push(PathRecord {
                        node_id: node.id,
                        locale: locale.id.clone(),
                        path,
                    });
                }
            }
        }

        SiteSnapshot {
            locales: self.registry.locales().to_vec(),
            nodes,
            slugs,
            paths,
        }
    }

    /// Rebuild a site from persisted state.
    ///
    /// Enforces the write-time invariants on the authoritative tables:
    /// a valid registry and tree, a valid default-locale slug on every
    /// node, known locales, and sibling slug uniqueness per locale.
    /// Cached path rows referencing unknown nodes or locales are
    /// dropped with a warning, never fatal.
    pub fn from_snapshot(snapshot: SiteSnapshot) -> SiteResult<Self> {
        let registry = LocaleRegistry::new(snapshot.locales)?;
        let tree = PageTree::from_nodes(snapshot.nodes)?;

        let mut slugs: HashMap<(Uuid, String), String> = HashMap::new();
        for record in snapshot.slugs {
            if !tree.contains(record.node_id) {
                return Err(SiteError::Config(format!(
                    "slug row references unknown node {}",
                    record.node_id
                )));
            }
            registry.require(&record.locale)?;
            validate_slug(&record.slug)?;
            if slugs
                .insert((record.node_id, record.locale.clone()), record.slug)
                .is_some()
            {
                return Err(SiteError::Config(format!(
                    "duplicate slug row for node {} locale '{}'",
                    record.node_id, record.locale
                )));
            }
        }

        let default = &registry.default_locale().id;
        for node in tree.iter_path_order() {
            if !slugs.contains_key(&(node.id, default.clone())) {
                return Err(SiteError::Config(format!(
                    "node {} is missing its default-locale slug",
                    node.id
                )));
            }
        }

        // Sibling uniqueness per locale over the stored slugs.
        for node in tree.iter_path_order() {
            for locale in registry.locales() {
                let mut seen: HashSet<&str> = HashSet::new();
                for child in tree.children(node.id) {
                    let Some(slug) = slugs.get(&(child, locale.id.clone())) else {
                        continue;
                    };
                    if !seen.insert(slug.as_str()) {
                        return Err(SiteError::DuplicateSlug {
                            slug: slug.clone(),
                            locale: locale.id.clone(),
                        });
                    }
                }
            }
        }

        let cache = PathCache::new();
        for record in snapshot.paths {
            if !tree.contains(record.node_id) || !registry.contains(&record.locale) {
                warn!(
                    node = %record.node_id,
                    locale = %record.locale,
                    "dropping cached path row with unknown node or locale"
                );
                continue;
            }
            cache.insert(record.node_id, &record.locale, record.path);
        }

        Ok(Self {
            registry,
            tree,
            slugs,
            cache,
        })
    }
}
