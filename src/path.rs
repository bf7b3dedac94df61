//! Materialized path cache and path computation.
//!
//! A path is the `/`-joined effective slug of every ancestor from root
//! to node, with a trailing separator; the root contributes only the
//! leading separator, so the root path is `/`.

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::SiteResult;
use crate::site::Site;

/// In-memory cache of materialized paths.
///
/// Keys combine node id and locale with a null byte separator so locale
/// ids can never collide with id fragments.
#[derive(Debug, Default)]
pub struct PathCache {
    cache: DashMap<String, String>,
}

/// Build a cache key from node id and locale.
fn cache_key(node: Uuid, locale: &str) -> String {
    format!("{node}\0{locale}")
}

impl PathCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Cached path for (node, locale), if present.
    pub fn get(&self, node: Uuid, locale: &str) -> Option<String> {
        self.cache
            .get(&cache_key(node, locale))
            .map(|entry| entry.value().clone())
    }

    /// Store a path for (node, locale), overwriting any previous entry.
    pub fn insert(&self, node: Uuid, locale: &str, path: String) {
        self.cache.insert(cache_key(node, locale), path);
    }

    /// Evict the entry for (node, locale). Returns whether one existed.
    pub fn remove(&self, node: Uuid, locale: &str) -> bool {
        self.cache.remove(&cache_key(node, locale)).is_some()
    }

    /// Evict every locale's entry for a node.
    pub fn remove_node(&self, node: Uuid) {
        let prefix = format!("{node}\0");
        self.cache.retain(|key, _| !key.starts_with(&prefix));
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Site {
    /// Absolute path for a node under a locale.
    ///
    /// Returns the cached value when present; otherwise computes it from
    /// the parent's path plus the node's effective slug and caches the
    /// result. Missing locale-specific slugs fall back per segment to the
    /// default locale.
    pub fn path_for(&self, node: Uuid, locale: &str) -> SiteResult<String> {
        self.registry.require(locale)?;
        let record = self.tree.node(node)?;
        if let Some(path) = self.cache.get(node, locale) {
            return Ok(path);
        }
        let path = match record.parent {
            None => "/".to_string(),
            Some(parent) => {
                let parent_path = self.path_for(parent, locale)?;
                let slug = self.resolve_effective_slug(node, locale)?;
                format!("{parent_path}{slug}/")
            }
        };
        self.cache.insert(node, locale, path.clone());
        Ok(path)
    }

    /// Recompute a path from slugs alone, bypassing and not touching the
    /// cache. Used by the repair tool and as an independent oracle in
    /// tests.
    pub fn compute_path(&self, node: Uuid, locale: &str) -> SiteResult<String> {
        self.registry.require(locale)?;
        let mut chain = self.tree.ancestors(node)?;
        chain.push(node);
        let mut path = String::from("/");
        // The root contributes only the leading separator.
        for id in chain.into_iter().skip(1) {
            path.push_str(self.resolve_effective_slug(id, locale)?);
            path.push('/');
        }
        Ok(path)
    }

    /// The cached path for (node, locale), if any. Derived data; absence
    /// only means the next [`Site::path_for`] call recomputes.
    pub fn cached_path(&self, node: Uuid, locale: &str) -> Option<String> {
        self.cache.get(node, locale)
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locale::{Locale, LocaleRegistry};

    fn site() -> Site {
        let registry = LocaleRegistry::new(vec![
            Locale::new_default("de"),
            Locale::new("en"),
        ])
        .unwrap();
        Site::new(registry, "root").unwrap()
    }

    #[test]
    fn cache_key_no_collision() {
        let a = Uuid::now_v7();
        assert_ne!(cache_key(a, "en"), cache_key(a, "en-us"));
        assert_ne!(cache_key(a, "en"), cache_key(Uuid::now_v7(), "en"));
    }

    #[test]
    fn root_path_is_separator() {
        let site = site();
        assert_eq!(site.path_for(site.root(), "de").unwrap(), "/");
        assert_eq!(site.path_for(site.root(), "en").unwrap(), "/");
    }

    #[test]
    fn paths_join_effective_slugs() {
        let mut site = site();
        let child = site.add_child(site.root(), "child").unwrap();
        site.set_slug(child, "en", "child-en").unwrap();
        let grandchild = site.add_child(child, "gc").unwrap();
        site.set_slug(grandchild, "en", "gc-en").unwrap();

        assert_eq!(site.path_for(child, "de").unwrap(), "/child/");
        assert_eq!(site.path_for(child, "en").unwrap(), "/child-en/");
        assert_eq!(site.path_for(grandchild, "de").unwrap(), "/child/gc/");
        assert_eq!(site.path_for(grandchild, "en").unwrap(), "/child-en/gc-en/");
    }

    #[test]
    fn own_segment_falls_back_while_ancestors_translate() {
        let mut site = site();
        let child = site.add_child(site.root(), "child").unwrap();
        site.set_slug(child, "en", "child-en").unwrap();
        let grandchild = site.add_child(child, "gc").unwrap();

        // grandchild has no "en" slug; its segment falls back while the
        // ancestor keeps its translation
        assert_eq!(site.path_for(grandchild, "en").unwrap(), "/child-en/gc/");
    }

    #[test]
    fn path_for_matches_independent_recomputation() {
        let mut site = site();
        let child = site.add_child(site.root(), "child").unwrap();
        site.set_slug(child, "en", "child-en").unwrap();
        let grandchild = site.add_child(child, "gc").unwrap();

        for node in [site.root(), child, grandchild] {
            for locale in ["de", "en"] {
                assert_eq!(
                    site.path_for(node, locale).unwrap(),
                    site.compute_path(node, locale).unwrap()
                );
            }
        }
    }

    #[test]
    fn slug_change_evicts_descendants_in_locale() {
        let mut site = site();
        let child = site.add_child(site.root(), "child").unwrap();
        site.set_slug(child, "en", "child-en").unwrap();
        let grandchild = site.add_child(child, "gc").unwrap();
        site.set_slug(grandchild, "en", "gc-en").unwrap();

        // Warm the cache
        site.path_for(grandchild, "de").unwrap();
        site.path_for(grandchild, "en").unwrap();

        site.set_slug(child, "de", "child2").unwrap();

        assert_eq!(site.path_for(grandchild, "de").unwrap(), "/child2/gc/");
        // The en path is unchanged: child has an en override
        assert_eq!(site.path_for(grandchild, "en").unwrap(), "/child-en/gc-en/");
    }

    #[test]
    fn default_change_propagates_to_fallback_locales() {
        let mut site = site();
        let child = site.add_child(site.root(), "child").unwrap();
        let grandchild = site.add_child(child, "gc").unwrap();

        // No en overrides anywhere: en paths mirror de paths
        assert_eq!(site.path_for(grandchild, "en").unwrap(), "/child/gc/");

        site.set_slug(child, "de", "kind").unwrap();
        assert_eq!(site.path_for(grandchild, "de").unwrap(), "/kind/gc/");
        assert_eq!(site.path_for(grandchild, "en").unwrap(), "/kind/gc/");
    }

    #[test]
    fn move_evicts_all_locales() {
        let mut site = site();
        let child = site.add_child(site.root(), "child").unwrap();
        site.set_slug(child, "en", "child-en").unwrap();
        let child2 = site.add_child(site.root(), "child2").unwrap();
        let grandchild2 = site.add_child(child2, "grandchild2").unwrap();

        site.path_for(grandchild2, "de").unwrap();
        site.path_for(grandchild2, "en").unwrap();

        site.move_node(child2, child).unwrap();

        assert_eq!(site.path_for(child2, "de").unwrap(), "/child/child2/");
        assert_eq!(site.path_for(child2, "en").unwrap(), "/child-en/child2/");
        assert_eq!(
            site.path_for(grandchild2, "de").unwrap(),
            "/child/child2/grandchild2/"
        );
        assert_eq!(
            site.path_for(grandchild2, "en").unwrap(),
            "/child-en/child2/grandchild2/"
        );
    }

    #[test]
    fn path_cache_remove_node() {
        let cache = PathCache::new();
        let node = Uuid::now_v7();
        cache.insert(node, "de", "/a/".into());
        cache.insert(node, "en", "/b/".into());
        cache.insert(Uuid::now_v7(), "de", "/c/".into());
        cache.remove_node(node);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(node, "de").is_none());
    }
}
