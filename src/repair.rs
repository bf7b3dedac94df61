//! Batch recomputation of materialized paths.
//!
//! Walks the tree ancestors-first so every parent path is fresh before
//! its children compute theirs. Stale or corrupt cache entries are
//! silently overwritten; running twice with no intervening mutation
//! yields identical results.

use tracing::info;
use uuid::Uuid;

use crate::error::SiteResult;
use crate::site::Site;

impl Site {
    /// Eagerly recompute and store the path for every (node, locale)
    /// pair. Returns the number of entries written.
    pub fn rebuild_all_paths(&mut self) -> SiteResult<usize> {
        let locales: Vec<String> = self
            .registry
            .locales()
            .iter()
            .map(|l| l.id.clone())
            .collect();
        self.rebuild_paths(&locales)
    }

    /// Eagerly recompute paths for a single locale.
    pub fn rebuild_locale_paths(&mut self, locale: &str) -> SiteResult<usize> {
        let locale = self.registry.require(locale)?.id.clone();
        self.rebuild_paths(&[locale])
    }

    fn rebuild_paths(&mut self, locales: &[String]) -> SiteResult<usize> {
        let order: Vec<(Uuid, Option<Uuid>)> = self
            .tree
            .iter_path_order()
            .map(|n| (n.id, n.parent))
            .collect();

        let mut written = 0usize;
        for (id, parent) in order {
            for locale in locales {
                let path = match parent {
                    None => "/".to_string(),
                    Some(parent_id) => {
                        // Ancestors-first order means the parent entry was
                        // rewritten in this pass.
                        let parent_path = match self.cache.get(parent_id, locale) {
                            Some(path) => path,
                            None => self.compute_path(parent_id, locale)?,
                        };
                        let slug = self.resolve_effective_slug(id, locale)?;
                        format!("{parent_path}{slug}/")
                    }
                };
                self.cache.insert(id, locale, path);
                written += 1;
            }
        }

        info!(entries = written, locales = locales.len(), "rebuilt materialized paths");
        Ok(written)
    }
}
