//! Path resolution: walking the tree by localized slug segments.

use tracing::debug;
use uuid::Uuid;

use crate::error::{SiteError, SiteResult};
use crate::site::Site;

impl Site {
    /// Resolve a sequence of slug segments to a node under an active
    /// locale, starting at the root.
    ///
    /// At each level the child whose effective slug (locale-specific, or
    /// default-locale fallback) equals the current segment is selected.
    /// Sibling slug uniqueness is enforced at write time, so the first
    /// match is the only match. An empty segment list resolves to the
    /// root.
    pub fn resolve(&self, segments: &[&str], locale: &str) -> SiteResult<Uuid> {
        self.registry.require(locale)?;
        let mut current = self.root();
        for segment in segments {
            let mut next = None;
            for child in self.tree.children(current) {
                if self.resolve_effective_slug(child, locale)? == *segment {
                    next = Some(child);
                    break;
                }
            }
            let Some(found) = next else {
                debug!(segment, locale, "no child matches segment");
                return Err(SiteError::NotFound);
            };
            current = found;
        }
        Ok(current)
    }

    /// Resolve a full path string (`/child/gc/`), ignoring empty
    /// segments, so leading and trailing separators are both accepted.
    pub fn resolve_path(&self, path: &str, locale: &str) -> SiteResult<Uuid> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.resolve(&segments, locale)
    }
}
