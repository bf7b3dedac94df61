//! Site facade: locale registry, page tree, localized slug store, and
//! cached materialized paths.
//!
//! Slugs are the authoritative data, keyed by (node, locale); cached
//! paths are derived and rederivable at any time. Mutations evict the
//! affected cache entries; recomputation happens lazily on the next
//! path lookup (the repair tool recomputes eagerly).
//!
//! Not internally thread-safe beyond the read-path cache: the host is
//! expected to serialize writers per subtree.

use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{SiteError, SiteResult};
use crate::locale::LocaleRegistry;
use crate::path::PathCache;
use crate::slug::{slugify, validate_slug};
use crate::tree::PageTree;

/// A localized content tree.
#[derive(Debug)]
pub struct Site {
    pub(crate) registry: LocaleRegistry,
    pub(crate) tree: PageTree,
    /// Slug table keyed by (node id, locale id). Authoritative.
    pub(crate) slugs: HashMap<(Uuid, String), String>,
    /// Cached materialized paths. Derived data.
    pub(crate) cache: PathCache,
}

impl Site {
    /// Create a site with a lone root node carrying `root_slug` in the
    /// default locale. The root slug never appears in materialized paths
    /// but is addressable like any other (e.g. for menu labels).
    pub fn new(registry: LocaleRegistry, root_slug: &str) -> SiteResult<Self> {
        validate_slug(root_slug)?;
        let tree = PageTree::new();
        let mut slugs = HashMap::new();
        slugs.insert(
            (tree.root(), registry.default_locale().id.clone()),
            root_slug.to_string(),
        );
        Ok(Self {
            registry,
            tree,
            slugs,
            cache: PathCache::new(),
        })
    }

    /// The locale registry.
    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    /// The underlying page tree.
    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    /// The root node id.
    pub fn root(&self) -> Uuid {
        self.tree.root()
    }

    /// Insert a new node as the last child of `parent` with its mandatory
    /// default-locale slug.
    pub fn add_child(&mut self, parent: Uuid, default_slug: &str) -> SiteResult<Uuid> {
        validate_slug(default_slug)?;
        self.tree.node(parent)?;
        let default = self.registry.default_locale().id.clone();
        if self.sibling_slug_taken(parent, &default, default_slug, None) {
            return Err(SiteError::DuplicateSlug {
                slug: default_slug.to_string(),
                locale: default,
            });
        }
        let id = self.tree.add_child(parent)?;
        self.slugs.insert((id, default), default_slug.to_string());
        debug!(node = %id, slug = %default_slug, "added child node");
        Ok(id)
    }

    /// Insert a new child deriving its default-locale slug from a title.
    pub fn add_child_with_title(&mut self, parent: Uuid, title: &str) -> SiteResult<Uuid> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(SiteError::InvalidSlug(format!(
                "title '{title}' produces an empty slug"
            )));
        }
        self.add_child(parent, &slug)
    }

    /// The stored slug for (node, locale), if any.
    pub fn get_slug(&self, node: Uuid, locale: &str) -> Option<&str> {
        self.slugs
            .get(&(node, locale.to_string()))
            .map(String::as_str)
    }

    /// The slug a locale actually uses for a node: the locale-specific
    /// slug when present, else the default-locale slug (fallback).
    pub fn resolve_effective_slug(&self, node: Uuid, locale: &str) -> SiteResult<&str> {
        self.registry.require(locale)?;
        self.tree.node(node)?;
        if let Some(slug) = self.get_slug(node, locale) {
            return Ok(slug);
        }
        let default = &self.registry.default_locale().id;
        self.get_slug(node, default).ok_or_else(|| {
            SiteError::Config(format!("node {node} is missing its default-locale slug"))
        })
    }

    /// Set the slug for (node, locale).
    ///
    /// Fails with [`SiteError::DuplicateSlug`] when a sibling already
    /// holds this slug for this locale. On success evicts cached paths
    /// for the node and all descendants in the changed locale; a
    /// default-locale change also evicts every locale that falls back to
    /// the default segment on this node.
    pub fn set_slug(&mut self, node: Uuid, locale: &str, slug: &str) -> SiteResult<()> {
        let locale = self.registry.require(locale)?.id.clone();
        let parent = self.tree.node(node)?.parent;
        validate_slug(slug)?;

        // Unchanged value: nothing to evict.
        if self.get_slug(node, &locale) == Some(slug) {
            return Ok(());
        }

        if let Some(parent) = parent {
            if self.sibling_slug_taken(parent, &locale, slug, Some(node)) {
                return Err(SiteError::DuplicateSlug {
                    slug: slug.to_string(),
                    locale,
                });
            }
        }

        self.slugs.insert((node, locale.clone()), slug.to_string());
        let affected = self.affected_locales(node, &locale);
        self.invalidate_paths(node, &affected);
        info!(node = %node, locale = %locale, slug = %slug, "slug updated");
        Ok(())
    }

    /// Remove a locale-specific slug override so the node falls back to
    /// its default-locale slug. The default-locale slug itself is
    /// mandatory and cannot be cleared.
    pub fn clear_slug(&mut self, node: Uuid, locale: &str) -> SiteResult<()> {
        let locale = self.registry.require(locale)?.id.clone();
        if locale == self.registry.default_locale().id {
            return Err(SiteError::InvalidSlug(
                "the default-locale slug is mandatory and cannot be cleared".into(),
            ));
        }
        self.tree.node(node)?;
        if self.slugs.remove(&(node, locale.clone())).is_some() {
            self.invalidate_paths(node, std::slice::from_ref(&locale));
            info!(node = %node, locale = %locale, "slug override cleared");
        }
        Ok(())
    }

    /// Move a node (with its subtree) under a new parent.
    ///
    /// Rejects slug collisions with the new siblings in any locale before
    /// touching the tree, then evicts cached paths for the moved subtree
    /// in every locale (the whole ancestor chain changed).
    pub fn move_node(&mut self, node: Uuid, new_parent: Uuid) -> SiteResult<()> {
        self.tree.node(node)?;
        self.tree.node(new_parent)?;
        for locale in self.registry.locales() {
            if let Some(slug) = self.get_slug(node, &locale.id) {
                if self.sibling_slug_taken(new_parent, &locale.id, slug, Some(node)) {
                    return Err(SiteError::DuplicateSlug {
                        slug: slug.to_string(),
                        locale: locale.id.clone(),
                    });
                }
            }
        }

        self.tree.move_subtree(node, new_parent)?;
        let all: Vec<String> = self
            .registry
            .locales()
            .iter()
            .map(|l| l.id.clone())
            .collect();
        self.invalidate_paths(node, &all);
        info!(node = %node, new_parent = %new_parent, "node moved");
        Ok(())
    }

    /// Remove a node and its subtree, cascading slug and cached-path
    /// deletion for every removed node.
    pub fn remove_node(&mut self, node: Uuid) -> SiteResult<()> {
        let removed = self.tree.remove_subtree(node)?;
        self.slugs.retain(|(id, _), _| !removed.contains(id));
        for id in &removed {
            self.cache.remove_node(*id);
        }
        info!(node = %node, count = removed.len(), "removed subtree");
        Ok(())
    }

    /// Whether another child of `parent` already holds `slug` for
    /// `locale`. Absent slugs do not participate.
    fn sibling_slug_taken(
        &self,
        parent: Uuid,
        locale: &str,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> bool {
        self.tree
            .children(parent)
            .into_iter()
            .filter(|child| Some(*child) != exclude)
            .any(|child| self.get_slug(child, locale) == Some(slug))
    }

    /// Locales whose paths are stale after a slug change on `node`.
    ///
    /// A non-default change affects only its own locale. A default-locale
    /// change also affects every locale with no override on this node,
    /// because their segment falls back to the default slug.
    fn affected_locales(&self, node: Uuid, changed: &str) -> Vec<String> {
        let default = &self.registry.default_locale().id;
        if changed != default {
            return vec![changed.to_string()];
        }
        let mut locales = vec![default.clone()];
        for locale in self.registry.locales() {
            if !locale.is_default && self.get_slug(node, &locale.id).is_none() {
                locales.push(locale.id.clone());
            }
        }
        locales
    }

    /// Evict cached paths for a node and all its descendants in the given
    /// locales.
    fn invalidate_paths(&self, node: Uuid, locales: &[String]) {
        let mut ids = vec![node];
        ids.extend(self.tree.descendants(node));
        let mut evicted = 0usize;
        for id in &ids {
            for locale in locales {
                if self.cache.remove(*id, locale) {
                    evicted += 1;
                }
            }
        }
        debug!(node = %node, locales = locales.len(), evicted, "evicted cached paths");
    }
}
