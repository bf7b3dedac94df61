#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Shared fixtures for integration tests.

use sentiero::{Locale, LocaleRegistry, Site};
use uuid::Uuid;

/// A small localized site: de (default), en, fr (never translated).
pub struct TestSite {
    pub site: Site,
    pub child: Uuid,
    pub grandchild: Uuid,
}

impl TestSite {
    /// root (default "root", no en override)
    ///   └ child (default "child", en "child-en")
    ///       └ grandchild (default "gc", en "gc-en")
    pub fn new() -> Self {
        let registry = LocaleRegistry::new(vec![
            Locale::new_default("de"),
            Locale::new("en"),
            Locale::new("fr"),
        ])
        .unwrap();
        let mut site = Site::new(registry, "root").unwrap();
        let child = site.add_child(site.root(), "child").unwrap();
        site.set_slug(child, "en", "child-en").unwrap();
        let grandchild = site.add_child(child, "gc").unwrap();
        site.set_slug(grandchild, "en", "gc-en").unwrap();
        Self {
            site,
            child,
            grandchild,
        }
    }
}
