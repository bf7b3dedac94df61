#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for batch path repair and snapshot persistence.

mod common;

use common::TestSite;
use sentiero::snapshot::{PathRecord, SiteSnapshot};
use sentiero::{Site, SiteError};
use uuid::Uuid;

#[test]
fn test_rebuild_then_snapshot_round_trip() {
    let TestSite {
        mut site,
        child,
        grandchild,
    } = TestSite::new();
    let written = site.rebuild_all_paths().unwrap();
    // 3 nodes x 3 locales
    assert_eq!(written, 9);

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("site.json");
    site.snapshot().save(&file).unwrap();

    let restored = Site::from_snapshot(SiteSnapshot::load(&file).unwrap()).unwrap();
    assert_eq!(restored.cached_path(child, "en").unwrap(), "/child-en/");
    assert_eq!(restored.cached_path(grandchild, "de").unwrap(), "/child/gc/");
    assert_eq!(restored.cached_path(grandchild, "fr").unwrap(), "/child/gc/");
}

#[test]
fn test_rebuild_is_idempotent_through_persistence() {
    let TestSite { mut site, .. } = TestSite::new();
    site.rebuild_all_paths().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("site.json");
    site.snapshot().save(&file).unwrap();
    let first = std::fs::read_to_string(&file).unwrap();

    // Load, repair again, save: output must be byte-identical
    let mut again = Site::from_snapshot(SiteSnapshot::load(&file).unwrap()).unwrap();
    again.rebuild_all_paths().unwrap();
    again.snapshot().save(&file).unwrap();
    let second = std::fs::read_to_string(&file).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_rebuild_repairs_corrupted_paths() {
    let TestSite {
        mut site,
        grandchild,
        ..
    } = TestSite::new();
    site.rebuild_all_paths().unwrap();
    let mut snapshot = site.snapshot();

    // Corrupt every cached row for the grandchild and add a ghost row
    for row in &mut snapshot.paths {
        if row.node_id == grandchild {
            row.path = "not a path".into();
        }
    }
    snapshot.paths.push(PathRecord {
        node_id: Uuid::now_v7(),
        locale: "de".into(),
        path: "/ghost/".into(),
    });

    let mut repaired = Site::from_snapshot(snapshot).unwrap();
    repaired.rebuild_all_paths().unwrap();
    assert_eq!(repaired.cached_path(grandchild, "de").unwrap(), "/child/gc/");
    assert_eq!(
        repaired.cached_path(grandchild, "en").unwrap(),
        "/child-en/gc-en/"
    );
}

#[test]
fn test_rebuild_backfills_missing_locale_entries() {
    let TestSite { mut site, .. } = TestSite::new();
    site.rebuild_all_paths().unwrap();
    let mut snapshot = site.snapshot();

    // Drop all fr rows, as if the locale was just added
    snapshot.paths.retain(|row| row.locale != "fr");

    let mut repaired = Site::from_snapshot(snapshot).unwrap();
    repaired.rebuild_all_paths().unwrap();
    for node in repaired.tree().iter_path_order() {
        assert_eq!(
            repaired.cached_path(node.id, "fr").unwrap(),
            repaired.compute_path(node.id, "fr").unwrap()
        );
    }
}

#[test]
fn test_snapshot_invariant_violations_are_fatal() {
    let TestSite { mut site, child, .. } = TestSite::new();
    site.rebuild_all_paths().unwrap();
    let mut snapshot = site.snapshot();
    snapshot
        .slugs
        .retain(|row| !(row.node_id == child && row.locale == "de"));

    assert!(matches!(
        Site::from_snapshot(snapshot),
        Err(SiteError::Config(_))
    ));
}
