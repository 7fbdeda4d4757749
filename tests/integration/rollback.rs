//! Integration tests for failed filesystem syncs

use super::support::{start_time, Fixture};
use chrono::Duration;
use std::fs;
use tagtree::error::ModelError;
use tagtree::types::Parent;

/// A directory move the filesystem refuses leaves the model exactly as it was
#[test]
fn test_failed_directory_move_rolls_back() {
    let fx = Fixture::new();
    fx.touch("A/B/X.jpg");
    fx.mkdir("C");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let b = fx.dir(&registry, "A/B");
    let c = fx.dir(&registry, "C");
    let x = fx.item(&registry, "A/B/X.jpg");
    let b_count = registry.tree().directory(b).unwrap().history().count();
    let c_count = registry.tree().directory(c).unwrap().history().count();

    fx.faults.fail_moves_into(&fx.path("C"));
    let err = registry.tree_mut().move_directory(&fx.ctx, b, c).unwrap_err();
    assert!(err.is_io());

    let tree = registry.tree();
    let dir = tree.directory(b).unwrap();
    let last = dir.history().last();
    assert_eq!(dir.parent(), &Parent::Directory(a));
    assert_eq!(dir.parent(), &last.state().parent);
    assert_eq!(dir.name(), last.state().name);
    assert_eq!(dir.history().count(), b_count);
    assert_eq!(tree.directory(c).unwrap().history().count(), c_count);
    assert!(tree.directory(a).unwrap().subdirectory_ids().contains(&b));
    assert_eq!(tree.item_path(x).unwrap(), fx.path("A/B/X.jpg"));
    assert!(fx.exists("A/B/X.jpg"));

    fx.faults.clear();
    registry.tree_mut().move_directory(&fx.ctx, b, c).unwrap();
    assert!(fx.exists("C/B/X.jpg"));
}

#[test]
fn test_failed_rename_restores_tags() {
    let fx = Fixture::new();
    fx.touch("photo - @a.jpg");
    let mut registry = fx.scan();
    let id = fx.item(&registry, "photo - @a.jpg");
    let audit_before = fx.ctx.audit_log().len();

    fx.faults.fail_all_moves();
    let err = registry.tree_mut().add_tag(&fx.ctx, id, "b").unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }));

    let item = registry.tree().item(id).unwrap();
    assert_eq!(item.tagged_name(), "photo - @a");
    assert_eq!(item.history().count(), 1);
    assert_eq!(fx.ctx.audit_log().len(), audit_before);
    assert!(fx.exists("photo - @a.jpg"));
}

/// An untracked file already at the destination is never overwritten
#[test]
fn test_rename_onto_existing_file_fails() {
    let fx = Fixture::new();
    fx.touch("photo.jpg");
    let mut registry = fx.scan();
    let id = fx.item(&registry, "photo.jpg");
    fs::write(fx.path("photo - @x.jpg"), "other").unwrap();

    let err = registry.tree_mut().add_tag(&fx.ctx, id, "x").unwrap_err();
    assert!(err.is_io());
    assert_eq!(registry.tree().item(id).unwrap().file_name(), "photo.jpg");
    assert_eq!(fs::read_to_string(fx.path("photo - @x.jpg")).unwrap(), "other");
    assert!(fx.exists("photo.jpg"));
}

#[test]
fn test_failed_item_move_keeps_membership() {
    let fx = Fixture::new();
    fx.touch("A/X.jpg");
    fx.mkdir("B");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let b = fx.dir(&registry, "B");
    let x = fx.item(&registry, "A/X.jpg");

    fx.faults.fail_moves_into(&fx.path("B"));
    assert!(registry.tree_mut().move_item(&fx.ctx, x, b).unwrap_err().is_io());

    let tree = registry.tree();
    let item = tree.item(x).unwrap();
    let last = item.history().last();
    assert_eq!(item.directory(), a);
    assert_eq!(item.directory(), last.state().parent);
    assert_eq!(item.tagged_name(), last.state().tagged_name());
    assert_eq!(tree.item_path(x).unwrap(), fx.path("A/X.jpg"));
    assert!(tree.directory(a).unwrap().item_ids().contains(&x));
    assert!(tree.directory(b).unwrap().item_ids().is_empty());
    assert!(fx.exists("A/X.jpg"));
}

#[test]
fn test_cyclic_directory_move_is_rejected() {
    let fx = Fixture::new();
    fx.touch("A/B/X.jpg");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let b = fx.dir(&registry, "A/B");
    let a_count = registry.tree().directory(a).unwrap().history().count();

    let err = registry.tree_mut().move_directory(&fx.ctx, a, b).unwrap_err();
    assert!(matches!(err, ModelError::CyclicMove { .. }));
    let err = registry.tree_mut().move_directory(&fx.ctx, a, a).unwrap_err();
    assert!(matches!(err, ModelError::CyclicMove { .. }));

    let tree = registry.tree();
    assert_eq!(tree.directory(a).unwrap().history().count(), a_count);
    assert_eq!(tree.directory(b).unwrap().parent(), &Parent::Directory(a));
    assert!(fx.exists("A/B/X.jpg"));
}

/// A clock reading older than the last snapshot is refused before the file moves
#[test]
fn test_clock_behind_history_leaves_file_in_place() {
    let fx = Fixture::new();
    fx.touch("photo.jpg");
    let mut registry = fx.scan();
    let id = fx.item(&registry, "photo.jpg");

    fx.clock.set(start_time() - Duration::days(1));
    let err = registry.tree_mut().add_tag(&fx.ctx, id, "beach").unwrap_err();
    assert!(matches!(err, ModelError::NonMonotonicTime { .. }));

    let item = registry.tree().item(id).unwrap();
    assert_eq!(item.tagged_name(), item.history().last().state().tagged_name());
    assert_eq!(item.tagged_name(), "photo");
    assert_eq!(item.history().count(), 1);
    assert!(fx.exists("photo.jpg"));
    assert!(!fx.exists("photo - @beach.jpg"));

    fx.clock.set(start_time() + Duration::hours(1));
    registry.tree_mut().add_tag(&fx.ctx, id, "sunset").unwrap();
    assert!(fx.exists("photo - @sunset.jpg"));
    assert_eq!(registry.tree().item(id).unwrap().history().count(), 2);
}

/// An ancestor's newer snapshot also blocks the change, so the cascade never
/// fails after the file has moved
#[test]
fn test_clock_behind_ancestor_leaves_file_in_place() {
    let fx = Fixture::new();
    fx.touch("A/X.jpg");
    fx.touch("A/Y.jpg");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let x = fx.item(&registry, "A/X.jpg");
    let y = fx.item(&registry, "A/Y.jpg");
    let x_last = registry.tree().item(x).unwrap().history().last().taken_at();

    registry.tree_mut().add_tag(&fx.ctx, y, "y").unwrap();
    let a_count = registry.tree().directory(a).unwrap().history().count();

    fx.clock.set(x_last);
    let err = registry.tree_mut().add_tag(&fx.ctx, x, "x").unwrap_err();
    assert!(matches!(err, ModelError::NonMonotonicTime { .. }));

    let tree = registry.tree();
    assert_eq!(tree.item(x).unwrap().tagged_name(), "X");
    assert_eq!(tree.item(x).unwrap().history().count(), 1);
    assert_eq!(tree.directory(a).unwrap().history().count(), a_count);
    assert!(fx.exists("A/X.jpg"));
    assert!(!fx.exists("A/X - @x.jpg"));
}
