//! Integration tests for reverting images and whole directory trees

use super::support::Fixture;
use chrono::Duration;
use tagtree::error::ModelError;

#[test]
fn test_revert_item_to_earlier_name() {
    let fx = Fixture::new();
    fx.touch("photo.jpg");
    let mut registry = fx.scan();
    let id = fx.item(&registry, "photo.jpg");
    registry.tree_mut().add_tag(&fx.ctx, id, "a").unwrap();
    registry.tree_mut().add_tag(&fx.ctx, id, "b").unwrap();

    let original = registry.tree().item(id).unwrap().history().snap(1).unwrap();
    registry.tree_mut().revert_item(&fx.ctx, id, &original).unwrap();

    assert!(fx.exists("photo.jpg"));
    assert!(!fx.exists("photo - @a @b.jpg"));
    let history = registry.tree().item(id).unwrap().history();
    assert_eq!(history.count(), 4);
    assert_eq!(history.last().state().tagged_name(), "photo");
    assert_eq!(history.snap(0).unwrap().state().tagged_name(), "photo - @a @b");
}

/// Reverting an image that moved puts it back in its old directory
#[test]
fn test_revert_item_across_directories() {
    let fx = Fixture::new();
    fx.touch("A/X.jpg");
    fx.mkdir("B");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let b = fx.dir(&registry, "B");
    let x = fx.item(&registry, "A/X.jpg");

    registry.tree_mut().move_item(&fx.ctx, x, b).unwrap();
    registry.tree_mut().add_tag(&fx.ctx, x, "moved").unwrap();
    let before_move = registry.tree().item(x).unwrap().history().snap(1).unwrap();
    registry.tree_mut().revert_item(&fx.ctx, x, &before_move).unwrap();

    assert!(fx.exists("A/X.jpg"));
    assert!(!fx.exists("B/X - @moved.jpg"));
    let tree = registry.tree();
    assert_eq!(tree.item(x).unwrap().directory(), a);
    assert!(tree.directory(a).unwrap().item_ids().contains(&x));
    assert!(!tree.directory(b).unwrap().item_ids().contains(&x));
}

#[test]
fn test_revert_rejects_foreign_snapshot() {
    let fx = Fixture::new();
    fx.touch("one.jpg");
    fx.touch("two.jpg");
    let mut registry = fx.scan();
    let one = fx.item(&registry, "one.jpg");
    let two = fx.item(&registry, "two.jpg");

    let foreign = registry.tree().item(two).unwrap().history().last();
    let err = registry.tree_mut().revert_item(&fx.ctx, one, &foreign).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
    assert_eq!(registry.tree().item(one).unwrap().history().count(), 1);
}

/// Reverting a directory takes every descendant back to how it was at the
/// snapshot's time; children added later are left alone
#[test]
fn test_recursive_directory_revert() {
    let fx = Fixture::new();
    fx.touch("A/X.jpg");
    fx.touch("A/S/Y.jpg");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let s = fx.dir(&registry, "A/S");
    let x = fx.item(&registry, "A/X.jpg");
    let y = fx.item(&registry, "A/S/Y.jpg");
    let target = registry.tree().directory(a).unwrap().history().last();

    fx.clock.advance(Duration::minutes(5));
    registry.tree_mut().add_tag(&fx.ctx, x, "late").unwrap();
    registry.tree_mut().add_tag(&fx.ctx, y, "late").unwrap();
    registry.tree_mut().rename_directory(&fx.ctx, s, "T").unwrap();
    registry.tree_mut().rename_directory(&fx.ctx, a, "Album").unwrap();
    let z_path = fx.touch("Album/Z.jpg");
    let z = registry.tree_mut().track_item(&fx.ctx, &z_path, a).unwrap();
    assert!(fx.exists("Album/T/Y - @late.jpg"));

    registry.tree_mut().revert_directory(&fx.ctx, a, &target).unwrap();

    assert!(fx.exists("A/X.jpg"));
    assert!(fx.exists("A/S/Y.jpg"));
    assert!(fx.exists("A/Z.jpg"));
    assert!(!fx.exists("Album"));
    let tree = registry.tree();
    assert_eq!(tree.directory(a).unwrap().name(), "A");
    assert_eq!(tree.directory(s).unwrap().name(), "S");
    assert!(tree.item(x).unwrap().tags().is_empty());
    assert!(tree.item(y).unwrap().tags().is_empty());
    assert_eq!(tree.item(z).unwrap().directory(), a);
}

/// If a late step of a directory revert fails, the steps already taken are undone
#[test]
fn test_failed_directory_revert_is_compensated() {
    let fx = Fixture::new();
    fx.touch("A/X.jpg");
    fx.touch("A/S/Y.jpg");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let x = fx.item(&registry, "A/X.jpg");
    let y = fx.item(&registry, "A/S/Y.jpg");
    let target = registry.tree().directory(a).unwrap().history().last();

    registry.tree_mut().add_tag(&fx.ctx, x, "late").unwrap();
    registry.tree_mut().add_tag(&fx.ctx, y, "late").unwrap();
    registry.tree_mut().rename_directory(&fx.ctx, a, "Album").unwrap();

    // Children revert inside Album; only the final rename back to A fails.
    fx.faults.fail_moves_into(&fx.path("A"));
    let err = registry
        .tree_mut()
        .revert_directory(&fx.ctx, a, &target)
        .unwrap_err();
    assert!(err.is_io());

    assert!(fx.exists("Album/X - @late.jpg"));
    assert!(fx.exists("Album/S/Y - @late.jpg"));
    let tree = registry.tree();
    assert_eq!(tree.directory(a).unwrap().name(), "Album");
    assert_eq!(tree.item(x).unwrap().tagged_name(), "X - @late");
    assert_eq!(tree.item(y).unwrap().tagged_name(), "Y - @late");
}

#[test]
fn test_revert_directory_rejects_foreign_snapshot() {
    let fx = Fixture::new();
    fx.mkdir("A");
    fx.mkdir("B");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let b = fx.dir(&registry, "B");

    let foreign = registry.tree().directory(b).unwrap().history().last();
    let err = registry
        .tree_mut()
        .revert_directory(&fx.ctx, a, &foreign)
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
}

/// A subdirectory created after the target time stays put, but images that
/// were moved into it still go back
#[test]
fn test_revert_descends_into_later_subdirectory() {
    let fx = Fixture::new();
    fx.touch("A/X.jpg");
    let mut registry = fx.scan();
    let a = fx.dir(&registry, "A");
    let x = fx.item(&registry, "A/X.jpg");
    let target = registry.tree().directory(a).unwrap().history().last();

    fx.clock.advance(Duration::minutes(5));
    let s = registry.tree_mut().create_subdirectory(&fx.ctx, a, "S").unwrap();
    registry.tree_mut().move_item(&fx.ctx, x, s).unwrap();
    registry.tree_mut().add_tag(&fx.ctx, x, "late").unwrap();
    assert!(fx.exists("A/S/X - @late.jpg"));

    registry.tree_mut().revert_directory(&fx.ctx, a, &target).unwrap();

    assert!(fx.exists("A/X.jpg"));
    assert!(fx.exists("A/S"));
    assert!(!fx.exists("A/S/X - @late.jpg"));
    let tree = registry.tree();
    let item = tree.item(x).unwrap();
    assert_eq!(item.directory(), a);
    assert!(item.tags().is_empty());
    assert_eq!(tree.directory(s).unwrap().name(), "S");
    assert!(tree.directory(s).unwrap().item_ids().is_empty());
}
