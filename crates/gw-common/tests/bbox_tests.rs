//! Tests for BoundingBox operations.

use gw_common::BoundingBox;

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(0.0, 0.0, 5000.0, 10000.0);
    assert_eq!(bbox.min_x, 0.0);
    assert_eq!(bbox.max_y, 10000.0);
    assert_eq!(bbox.width(), 5000.0);
    assert_eq!(bbox.height(), 10000.0);
}

#[test]
fn test_bbox_from_points() {
    let bbox = BoundingBox::from_points([(3.0, 1.0), (-2.0, 4.0), (1.0, -5.0)]).unwrap();
    assert_eq!(bbox, BoundingBox::new(-2.0, -5.0, 3.0, 4.0));
}

#[test]
fn test_bbox_from_no_points() {
    let empty: Vec<(f64, f64)> = Vec::new();
    assert!(BoundingBox::from_points(empty).is_none());
}

// ============================================================================
// Predicate tests
// ============================================================================

#[test]
fn test_bbox_contains_edges() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains(0.0, 0.0));
    assert!(bbox.contains(10.0, 5.0));
    assert!(!bbox.contains(10.000001, 5.0));
    assert!(!bbox.contains(-1.0, 5.0));
}

#[test]
fn test_bbox_intersects_touching() {
    let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
    let c = BoundingBox::new(10.5, 0.0, 20.0, 10.0);
    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
}

#[test]
fn test_bbox_expand_and_union() {
    let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    assert_eq!(a.expand(1.0), BoundingBox::new(-1.0, -1.0, 2.0, 2.0));
    let b = BoundingBox::new(5.0, -3.0, 6.0, 0.5);
    assert_eq!(a.union(&b), BoundingBox::new(0.0, -3.0, 6.0, 1.0));
}
