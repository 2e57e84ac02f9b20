mod support;

use nalgebra::Point3;
use solidcsg::{
    Solid,
    shapes3d::{cube, sphere},
    solid::{difference, intersection, union},
};

use crate::support::{approx_eq, bounding_box};

#[test]
fn union_bounding_box() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None); // -1 to +1 in all coords
    let b: Solid<()> = cube(1.0, Point3::new(1.0, 1.0, 1.0), None); // 0.5 to 1.5

    let result = a.union(&b);
    assert!(
        !result.polygons.is_empty(),
        "Union of two cubes should produce polygons"
    );

    let bb = bounding_box(&result.polygons);
    assert!(approx_eq(bb[0], -1.0, 1e-8));
    assert!(approx_eq(bb[1], -1.0, 1e-8));
    assert!(approx_eq(bb[2], -1.0, 1e-8));
    assert!(approx_eq(bb[3], 1.5, 1e-8));
    assert!(approx_eq(bb[4], 1.5, 1e-8));
    assert!(approx_eq(bb[5], 1.5, 1e-8));
}

#[test]
fn union_is_symmetric_in_extent() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(1.0, 0.0, 0.0), None);

    let ab = a.union(&b);
    let ba = b.union(&a);

    assert_eq!(ab.polygons.len(), ba.polygons.len());
    let bb_ab = bounding_box(&ab.polygons);
    let bb_ba = bounding_box(&ba.polygons);
    for i in 0..6 {
        assert!(approx_eq(bb_ab[i], bb_ba[i], 1e-8));
    }
}

#[test]
fn union_with_empty_is_identity() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let empty: Solid<()> = Solid::new();

    assert_eq!(a.union(&empty).polygons.len(), 6);
    assert_eq!(empty.union(&a).polygons.len(), 6);
}

#[test]
fn difference_of_coplanar_cubes_leaves_six_faces() {
    // Two 4-unit cubes sharing the x = 0 face exactly
    let a: Solid<()> = cube(4.0, Point3::new(-2.0, 0.0, 0.0), None);
    let b: Solid<()> = cube(4.0, Point3::new(2.0, 0.0, 0.0), None);

    let result = a.difference(&b);
    assert_eq!(result.polygons.len(), 6);

    let bb = bounding_box(&result.polygons);
    assert!(approx_eq(bb[0], -4.0, 1e-8));
    assert!(approx_eq(bb[3], 0.0, 1e-8));
}

#[test]
fn difference_of_inset_coplanar_cube_leaves_six_faces() {
    // The subtrahend touches the minuend's x = 0 face from outside, with a
    // smaller footprint, so the shared face must be re-merged into one quad
    let a: Solid<()> = cube(4.0, Point3::new(-2.0, 0.0, 0.0), None);
    let b: Solid<()> = cube(2.0, Point3::new(1.0, 0.0, 0.0), None);

    let result = a.difference(&b);
    assert_eq!(result.polygons.len(), 6);

    let bb = bounding_box(&result.polygons);
    assert!(approx_eq(bb[0], -4.0, 1e-8));
    assert!(approx_eq(bb[3], 0.0, 1e-8));
}

#[test]
fn difference_of_contained_cube_makes_a_cavity() {
    // The subtrahend lies strictly inside the minuend: six outer faces plus
    // six inverted cavity faces
    let a: Solid<()> = cube(4.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(0.5, 0.0, 0.0), None);

    let result = a.difference(&b);
    assert_eq!(result.polygons.len(), 12);

    // Outer extent is untouched by the cavity
    let bb = bounding_box(&result.polygons);
    assert!(approx_eq(bb[0], -2.0, 1e-8));
    assert!(approx_eq(bb[3], 2.0, 1e-8));
}

#[test]
fn difference_of_disjoint_spheres_preserves_polygon_count() {
    let a: Solid<()> = sphere(1.0, Point3::new(-50.0, 0.0, 0.0), 12, None);
    let b: Solid<()> = sphere(1.0, Point3::new(50.0, 0.0, 0.0), 12, None);

    let result = a.subtract(&[b]);
    assert_eq!(result.polygons.len(), a.polygons.len());
    assert!(result.is_canonicalized());
    assert!(result.is_retesselated());
}

#[test]
fn difference_of_overlapping_spheres_is_deterministic() {
    let a: Solid<()> = sphere(1.0, Point3::new(-0.5, 0.0, 0.0), 12, None);
    let b: Solid<()> = sphere(1.0, Point3::new(0.5, 0.0, 0.0), 12, None);

    let first = a.subtract(&[b.clone()]);
    let second = a.subtract(&[b]);

    assert!(!first.polygons.is_empty());
    assert!(first.is_canonicalized());
    assert!(first.is_retesselated());

    // Identical inputs give byte-identical outputs
    assert_eq!(first.polygons.len(), second.polygons.len());
    let bb_first = bounding_box(&first.polygons);
    let bb_second = bounding_box(&second.polygons);
    for i in 0..6 {
        assert!(approx_eq(bb_first[i], bb_second[i], 1e-12));
    }

    // The minuend's far side survives; the subtrahend carves a dent
    assert!(approx_eq(bb_first[0], -1.5, 0.1));
    assert!(bb_first[3] < 0.6);
}

#[test]
fn intersection_of_overlapping_cubes_is_a_box() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(1.0, 0.0, 0.0), None);

    let result = a.intersection(&b);
    assert_eq!(result.polygons.len(), 6);

    let bb = bounding_box(&result.polygons);
    assert!(approx_eq(bb[0], 0.0, 1e-8));
    assert!(approx_eq(bb[1], -1.0, 1e-8));
    assert!(approx_eq(bb[2], -1.0, 1e-8));
    assert!(approx_eq(bb[3], 1.0, 1e-8));
    assert!(approx_eq(bb[4], 1.0, 1e-8));
    assert!(approx_eq(bb[5], 1.0, 1e-8));
}

#[test]
fn intersection_of_disjoint_cubes_is_empty() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(5.0, 0.0, 0.0), None);

    let result = a.intersection(&b);
    assert!(result.polygons.is_empty());
}

#[test]
fn subtract_and_intersect_with_empty_slice_are_identity() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);

    assert_eq!(a.subtract(&[]).polygons.len(), a.polygons.len());
    assert_eq!(a.intersect(&[]).polygons.len(), a.polygons.len());
}

#[test]
fn subtract_folds_over_multiple_operands() {
    // Carve two opposite corners off a cube
    let a: Solid<()> = cube(4.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(2.0, 2.0, 2.0), None);
    let c: Solid<()> = cube(2.0, Point3::new(-2.0, -2.0, -2.0), None);

    let folded = a.subtract(&[b.clone(), c.clone()]);
    let stepped = a.difference(&b).difference(&c);

    assert!(!folded.polygons.is_empty());
    assert_eq!(folded.polygons.len(), stepped.polygons.len());
}

#[test]
fn cleanup_passes_are_idempotent() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(1.0, 1.0, 0.0), None);

    let result = a.difference(&b);
    assert!(result.is_canonicalized());
    assert!(result.is_retesselated());

    let again = result.canonicalize().retesselate();
    assert_eq!(again.polygons, result.polygons);
    assert!(again.is_canonicalized());
    assert!(again.is_retesselated());
}

#[test]
fn difference_and_intersection_partition_the_minuend() {
    // (A - B) and (A ∩ B) together span exactly A's extent
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(1.0, 0.0, 0.0), None);

    let rebuilt = a.difference(&b).union(&a.intersection(&b));
    let bb = bounding_box(&rebuilt.polygons);
    let bb_a = bounding_box(&a.polygons);
    for i in 0..6 {
        assert!(approx_eq(bb[i], bb_a[i], 1e-8));
    }
}

#[test]
fn fresh_solids_are_not_canonicalized() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    assert!(!a.is_canonicalized());
    assert!(!a.is_retesselated());
}

#[test]
fn metadata_survives_booleans() {
    let a: Solid<&str> = cube(2.0, Point3::origin(), Some("minuend"));
    let b: Solid<&str> = cube(2.0, Point3::new(1.0, 0.0, 0.0), Some("subtrahend"));

    let result = a.difference(&b);
    assert!(!result.polygons.is_empty());
    for poly in &result.polygons {
        assert!(matches!(poly.metadata, Some("minuend") | Some("subtrahend")));
    }
}

#[test]
fn inverse_flips_every_polygon() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let inv = a.inverse();

    assert_eq!(inv.polygons.len(), a.polygons.len());
    for (p, q) in a.polygons.iter().zip(&inv.polygons) {
        assert!(approx_eq(
            p.plane.normal().dot(&q.plane.normal()),
            -1.0,
            1e-8
        ));
    }
}

#[test]
fn free_function_policies() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let b: Solid<()> = cube(2.0, Point3::new(1.0, 0.0, 0.0), None);

    // Union mirrors the method
    assert_eq!(
        union(&a, &b).polygons.len(),
        a.union(&b).polygons.len()
    );

    // Difference: empty -> empty solid, one -> that solid unchanged
    assert!(difference::<()>(&[]).polygons.is_empty());
    assert_eq!(difference(&[a.clone()]).polygons.len(), a.polygons.len());
    assert!(!difference(&[a.clone(), b.clone()]).polygons.is_empty());

    // Intersection needs at least two participants
    assert!(intersection::<()>(&[]).polygons.is_empty());
    assert!(intersection(&[a.clone()]).polygons.is_empty());
    assert!(!intersection(&[a, b]).polygons.is_empty());
}

#[test]
fn triangulate_produces_only_triangles() {
    let a: Solid<()> = cube(2.0, Point3::origin(), None);
    let tris = a.triangulate();

    assert_eq!(tris.polygons.len(), 12); // two per quad face
    assert!(tris.polygons.iter().all(|p| p.vertices.len() == 3));
}
