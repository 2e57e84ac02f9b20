//! `Solid`: the user-facing aggregate of polygons and the boolean-operation
//! engine built on top of [`Node`](crate::bsp::Node).
//!
//! Every boolean operation builds BSP trees from clones of the operand
//! polygon lists, so the operands are never mutated. Raw results are run
//! through [`Solid::canonicalize`] and [`Solid::retesselate`] before they are
//! returned, which is what makes polygon counts reproducible for identical
//! input.
//!
//! Input solids are assumed to be closed (watertight) meshes of planar,
//! consistently-wound convex polygons; the kernel does not validate or repair
//! anything beyond its epsilon tolerances, and may produce geometrically
//! incorrect (but not crashing) output for malformed input.

use crate::bsp::Node;
use crate::float_types::{
    EPSILON, Real, parry3d::bounding_volume::Aabb, snap_tolerance,
};
use crate::plane::Plane;
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use geo::orient::Direction;
use geo::{
    BooleanOps, Coord, LineString, MultiPolygon, Orient, Polygon as GeoPolygon,
    TriangulateEarcut, coord,
};
use nalgebra::{Point2, Point3, partial_max, partial_min};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Unit normals are quantized at a fixed scale for grouping/dedup keys;
// offsets use the snap tolerance, which scales with the model.
const NORMAL_KEY_SCALE: Real = 1e5;

/// A solid bounded by a list of polygons, plus two flags recording whether
/// the cleanup passes have been applied to the current polygon list.
#[derive(Debug, Clone)]
pub struct Solid<S: Clone> {
    /// Boundary polygons of this solid
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Metadata
    pub metadata: Option<S>,

    is_canonicalized: bool,
    is_retesselated: bool,
}

impl<S: Clone + Send + Sync + Debug + PartialEq> Solid<S> {
    /// Returns a new empty Solid
    pub fn new() -> Self {
        Solid {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            metadata: None,
            is_canonicalized: false,
            is_retesselated: false,
        }
    }

    /// Build a Solid from an existing polygon list. The cleanup flags start
    /// out false: raw polygon lists are neither canonicalized nor
    /// retesselated until the corresponding pass runs.
    pub fn from_polygons(polygons: &[Polygon<S>], metadata: Option<S>) -> Self {
        Solid {
            polygons: polygons.to_vec(),
            bounding_box: OnceLock::new(),
            metadata,
            is_canonicalized: false,
            is_retesselated: false,
        }
    }

    /// Whether vertex snapping / degenerate removal has been applied to the
    /// current polygon list.
    pub const fn is_canonicalized(&self) -> bool {
        self.is_canonicalized
    }

    /// Whether coplanar-fragment merging has been applied to the current
    /// polygon list.
    pub const fn is_retesselated(&self) -> bool {
        self.is_retesselated
    }

    /// Helper to collect all vertices from the Solid.
    #[cfg(not(feature = "parallel"))]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Parallel helper to collect all vertices from the Solid.
    #[cfg(feature = "parallel")]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .par_iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Invert this Solid (flip inside vs. outside)
    pub fn inverse(&self) -> Solid<S> {
        let mut solid = self.clone();
        for p in &mut solid.polygons {
            p.flip();
        }
        solid
    }

    /// Triangulate each polygon, returning a Solid containing only triangles.
    pub fn triangulate(&self) -> Solid<S> {
        #[cfg(feature = "parallel")]
        let triangles: Vec<Polygon<S>> = self
            .polygons
            .par_iter()
            .flat_map(|poly| {
                poly.triangulate()
                    .into_par_iter()
                    .map(move |tri| Polygon::new(tri.to_vec(), poly.metadata.clone()))
            })
            .collect();

        #[cfg(not(feature = "parallel"))]
        let triangles: Vec<Polygon<S>> = self
            .polygons
            .iter()
            .flat_map(|poly| {
                poly.triangulate()
                    .into_iter()
                    .map(move |tri| Polygon::new(tri.to_vec(), poly.metadata.clone()))
            })
            .collect();

        Solid::from_polygons(&triangles, self.metadata.clone())
    }

    /// Return a new Solid representing the union of the two solids.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    pub fn union(&self, other: &Solid<S>) -> Solid<S> {
        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());

        self.finish(a.all_polygons())
    }

    /// Return a new Solid representing the difference of the two solids,
    /// using the complement identity `A − B = ¬(¬A ∪ B)`.
    ///
    /// ```text
    /// let c = a.difference(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    pub fn difference(&self, other: &Solid<S>) -> Solid<S> {
        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());
        a.invert();

        self.finish(a.all_polygons())
    }

    /// Return a new Solid representing the intersection of the two solids,
    /// using the complement identity `A ∩ B = ¬(¬A ∪ ¬B)`.
    ///
    /// ```text
    /// let c = a.intersection(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    pub fn intersection(&self, other: &Solid<S>) -> Solid<S> {
        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(&b.all_polygons());
        a.invert();

        self.finish(a.all_polygons())
    }

    /// Subtract every solid in `others` from `self`, folding left. With an
    /// empty slice this returns `self` unchanged.
    pub fn subtract(&self, others: &[Solid<S>]) -> Solid<S> {
        others
            .iter()
            .fold(self.clone(), |acc, other| acc.difference(other))
    }

    /// Intersect `self` with every solid in `others`, folding left. With an
    /// empty slice this returns `self` unchanged.
    pub fn intersect(&self, others: &[Solid<S>]) -> Solid<S> {
        others
            .iter()
            .fold(self.clone(), |acc, other| acc.intersection(other))
    }

    /// Wrap a raw boolean-op fragment list in a Solid and run both cleanup
    /// passes on it.
    fn finish(&self, polygons: Vec<Polygon<S>>) -> Solid<S> {
        Solid {
            polygons,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
            is_canonicalized: false,
            is_retesselated: false,
        }
        .canonicalize()
        .retesselate()
    }

    /// Snap near-coincident vertices to a single shared position, drop
    /// degenerate and zero-area polygons, and remove exactly-coincident
    /// duplicate faces contributed by both operands of a boolean op.
    ///
    /// Idempotent: running it on an already-canonical Solid is a no-op.
    #[must_use = "Use the new Solid"]
    pub fn canonicalize(&self) -> Solid<S> {
        if self.is_canonicalized {
            return self.clone();
        }

        let tol = snap_tolerance();
        // First vertex seen in a grid cell becomes the shared position for
        // every later vertex snapping into that cell.
        let mut cells: HashMap<(i64, i64, i64), Point3<Real>> = HashMap::new();
        let mut seen_faces: HashSet<(Vec<(i64, i64, i64)>, (i64, i64, i64))> = HashSet::new();

        let mut polygons = Vec::with_capacity(self.polygons.len());
        for poly in &self.polygons {
            let mut vertices: Vec<Vertex> = Vec::with_capacity(poly.vertices.len());
            for v in &poly.vertices {
                let pos = *cells.entry(point_key(&v.pos, tol)).or_insert(v.pos);
                // Snapping can collapse neighbouring loop vertices onto the
                // same position; keep only the first of each run.
                if vertices.last().is_some_and(|prev| prev.pos == pos) {
                    continue;
                }
                vertices.push(Vertex::new(pos, v.normal, v.uv));
            }
            while vertices.len() > 1 && vertices.first().map(|v| v.pos) == vertices.last().map(|v| v.pos)
            {
                vertices.pop();
            }
            if vertices.len() < 3 {
                continue;
            }

            let snapped = Polygon::with_plane(vertices, poly.plane.clone(), poly.metadata.clone());
            if snapped.newell_normal().norm() <= EPSILON {
                continue;
            }

            let mut cell_loop: Vec<(i64, i64, i64)> = snapped
                .vertices
                .iter()
                .map(|v| point_key(&v.pos, tol))
                .collect();
            cell_loop.sort_unstable();
            if !seen_faces.insert((cell_loop, normal_key(&snapped.plane))) {
                continue;
            }

            polygons.push(snapped);
        }

        Solid {
            polygons,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
            is_canonicalized: true,
            is_retesselated: self.is_retesselated,
        }
    }

    /// Merge coplanar adjacent fragments sharing the same payload back into
    /// larger faces, splitting any concave or holed merge result into convex
    /// pieces. This is what makes boolean-op polygon counts independent of
    /// incidental split order.
    ///
    /// Idempotent: running it on an already-retesselated Solid is a no-op.
    #[must_use = "Use the new Solid"]
    pub fn retesselate(&self) -> Solid<S> {
        if self.is_retesselated {
            return self.clone();
        }

        let tol = snap_tolerance();

        // Group polygon indices by quantized plane, in first-occurrence order
        // so output ordering stays deterministic.
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_index: HashMap<(i64, i64, i64, i64), usize> = HashMap::new();
        for (i, poly) in self.polygons.iter().enumerate() {
            let key = plane_key(&poly.plane, tol);
            match group_index.get(&key) {
                Some(&g) => groups[g].push(i),
                None => {
                    group_index.insert(key, groups.len());
                    groups.push(vec![i]);
                },
            }
        }

        let mut polygons = Vec::with_capacity(self.polygons.len());
        for group in groups {
            // Fragments only merge when they share a payload
            let mut buckets: Vec<Vec<usize>> = Vec::new();
            for &i in &group {
                match buckets
                    .iter_mut()
                    .find(|b| self.polygons[b[0]].metadata == self.polygons[i].metadata)
                {
                    Some(b) => b.push(i),
                    None => buckets.push(vec![i]),
                }
            }

            for bucket in buckets {
                if bucket.len() == 1 {
                    // Nothing to merge with; pass the polygon through untouched
                    polygons.push(self.polygons[bucket[0]].clone());
                } else {
                    polygons.extend(self.merge_coplanar(&bucket));
                }
            }
        }

        Solid {
            polygons,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
            is_canonicalized: self.is_canonicalized,
            is_retesselated: true,
        }
    }

    /// Union two or more coplanar fragments in the plane's 2D frame and lift
    /// the merged rings back to 3D.
    fn merge_coplanar(&self, bucket: &[usize]) -> Vec<Polygon<S>> {
        let plane = self.polygons[bucket[0]].plane.clone();
        let metadata = self.polygons[bucket[0]].metadata.clone();
        let (to_xy, from_xy) = plane.to_xy_transform();

        let mut merged: Option<MultiPolygon<Real>> = None;
        for &i in bucket {
            let mut ring: Vec<Coord<Real>> = self.polygons[i]
                .vertices
                .iter()
                .map(|v| {
                    let p = to_xy.transform_point(&v.pos);
                    coord! { x: p.x, y: p.y }
                })
                .collect();
            if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
                if first != last {
                    ring.push(first); // close ring explicitly
                }
            }
            let fragment = MultiPolygon::new(vec![GeoPolygon::new(
                LineString::new(ring),
                Vec::new(),
            )]);
            merged = Some(match merged {
                Some(acc) => acc.union(&fragment),
                None => fragment,
            });
        }

        let Some(merged) = merged else {
            return Vec::new();
        };
        // CCW exteriors / CW interiors, so lifted rings keep outward winding
        let merged = merged.orient(Direction::Default);

        let lift = |c: &[Real; 2]| -> Vertex {
            let p = from_xy.transform_point(&Point3::new(c[0], c[1], 0.0));
            Vertex::new(p, plane.normal(), Point2::origin())
        };

        let mut result = Vec::new();
        for poly2d in &merged.0 {
            let outer = simplify_ring(poly2d.exterior());
            if outer.len() < 3 {
                continue;
            }

            if poly2d.interiors().is_empty() && ring_is_convex(&outer) {
                let vertices: Vec<Vertex> =
                    outer.iter().map(|c| lift(&[c.x, c.y])).collect();
                result.push(oriented(
                    Polygon::with_plane(vertices, plane.clone(), metadata.clone()),
                    &plane,
                ));
            } else {
                // Concave or holed merge result: ear-cut back into convex pieces
                let outer_2d: Vec<[Real; 2]> = outer.iter().map(|c| [c.x, c.y]).collect();
                let holes_2d: Vec<Vec<[Real; 2]>> = poly2d
                    .interiors()
                    .iter()
                    .map(|ring| simplify_ring(ring).iter().map(|c| [c.x, c.y]).collect())
                    .collect();
                let hole_refs: Vec<&[[Real; 2]]> =
                    holes_2d.iter().map(|h| h.as_slice()).collect();

                for tri in triangulate_2d(&outer_2d, &hole_refs) {
                    let vertices: Vec<Vertex> =
                        tri.iter().map(|p| lift(&[p.x, p.y])).collect();
                    result.push(oriented(
                        Polygon::with_plane(vertices, plane.clone(), metadata.clone()),
                        &plane,
                    ));
                }
            }
        }
        result
    }

    /// Returns an [`Aabb`] indicating the 3D bounds of all `polygons`.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            // Track overall min/max in x, y, z among all polygons
            let mut min_x = Real::MAX;
            let mut min_y = Real::MAX;
            let mut min_z = Real::MAX;
            let mut max_x = -Real::MAX;
            let mut max_y = -Real::MAX;
            let mut max_z = -Real::MAX;

            for poly in &self.polygons {
                for v in &poly.vertices {
                    min_x = *partial_min(&min_x, &v.pos.x).unwrap();
                    min_y = *partial_min(&min_y, &v.pos.y).unwrap();
                    min_z = *partial_min(&min_z, &v.pos.z).unwrap();

                    max_x = *partial_max(&max_x, &v.pos.x).unwrap();
                    max_y = *partial_max(&max_y, &v.pos.y).unwrap();
                    max_z = *partial_max(&max_z, &v.pos.z).unwrap();
                }
            }

            // If still uninitialized (e.g., no polygons), return a trivial AABB at origin
            if min_x > max_x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }

            let mins = Point3::new(min_x, min_y, min_z);
            let maxs = Point3::new(max_x, max_y, max_z);
            Aabb::new(mins, maxs)
        })
    }
}

impl<S: Clone + Send + Sync + Debug + PartialEq> Default for Solid<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Union of two solids; convenience mirror of [`Solid::union`].
pub fn union<S: Clone + Send + Sync + Debug + PartialEq>(
    a: &Solid<S>,
    b: &Solid<S>,
) -> Solid<S> {
    a.union(b)
}

/// Subtract every following solid from the first. With no solids this is the
/// empty Solid; with one it is that solid unchanged.
pub fn difference<S: Clone + Send + Sync + Debug + PartialEq>(
    solids: &[Solid<S>],
) -> Solid<S> {
    match solids {
        [] => Solid::new(),
        [head] => head.clone(),
        [head, rest @ ..] => head.subtract(rest),
    }
}

/// Intersect all the given solids. Zero or one operand yields the empty
/// Solid: an intersection needs at least two participants.
pub fn intersection<S: Clone + Send + Sync + Debug + PartialEq>(
    solids: &[Solid<S>],
) -> Solid<S> {
    match solids {
        [] | [_] => Solid::new(),
        [head, rest @ ..] => head.intersect(rest),
    }
}

fn quantize(value: Real, tol: Real) -> i64 {
    (value / tol).round() as i64
}

fn point_key(p: &Point3<Real>, tol: Real) -> (i64, i64, i64) {
    (quantize(p.x, tol), quantize(p.y, tol), quantize(p.z, tol))
}

fn normal_key(plane: &Plane) -> (i64, i64, i64) {
    (
        (plane.normal.x * NORMAL_KEY_SCALE).round() as i64,
        (plane.normal.y * NORMAL_KEY_SCALE).round() as i64,
        (plane.normal.z * NORMAL_KEY_SCALE).round() as i64,
    )
}

fn plane_key(plane: &Plane, tol: Real) -> (i64, i64, i64, i64) {
    let (nx, ny, nz) = normal_key(plane);
    (nx, ny, nz, quantize(plane.w, tol))
}

/// Re-orient a lifted polygon so its winding agrees with the group plane.
fn oriented<S: Clone + Send + Sync>(mut poly: Polygon<S>, plane: &Plane) -> Polygon<S> {
    if poly.newell_normal().dot(&plane.normal()) < 0.0 {
        poly.vertices.reverse();
    }
    poly
}

/// Strip the closing duplicate and any collinear interior points a 2D union
/// leaves on a ring.
fn simplify_ring(ring: &LineString<Real>) -> Vec<Coord<Real>> {
    let mut pts: Vec<Coord<Real>> = ring.0.clone();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }

    let n = pts.len();
    let mut out: Vec<Coord<Real>> = Vec::with_capacity(n);
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let cur = pts[i];
        let next = pts[(i + 1) % n];
        let cross = (cur.x - prev.x) * (next.y - cur.y) - (cur.y - prev.y) * (next.x - cur.x);
        if cross.abs() > EPSILON {
            out.push(cur);
        }
    }
    if out.len() < 3 { pts } else { out }
}

/// True when the (unclosed) ring is convex, treating collinear runs as convex.
fn ring_is_convex(ring: &[Coord<Real>]) -> bool {
    let n = ring.len();
    if n <= 3 {
        return true;
    }
    let mut sign = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let c = ring[(i + 2) % n];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() > EPSILON {
            if sign != 0.0 && (cross > 0.0) != (sign > 0.0) {
                return false;
            }
            sign = cross;
        }
    }
    true
}

/// Ear-cut triangulation of a 2D outline with holes, returning triangles
/// embedded at z=0.
fn triangulate_2d(outer: &[[Real; 2]], holes: &[&[[Real; 2]]]) -> Vec<[Point3<Real>; 3]> {
    // Convert the outer ring into a `LineString`
    let outer_coords: Vec<Coord<Real>> =
        outer.iter().map(|&[x, y]| Coord { x, y }).collect();

    // Convert each hole into its own `LineString`
    let holes_coords: Vec<LineString<Real>> = holes
        .iter()
        .map(|hole| {
            let coords: Vec<Coord<Real>> =
                hole.iter().map(|&[x, y]| Coord { x, y }).collect();
            LineString::new(coords)
        })
        .collect();

    // Ear-cut triangulation on the polygon (outer + holes)
    let polygon = GeoPolygon::new(LineString::new(outer_coords), holes_coords);

    let triangulation = polygon.earcut_triangles_raw();
    let triangle_indices = triangulation.triangle_indices;
    let vertices = triangulation.vertices;

    // Convert the 2D result (x,y) into 3D triangles with z=0
    let mut result = Vec::with_capacity(triangle_indices.len() / 3);
    for tri in triangle_indices.chunks_exact(3) {
        let pts = [
            Point3::new(vertices[2 * tri[0]], vertices[2 * tri[0] + 1], 0.0),
            Point3::new(vertices[2 * tri[1]], vertices[2 * tri[1] + 1], 0.0),
            Point3::new(vertices[2 * tri[2]], vertices[2 * tri[2] + 1], 0.0),
        ];
        result.push(pts);
    }
    result
}
