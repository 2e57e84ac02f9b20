//! Primitive solid generators: cuboids, spheres, and cylinders/frusta.
//!
//! All generators emit closed, outward-wound polygon lists ready for boolean
//! operations; a degenerate request (zero radius, coincident endpoints)
//! yields the empty Solid rather than degenerate geometry.

use crate::float_types::{PI, Real, TAU};
use crate::polygon::Polygon;
use crate::solid::Solid;
use crate::vertex::Vertex;
use nalgebra::{Point2, Point3, Vector3};
use std::fmt::Debug;

/// Default slice count for curved primitives.
pub const DEFAULT_RESOLUTION: usize = 12;

// Each face is four corner bitmasks (bit 0 = +x, bit 1 = +y, bit 2 = +z)
// plus the outward face normal.
const CUBE_FACES: [([usize; 4], [Real; 3]); 6] = [
    ([0, 4, 6, 2], [-1.0, 0.0, 0.0]),
    ([1, 3, 7, 5], [1.0, 0.0, 0.0]),
    ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
    ([2, 6, 7, 3], [0.0, 1.0, 0.0]),
    ([0, 2, 3, 1], [0.0, 0.0, -1.0]),
    ([4, 5, 7, 6], [0.0, 0.0, 1.0]),
];

/// An axis-aligned box given by its half-extents along each axis and its
/// center. Zero extent on any axis yields the empty Solid.
pub fn cuboid<S: Clone + Send + Sync + Debug + PartialEq>(
    radius: Vector3<Real>,
    center: Point3<Real>,
    metadata: Option<S>,
) -> Solid<S> {
    if radius.x == 0.0 || radius.y == 0.0 || radius.z == 0.0 {
        return Solid::new();
    }

    let corner = |mask: usize| -> Point3<Real> {
        Point3::new(
            center.x + radius.x * (2.0 * ((mask & 1) as Real) - 1.0),
            center.y + radius.y * (((mask & 2) as Real) - 1.0),
            center.z + radius.z * (((mask & 4) as Real) / 2.0 - 1.0),
        )
    };

    let polygons: Vec<Polygon<S>> = CUBE_FACES
        .iter()
        .map(|&(corners, normal)| {
            let normal = Vector3::new(normal[0], normal[1], normal[2]);
            let vertices = corners
                .iter()
                .map(|&mask| Vertex::new(corner(mask), normal, Point2::origin()))
                .collect();
            Polygon::new(vertices, metadata.clone())
        })
        .collect();

    Solid::from_polygons(&polygons, metadata)
}

/// A cube with the given edge length, centered at `center`.
pub fn cube<S: Clone + Send + Sync + Debug + PartialEq>(
    size: Real,
    center: Point3<Real>,
    metadata: Option<S>,
) -> Solid<S> {
    let half = size / 2.0;
    cuboid(Vector3::new(half, half, half), center, metadata)
}

/// A UV sphere built from two mirrored stacks of latitude bands.
///
/// `resolution` is the slice count around the equator and is clamped to at
/// least 4; the stack count is `resolution / 4` per hemisphere, matching the
/// equatorial facet size.
pub fn sphere<S: Clone + Send + Sync + Debug + PartialEq>(
    radius: Real,
    center: Point3<Real>,
    resolution: usize,
    metadata: Option<S>,
) -> Solid<S> {
    if radius <= 0.0 {
        return Solid::new();
    }
    let resolution = resolution.max(4);
    let qresolution = resolution / 4;

    let xvector = Vector3::new(radius, 0.0, 0.0);
    let yvector = Vector3::new(0.0, -radius, 0.0);
    let zvector = Vector3::new(0.0, 0.0, radius);

    let vertex = |pos: Point3<Real>| -> Vertex {
        Vertex::new(pos, (pos - center) / radius, Point2::origin())
    };

    let mut polygons: Vec<Polygon<S>> = Vec::new();
    let mut prev_cylinder_point = center + xvector;
    for slice1 in 1..=resolution {
        let angle = TAU * (slice1 as Real) / (resolution as Real);
        let cylinder_point = center + xvector * angle.cos() + yvector * angle.sin();
        let mut prev_cos_pitch = 1.0;
        let mut prev_sin_pitch = 0.0;
        for slice2 in 1..=qresolution {
            let pitch = (TAU / 4.0) * (slice2 as Real) / (qresolution as Real);
            let cos_pitch = pitch.cos();
            let sin_pitch = pitch.sin();

            // Southern band: a quad, or a triangle at the pole
            let mut vertices = vec![vertex(
                center + (prev_cylinder_point - center) * prev_cos_pitch
                    - zvector * prev_sin_pitch,
            )];
            vertices.push(vertex(
                center + (cylinder_point - center) * prev_cos_pitch
                    - zvector * prev_sin_pitch,
            ));
            if slice2 < qresolution {
                vertices.push(vertex(
                    center + (cylinder_point - center) * cos_pitch - zvector * sin_pitch,
                ));
            }
            vertices.push(vertex(
                center + (prev_cylinder_point - center) * cos_pitch - zvector * sin_pitch,
            ));
            polygons.push(Polygon::new(vertices, metadata.clone()));

            // Northern band: mirror of the southern one, reversed to keep
            // outward winding
            let mut vertices = vec![vertex(
                center + (prev_cylinder_point - center) * prev_cos_pitch
                    + zvector * prev_sin_pitch,
            )];
            vertices.push(vertex(
                center + (cylinder_point - center) * prev_cos_pitch
                    + zvector * prev_sin_pitch,
            ));
            if slice2 < qresolution {
                vertices.push(vertex(
                    center + (cylinder_point - center) * cos_pitch + zvector * sin_pitch,
                ));
            }
            vertices.push(vertex(
                center + (prev_cylinder_point - center) * cos_pitch + zvector * sin_pitch,
            ));
            vertices.reverse();
            polygons.push(Polygon::new(vertices, metadata.clone()));

            prev_cos_pitch = cos_pitch;
            prev_sin_pitch = sin_pitch;
        }
        prev_cylinder_point = cylinder_point;
    }

    Solid::from_polygons(&polygons, metadata)
}

/// A capped frustum from `start` to `end`, with independent end radii and an
/// optional partial sweep.
///
/// `sector_angle` is the swept angle in degrees; angles above 360 wrap, and
/// a partial sweep is closed with flat faces along both cut edges. Both radii
/// zero, a non-positive angle, or coincident endpoints yield the empty Solid.
/// A single zero radius makes a cone.
pub fn frustum<S: Clone + Send + Sync + Debug + PartialEq>(
    start: Point3<Real>,
    end: Point3<Real>,
    radius_start: Real,
    radius_end: Real,
    sector_angle: Real,
    resolution: usize,
    metadata: Option<S>,
) -> Solid<S> {
    let radius_start = radius_start.abs();
    let radius_end = radius_end.abs();
    // A full 360 stays 360; only over-full angles wrap
    let alpha = if sector_angle > 360.0 {
        sector_angle % 360.0
    } else {
        sector_angle
    };

    if (radius_start == 0.0 && radius_end == 0.0) || start == end || alpha <= 0.0 {
        return Solid::new();
    }
    let resolution = resolution.max(4);
    let ray = end - start;

    let axis_z = ray.normalize();
    let axis_x = non_parallel_vector(&axis_z).cross(&axis_z).normalize();
    let axis_y = axis_x.cross(&axis_z).normalize();

    let start_v = Vertex::new(start, -axis_z, Point2::origin());
    let end_v = Vertex::new(end, axis_z, Point2::origin());

    let point = |stack: Real, slice: Real, radius: Real| -> Vertex {
        let angle = slice * PI * alpha / 180.0;
        let out = axis_x * angle.cos() + axis_y * angle.sin();
        let pos = start + ray * stack + out * radius;
        Vertex::new(pos, out, Point2::origin())
    };

    let mut polygons: Vec<Polygon<S>> = Vec::new();
    for i in 0..resolution {
        let t0 = (i as Real) / (resolution as Real);
        let t1 = ((i + 1) as Real) / (resolution as Real);

        if radius_start == radius_end {
            polygons.push(Polygon::new(
                vec![
                    start_v.clone(),
                    point(0.0, t0, radius_start),
                    point(0.0, t1, radius_start),
                ],
                metadata.clone(),
            ));
            polygons.push(Polygon::new(
                vec![
                    point(0.0, t1, radius_start),
                    point(0.0, t0, radius_start),
                    point(1.0, t0, radius_end),
                    point(1.0, t1, radius_end),
                ],
                metadata.clone(),
            ));
            polygons.push(Polygon::new(
                vec![end_v.clone(), point(1.0, t1, radius_end), point(1.0, t0, radius_end)],
                metadata.clone(),
            ));
        } else {
            // Unequal radii: each end with a nonzero radius contributes its
            // cap triangle and one of the two side triangles; a cone simply
            // loses the pair at its apex
            if radius_start > 0.0 {
                polygons.push(Polygon::new(
                    vec![
                        start_v.clone(),
                        point(0.0, t0, radius_start),
                        point(0.0, t1, radius_start),
                    ],
                    metadata.clone(),
                ));
                polygons.push(Polygon::new(
                    vec![
                        point(0.0, t0, radius_start),
                        point(1.0, t0, radius_end),
                        point(0.0, t1, radius_start),
                    ],
                    metadata.clone(),
                ));
            }
            if radius_end > 0.0 {
                polygons.push(Polygon::new(
                    vec![end_v.clone(), point(1.0, t1, radius_end), point(1.0, t0, radius_end)],
                    metadata.clone(),
                ));
                polygons.push(Polygon::new(
                    vec![
                        point(1.0, t0, radius_end),
                        point(1.0, t1, radius_end),
                        point(0.0, t1, radius_start),
                    ],
                    metadata.clone(),
                ));
            }
        }
    }

    // Close a partial sweep with flat faces along both cut edges
    if alpha < 360.0 {
        polygons.push(Polygon::new(
            vec![start_v.clone(), end_v.clone(), point(0.0, 0.0, radius_start)],
            metadata.clone(),
        ));
        polygons.push(Polygon::new(
            vec![point(0.0, 0.0, radius_start), end_v.clone(), point(1.0, 0.0, radius_end)],
            metadata.clone(),
        ));
        polygons.push(Polygon::new(
            vec![start_v.clone(), point(0.0, 1.0, radius_start), end_v.clone()],
            metadata.clone(),
        ));
        polygons.push(Polygon::new(
            vec![
                point(0.0, 1.0, radius_start),
                point(1.0, 1.0, radius_end),
                end_v.clone(),
            ],
            metadata.clone(),
        ));
    }

    // Generator normals above are approximations; recompute flat face normals
    for poly in &mut polygons {
        poly.set_new_normal();
    }

    Solid::from_polygons(&polygons, metadata)
}

/// A full right cylinder along the y axis with the given radius and height,
/// based at the origin, or centered on it when `center` is true.
pub fn cylinder<S: Clone + Send + Sync + Debug + PartialEq>(
    radius: Real,
    height: Real,
    center: bool,
    metadata: Option<S>,
) -> Solid<S> {
    let (start, end) = if center {
        (
            Point3::new(0.0, -height / 2.0, 0.0),
            Point3::new(0.0, height / 2.0, 0.0),
        )
    } else {
        (Point3::origin(), Point3::new(0.0, height, 0.0))
    };
    frustum(
        start,
        end,
        radius,
        radius,
        360.0,
        DEFAULT_RESOLUTION,
        metadata,
    )
}

/// A deterministic vector guaranteed not to be parallel to `v`: the basis
/// axis with the smallest projection onto it.
fn non_parallel_vector(v: &Vector3<Real>) -> Vector3<Real> {
    let ax = v.x.abs();
    let ay = v.y.abs();
    let az = v.z.abs();
    if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    }
}
