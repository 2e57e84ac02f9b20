//! `Polygon`: a convex planar face with a derived plane and an opaque payload.

use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::plane::Plane;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// A convex polygon defined by an ordered vertex loop in consistent winding
/// order (counter-clockwise seen from the outward normal side), plus generic
/// metadata carried through every boolean operation unchanged.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    /// Ordered vertex loop, at least three entries
    pub vertices: Vec<Vertex>,

    /// The plane on which this polygon lies
    pub plane: Plane,

    /// Lazily-computed bounding box
    pub bounding_box: OnceLock<Aabb>,

    /// Generic metadata (color, material tag); never interpreted by the kernel
    pub metadata: Option<S>,
}

impl<S: Clone + PartialEq> PartialEq for Polygon<S> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.plane == other.plane
            && self.metadata == other.metadata
    }
}

impl<S: Clone + Send + Sync> Polygon<S> {
    /// Build a polygon from a vertex loop, deriving its plane from the first
    /// three vertices.
    ///
    /// # Panics
    /// If `vertices` has fewer than three entries.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        assert!(vertices.len() >= 3, "degenerate polygon");
        let plane = Plane::from_vertices(&vertices);
        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Fallible variant of [`Polygon::new`] for validating external input.
    pub fn try_new(vertices: Vec<Vertex>, metadata: Option<S>) -> Result<Self, ValidationError> {
        if vertices.len() < 3 {
            return Err(ValidationError::TooFewPoints(vertices.len()));
        }
        if let Some(v) = vertices.iter().find(|v| !v.pos.coords.iter().all(|c| c.is_finite())) {
            return Err(ValidationError::InvalidCoordinate(v.pos));
        }
        let plane = Plane::from_vertices(&vertices);
        if (vertices[1].pos - vertices[0].pos)
            .cross(&(vertices[2].pos - vertices[0].pos))
            .norm_squared()
            < Real::EPSILON * Real::EPSILON
        {
            return Err(ValidationError::DegeneratePlane(vertices[0].pos));
        }
        Ok(Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        })
    }

    /// Build a polygon that keeps a caller-supplied plane instead of deriving
    /// one. Used for split fragments, which inherit the parent's plane.
    pub fn with_plane(vertices: Vec<Vertex>, plane: Plane, metadata: Option<S>) -> Self {
        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Reverse winding order, flip vertex normals and the plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Recompute this polygon's plane from its vertices and assign the plane's
    /// normal to all vertices (flat shading).
    pub fn set_new_normal(&mut self) {
        self.plane = Plane::from_vertices(&self.vertices);
        let n = self.plane.normal();
        for v in &mut self.vertices {
            v.normal = n;
        }
    }

    /// Iterator over the edge pairs of the vertex loop, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .take(self.vertices.len())
    }

    /// The Newell normal of the vertex loop; its magnitude is twice the
    /// polygon area, so near-zero magnitude means a degenerate face.
    pub fn newell_normal(&self) -> Vector3<Real> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .take(self.vertices.len())
            .fold(Vector3::zeros(), |acc, (curr, next)| {
                acc + (curr.pos - Point3::origin()).cross(&(next.pos - Point3::origin()))
            })
    }

    /// Fan-triangulate this polygon. Correct for the convex faces the kernel
    /// produces; not a general concave tessellator.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        if self.vertices.len() < 3 {
            return Vec::new();
        }
        (1..self.vertices.len() - 1)
            .map(|i| {
                [
                    self.vertices[0].clone(),
                    self.vertices[i].clone(),
                    self.vertices[i + 1].clone(),
                ]
            })
            .collect()
    }

    /// Returns the axis-aligned bounding box of this polygon, cached after the
    /// first call.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

            for v in &self.vertices {
                mins.x = mins.x.min(v.pos.x);
                mins.y = mins.y.min(v.pos.y);
                mins.z = mins.z.min(v.pos.z);
                maxs.x = maxs.x.max(v.pos.x);
                maxs.y = maxs.y.max(v.pos.y);
                maxs.z = maxs.z.max(v.pos.z);
            }
            Aabb::new(mins, maxs)
        })
    }
}
