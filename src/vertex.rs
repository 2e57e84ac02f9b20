//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::Real;
use nalgebra::{Point2, Point3, Vector3};

/// A vertex of a polygon, holding position, normal and texture coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
    pub uv: Point2<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`].
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – (optionally non-unit) normal; it will be **copied
    ///   verbatim**, so make sure it is oriented the way you need it for
    ///   lighting / BSP tests.
    /// * `uv`     – texture coordinate, carried through splits unchanged in meaning
    pub const fn new(pos: Point3<Real>, normal: Vector3<Real>, uv: Point2<Real>) -> Self {
        Vertex { pos, normal, uv }
    }

    /// Flip vertex normal
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Return the barycentric linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    ///
    /// Normals and texture coordinates are linearly interpolated as well.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        // For positions (Point3): p(t) = p0 + t * (p1 - p0)
        let new_pos = self.pos + (other.pos - self.pos) * t;

        // For normals (Vector3): n(t) = n0 + t * (n1 - n0)
        let new_normal = self.normal + (other.normal - self.normal) * t;

        let new_uv = self.uv + (other.uv - self.uv) * t;
        Vertex::new(new_pos, new_normal, new_uv)
    }
}

#[cfg(test)]
mod tests {
    use super::Vertex;
    use nalgebra::{Point2, Point3, Vector3};

    #[test]
    fn interpolate_midpoint() {
        let a = Vertex::new(Point3::origin(), Vector3::z(), Point2::origin());
        let b = Vertex::new(
            Point3::new(2.0, 0.0, 0.0),
            Vector3::z(),
            Point2::new(1.0, 0.0),
        );
        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.pos, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(mid.uv, Point2::new(0.5, 0.0));
    }

    #[test]
    fn flip_negates_normal() {
        let mut v = Vertex::new(Point3::origin(), Vector3::z(), Point2::origin());
        v.flip();
        assert_eq!(v.normal, -Vector3::z());
        assert_eq!(v.pos, Point3::origin());
    }
}
