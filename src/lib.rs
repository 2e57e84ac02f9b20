//! Constructive solid geometry on arbitrary polygon meshes.
//!
//! `solidcsg` implements the classic BSP-tree formulation of CSG booleans:
//! solids are boundary representations made of convex planar polygons, and
//! union, difference, and intersection are computed by mutually clipping
//! BSP trees built from the operands. Results are post-processed by a
//! canonicalization pass (vertex snapping, degenerate and duplicate-face
//! removal) and a retesselation pass (merging coplanar fragments back into
//! larger faces), so identical inputs produce identical outputs.
//!
//! ```
//! use nalgebra::Point3;
//! use solidcsg::shapes3d::sphere;
//!
//! let a = sphere::<()>(1.0, Point3::new(-0.5, 0.0, 0.0), 12, None);
//! let b = sphere::<()>(1.0, Point3::new(0.5, 0.0, 0.0), 12, None);
//! let dented = a.subtract(&[b]);
//! assert!(!dented.polygons.is_empty());
//! ```
//!
//! Polygons can carry an arbitrary payload `S` (a material id, a face tag)
//! that survives splitting and clipping; fragments only merge with fragments
//! carrying an equal payload.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::missing_const_for_fn, clippy::approx_constant)]

#[cfg(all(feature = "f64", feature = "f32"))]
compile_error!("Features `f32` and `f64` are mutually exclusive; enable only one.");

#[cfg(not(any(feature = "f64", feature = "f32")))]
compile_error!("Either feature `f32` or `f64` must be enabled.");

pub mod bsp;
pub mod errors;
pub mod float_types;
pub mod plane;
pub mod polygon;
pub mod shapes3d;
pub mod solid;
pub mod vertex;

pub use plane::Plane;
pub use polygon::Polygon;
pub use solid::Solid;
pub use vertex::Vertex;
