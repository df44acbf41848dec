//! Core types for the kintsu scan-repair pipeline.
//!
//! This crate provides the foundational types shared by every stage of the
//! pipeline:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`TriangleMesh`] - A triangle mesh with indexed vertices
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Dimensions`] - Bounding dimensions of a scanned object
//!
//! # Purity
//!
//! Everything here is a plain value type: no I/O, no shared state, safe to
//! read concurrently. The loader appends vertices during parsing and the
//! repair engine appends patch vertices; nothing else mutates a mesh.
//!
//! # Units
//!
//! Coordinates are `f64` and unit-agnostic. [`Dimensions`] carries a fixed
//! unit label because the pipeline does not infer real-world scale from a
//! photogrammetry export.
//!
//! # Coordinate System
//!
//! Right-handed; face winding is counter-clockwise when viewed from outside,
//! so normals point outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use kintsu_types::{TriangleMesh, Vertex, Point3, Dimensions};
//!
//! let mut mesh = TriangleMesh::new();
//! mesh.vertices.push(Vertex::new(Point3::new(0.0, 0.0, 0.0)));
//! mesh.vertices.push(Vertex::new(Point3::new(2.0, 0.0, 0.0)));
//! mesh.vertices.push(Vertex::new(Point3::new(0.0, 1.0, 0.0)));
//! mesh.faces.push([0, 1, 2]);
//!
//! let dims = Dimensions::of(&mesh);
//! assert!((dims.width - 2.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod dimensions;
mod mesh;
mod vertex;

pub use bounds::Aabb;
pub use dimensions::Dimensions;
pub use mesh::{unit_cube, TriangleMesh};
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
