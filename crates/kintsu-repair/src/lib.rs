//! Topology analysis and deterministic repair for scanned triangle meshes.
//!
//! Photogrammetry output is triangle soup: holes where the scanner saw
//! nothing, non-manifold edges where surfaces fused. This crate finds both
//! and repairs them in a single deterministic pass:
//!
//! - [`EdgeAdjacency`] indexes every edge by its incident faces.
//! - [`classify`] walks the boundary into [`BoundaryLoop`]s and records
//!   non-manifold edges in a [`DefectReport`].
//! - [`repair`] splits non-manifold edges apart, then closes every hole
//!   with a centroid fan, never moving or removing an existing vertex.
//!
//! Repair is pure and append-only: input vertices keep their indices, and
//! classifying the output of `repair` yields a clean report.
//!
//! # Example
//!
//! ```
//! use kintsu_repair::{classify, repair};
//! use kintsu_types::unit_cube;
//!
//! let mut mesh = unit_cube();
//! mesh.faces.pop();
//! mesh.faces.pop(); // remove the top: a square hole
//!
//! let report = classify(&mesh);
//! assert_eq!(report.boundary_loops.len(), 1);
//!
//! let (repaired, summary) = repair(&mesh, &report).unwrap();
//! assert_eq!(summary.holes_filled, 1);
//! assert!(classify(&repaired).is_clean());
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod defects;
mod error;
mod repair;

pub use adjacency::{EdgeAdjacency, EdgeClass};
pub use defects::{
    classify, classify_with_adjacency, BoundaryLoop, DefectReport, NonManifoldEdge,
    UnclosableBoundary,
};
pub use error::{RepairError, RepairResult};
pub use repair::{repair, RepairSummary};
