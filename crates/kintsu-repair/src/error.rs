//! Error types for topology analysis and repair.

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during mesh repair.
///
/// These are the fatal cases only; per-defect problems (unclosable
/// boundaries, degenerate loops) are recoverable and travel through the
/// defect report and repair summary instead.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Mesh has no triangles; repair refuses to return a vacuous success.
    #[error("mesh has no triangles, nothing to repair")]
    EmptyMesh,

    /// A face referenced a vertex index outside the vertex buffer.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },
}
