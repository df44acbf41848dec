//! Errors for the orchestration layer.

use thiserror::Error;

use crate::job::{JobState, MeshId};

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors crossing the pipeline boundary.
///
/// Geometry errors from the lower crates are wrapped verbatim; the rest are
/// bookkeeping and concurrency-policy rejections, not geometry.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The uploaded bytes were not a valid OBJ mesh.
    #[error(transparent)]
    Parse(#[from] kintsu_io::ParseError),

    /// The repair engine refused the mesh.
    #[error(transparent)]
    Repair(#[from] kintsu_repair::RepairError),

    /// A repair for this mesh id is already in flight.
    #[error("a repair job for mesh {id} is already in flight")]
    Conflict {
        /// The contended mesh id.
        id: MeshId,
    },

    /// No job record exists for this mesh id.
    #[error("no job registered for mesh {id}")]
    UnknownJob {
        /// The unknown mesh id.
        id: MeshId,
    },

    /// The job is in a state that does not permit the requested operation.
    #[error("job for mesh {id} is {state}, operation not permitted")]
    InvalidState {
        /// The mesh id.
        id: MeshId,
        /// The state the job was found in.
        state: JobState,
    },
}
