//! The five-operation boundary contract.
//!
//! Everything an orchestrator needs to run a repair, as pure synchronous
//! functions over owned buffers: bytes in, bytes out, no I/O, no shared
//! state. Transport, storage, and job bookkeeping stay on the caller's
//! side of this line (see [`crate::job`] for the bookkeeping half).

use kintsu_io::{load_obj_bytes, write_obj, IoResult, LoadStats};
use kintsu_repair::{DefectReport, RepairResult, RepairSummary};
use kintsu_types::{Dimensions, TriangleMesh};

/// Parse OBJ bytes into a mesh.
///
/// # Errors
///
/// Returns a [`kintsu_io::ParseError`] for malformed input; no partial
/// mesh is ever returned.
pub fn load(bytes: &[u8]) -> IoResult<(TriangleMesh, LoadStats)> {
    load_obj_bytes(bytes)
}

/// Measure the mesh's axis-aligned extents.
#[must_use]
pub fn summarize(mesh: &TriangleMesh) -> Dimensions {
    Dimensions::of(mesh)
}

/// Find every hole and non-manifold edge in the mesh.
#[must_use]
pub fn classify(mesh: &TriangleMesh) -> DefectReport {
    kintsu_repair::classify(mesh)
}

/// Repair the reported defects, returning a new mesh and a summary.
///
/// # Errors
///
/// Returns a [`kintsu_repair::RepairError`] for an empty mesh or a face
/// index outside the vertex buffer.
pub fn repair(
    mesh: &TriangleMesh,
    report: &DefectReport,
) -> RepairResult<(TriangleMesh, RepairSummary)> {
    kintsu_repair::repair(mesh, report)
}

/// Serialize a mesh back to OBJ bytes.
#[must_use]
pub fn serialize(mesh: &TriangleMesh) -> Vec<u8> {
    write_obj(mesh)
}
