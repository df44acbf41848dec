//! Per-mesh job records and the concurrency policy around repair.
//!
//! The store maps mesh ids to job records and enforces at-most-one
//! in-flight repair per id. The lock is held only for state transitions;
//! all geometry runs outside it, so jobs for different ids proceed fully
//! in parallel.
//!
//! State machine per job:
//!
//! ```text
//! Uploaded -> Analyzing -> Repairing -> Repaired
//!     \           \            \
//!      +-----------+------------+-----> Failed
//! ```
//!
//! `Repaired` and `Failed` are terminal. A repair request against a
//! `Repaired` job is a no-op returning the stored artifact; against an
//! in-flight job it is rejected with a conflict.

use std::sync::{Mutex, PoisonError};

use hashbrown::HashMap;
use kintsu_repair::RepairSummary;
use kintsu_types::Dimensions;
use tracing::{info, warn};

use crate::annotate::{annotate_or_placeholder, AnnotationRequest, Annotator, ANNOTATION_PLACEHOLDER};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline;

/// Identifier of an uploaded mesh, assigned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshId(String);

impl MeshId {
    /// Wrap an orchestrator-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MeshId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle state of one repair job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Mesh bytes received, nothing computed yet.
    Uploaded,
    /// Loading, measuring, and classifying.
    Analyzing,
    /// Repair and serialization in progress.
    Repairing,
    /// Terminal: repaired artifact stored.
    Repaired,
    /// Terminal: the job aborted with an error.
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uploaded => "uploaded",
            Self::Analyzing => "analyzing",
            Self::Repairing => "repairing",
            Self::Repaired => "repaired",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl JobState {
    /// True while a repair invocation owns this job.
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Analyzing | Self::Repairing)
    }

    /// True for the sticky end states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Repaired | Self::Failed)
    }
}

/// Everything the store knows about one mesh.
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// The mesh id this record belongs to.
    pub id: MeshId,
    /// Original filename, kept for annotation.
    pub filename: String,
    /// Current lifecycle state.
    pub state: JobState,
    /// Measured dimensions, set during analysis.
    pub dimensions: Option<Dimensions>,
    /// Repair counters, set on success.
    pub summary: Option<RepairSummary>,
    /// Human-readable description of the repair.
    pub annotation: Option<String>,
    /// Serialized repaired mesh, set on success.
    pub artifact: Option<Vec<u8>>,
    /// Error message, set on failure.
    pub failure: Option<String>,
}

impl JobRecord {
    fn new(id: MeshId, filename: String) -> Self {
        Self {
            id,
            filename,
            state: JobState::Uploaded,
            dimensions: None,
            summary: None,
            annotation: None,
            artifact: None,
            failure: None,
        }
    }
}

/// The result of a successful (or previously completed) repair job.
#[derive(Debug, Clone)]
pub struct RepairedJob {
    /// Measured dimensions of the uploaded mesh.
    pub dimensions: Dimensions,
    /// What the repair did.
    pub summary: RepairSummary,
    /// Description of the repair.
    pub annotation: String,
    /// The repaired mesh, serialized to OBJ bytes.
    pub artifact: Vec<u8>,
}

/// Registry of repair jobs keyed by mesh id.
///
/// Owned by the orchestrator and passed by reference into repair calls;
/// nothing in this crate holds global state.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<MeshId, JobRecord>>,
}

impl JobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MeshId, JobRecord>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an uploaded mesh, creating its job record in `Uploaded`.
    ///
    /// Re-registering an id resets its record (a fresh upload supersedes
    /// old results), but an id with a repair in flight is contended.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Conflict`] if a repair for this id is in
    /// flight.
    pub fn register(&self, id: &MeshId, filename: &str) -> PipelineResult<()> {
        let mut jobs = self.lock();
        if let Some(existing) = jobs.get(id) {
            if existing.state.is_in_flight() {
                return Err(PipelineError::Conflict { id: id.clone() });
            }
        }
        info!(id = %id, filename, "registered upload");
        jobs.insert(id.clone(), JobRecord::new(id.clone(), filename.to_owned()));
        Ok(())
    }

    /// Snapshot a job record.
    #[must_use]
    pub fn get(&self, id: &MeshId) -> Option<JobRecord> {
        self.lock().get(id).cloned()
    }

    /// Current state of a job, if registered.
    #[must_use]
    pub fn state(&self, id: &MeshId) -> Option<JobState> {
        self.lock().get(id).map(|record| record.state)
    }

    /// Run the full repair pipeline for a registered job.
    ///
    /// Load, measure, classify, repair, serialize, annotate; the record
    /// moves `Uploaded -> Analyzing -> Repairing -> Repaired` and keeps the
    /// artifact. Calling again on a `Repaired` job returns the stored
    /// result without recomputing.
    ///
    /// # Errors
    ///
    /// [`PipelineError::UnknownJob`] for an unregistered id,
    /// [`PipelineError::Conflict`] while another repair for the same id is
    /// in flight, [`PipelineError::InvalidState`] for a `Failed` job, and
    /// the wrapped parse/repair error when the geometry fails (the record
    /// then moves to `Failed`).
    pub fn run_repair(
        &self,
        id: &MeshId,
        bytes: &[u8],
        mode: &str,
        annotator: &dyn Annotator,
    ) -> PipelineResult<RepairedJob> {
        let claim = self.claim(id)?;
        if let Some(done) = claim.completed {
            return Ok(done);
        }
        let filename = claim.filename;

        let outcome = self.run_geometry(id, bytes);
        match outcome {
            Ok((dimensions, summary, artifact)) => {
                let request = AnnotationRequest {
                    filename: &filename,
                    dimensions,
                    mode,
                };
                let annotation = annotate_or_placeholder(annotator, &request);

                let mut jobs = self.lock();
                if let Some(record) = jobs.get_mut(id) {
                    record.state = JobState::Repaired;
                    record.dimensions = Some(dimensions);
                    record.summary = Some(summary);
                    record.annotation = Some(annotation.clone());
                    record.artifact = Some(artifact.clone());
                }
                info!(id = %id, %summary, "job repaired");
                Ok(RepairedJob {
                    dimensions,
                    summary,
                    annotation,
                    artifact,
                })
            }
            Err(err) => {
                let mut jobs = self.lock();
                if let Some(record) = jobs.get_mut(id) {
                    record.state = JobState::Failed;
                    record.failure = Some(err.to_string());
                }
                warn!(id = %id, error = %err, "job failed");
                Err(err)
            }
        }
    }

    /// Claim the job for this invocation, or short-circuit.
    fn claim(&self, id: &MeshId) -> PipelineResult<Claim> {
        let mut jobs = self.lock();
        let record = jobs
            .get_mut(id)
            .ok_or_else(|| PipelineError::UnknownJob { id: id.clone() })?;

        match record.state {
            JobState::Uploaded => {
                record.state = JobState::Analyzing;
                Ok(Claim {
                    filename: record.filename.clone(),
                    completed: None,
                })
            }
            JobState::Analyzing | JobState::Repairing => {
                Err(PipelineError::Conflict { id: id.clone() })
            }
            JobState::Repaired => Ok(Claim {
                filename: record.filename.clone(),
                completed: Some(RepairedJob {
                    dimensions: record.dimensions.unwrap_or_else(Dimensions::zero),
                    summary: record.summary.unwrap_or_default(),
                    annotation: record
                        .annotation
                        .clone()
                        .unwrap_or_else(|| ANNOTATION_PLACEHOLDER.to_owned()),
                    artifact: record.artifact.clone().unwrap_or_default(),
                }),
            }),
            JobState::Failed => Err(PipelineError::InvalidState {
                id: id.clone(),
                state: record.state,
            }),
        }
    }

    /// The geometric stages, run without holding the lock.
    fn run_geometry(
        &self,
        id: &MeshId,
        bytes: &[u8],
    ) -> PipelineResult<(Dimensions, RepairSummary, Vec<u8>)> {
        let (mesh, stats) = pipeline::load(bytes)?;
        let dimensions = pipeline::summarize(&mesh);
        let report = pipeline::classify(&mesh);
        info!(id = %id, vertices = stats.vertices, triangles = stats.triangles, %report, "analysis complete");

        {
            let mut jobs = self.lock();
            if let Some(record) = jobs.get_mut(id) {
                record.state = JobState::Repairing;
                record.dimensions = Some(dimensions);
            }
        }

        let (repaired, summary) = pipeline::repair(&mesh, &report)?;
        let artifact = pipeline::serialize(&repaired);
        Ok((dimensions, summary, artifact))
    }
}

struct Claim {
    filename: String,
    completed: Option<RepairedJob>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::PlaceholderAnnotator;

    const OPEN_TRIANGLE: &[u8] = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn register_then_query() {
        let store = JobStore::new();
        let id = MeshId::from("pot-1");

        store.register(&id, "pot.obj").unwrap();
        assert_eq!(store.state(&id), Some(JobState::Uploaded));
        assert_eq!(store.get(&id).unwrap().filename, "pot.obj");
    }

    #[test]
    fn unknown_job_is_rejected() {
        let store = JobStore::new();
        let id = MeshId::from("nope");
        let err = store
            .run_repair(&id, OPEN_TRIANGLE, "standard", &PlaceholderAnnotator)
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownJob { .. }));
    }

    #[test]
    fn successful_run_reaches_repaired() {
        let store = JobStore::new();
        let id = MeshId::from("pot-2");
        store.register(&id, "pot.obj").unwrap();

        let done = store
            .run_repair(&id, OPEN_TRIANGLE, "standard", &PlaceholderAnnotator)
            .unwrap();
        assert_eq!(done.summary.holes_filled, 1);
        assert_eq!(done.annotation, ANNOTATION_PLACEHOLDER);
        assert!(!done.artifact.is_empty());
        assert_eq!(store.state(&id), Some(JobState::Repaired));
    }

    #[test]
    fn repaired_job_is_a_no_op() {
        let store = JobStore::new();
        let id = MeshId::from("pot-3");
        store.register(&id, "pot.obj").unwrap();

        let first = store
            .run_repair(&id, OPEN_TRIANGLE, "standard", &PlaceholderAnnotator)
            .unwrap();
        // Second call returns the stored artifact even with garbage bytes
        let second = store
            .run_repair(&id, b"not obj at all", "standard", &PlaceholderAnnotator)
            .unwrap();
        assert_eq!(first.artifact, second.artifact);
        assert_eq!(first.summary, second.summary);
    }

    #[test]
    fn parse_failure_marks_job_failed() {
        let store = JobStore::new();
        let id = MeshId::from("pot-4");
        store.register(&id, "pot.obj").unwrap();

        let err = store
            .run_repair(&id, b"v zero 0 0\n", "standard", &PlaceholderAnnotator)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
        assert_eq!(store.state(&id), Some(JobState::Failed));
        assert!(store.get(&id).unwrap().failure.is_some());
    }

    #[test]
    fn failed_job_rejects_further_repairs() {
        let store = JobStore::new();
        let id = MeshId::from("pot-5");
        store.register(&id, "pot.obj").unwrap();
        let _ = store.run_repair(&id, b"garbage", "standard", &PlaceholderAnnotator);

        let err = store
            .run_repair(&id, OPEN_TRIANGLE, "standard", &PlaceholderAnnotator)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidState {
                state: JobState::Failed,
                ..
            }
        ));
    }

    #[test]
    fn reregistering_resets_a_terminal_job() {
        let store = JobStore::new();
        let id = MeshId::from("pot-6");
        store.register(&id, "pot.obj").unwrap();
        let _ = store.run_repair(&id, b"garbage", "standard", &PlaceholderAnnotator);
        assert_eq!(store.state(&id), Some(JobState::Failed));

        store.register(&id, "pot-v2.obj").unwrap();
        assert_eq!(store.state(&id), Some(JobState::Uploaded));
        let done = store
            .run_repair(&id, OPEN_TRIANGLE, "standard", &PlaceholderAnnotator)
            .unwrap();
        assert_eq!(done.summary.holes_filled, 1);
    }
}
