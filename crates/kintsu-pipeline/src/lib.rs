//! Orchestration layer for the kintsu scan-repair pipeline.
//!
//! Ties the geometry crates together behind a five-operation boundary
//! contract ([`load`], [`summarize`], [`classify`], [`repair`],
//! [`serialize`]) and adds the two concerns an orchestrator needs around
//! it:
//!
//! - [`JobStore`]: per-mesh job records with a strict lifecycle
//!   (`Uploaded -> Analyzing -> Repairing -> Repaired | Failed`) and
//!   at-most-one in-flight repair per mesh id.
//! - [`Annotator`]: an optional, failure-tolerant collaborator producing a
//!   human-readable description of the repair; its absence degrades to a
//!   fixed placeholder and never affects geometry.
//!
//! HTTP transport and byte-stream persistence remain the caller's job.
//!
//! # Example
//!
//! ```
//! use kintsu_pipeline::{JobStore, MeshId, PlaceholderAnnotator};
//!
//! let store = JobStore::new();
//! let id = MeshId::from("scan-42");
//! store.register(&id, "scan-42.obj").unwrap();
//!
//! let obj = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
//! let done = store
//!     .run_repair(&id, obj, "standard", &PlaceholderAnnotator)
//!     .unwrap();
//! assert_eq!(done.summary.holes_filled, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod annotate;
mod error;
mod job;
mod pipeline;

pub use annotate::{
    annotate_or_placeholder, AnnotationRequest, Annotator, PlaceholderAnnotator,
    ANNOTATION_PLACEHOLDER,
};
pub use error::{PipelineError, PipelineResult};
pub use job::{JobRecord, JobState, JobStore, MeshId, RepairedJob};
pub use pipeline::{classify, load, repair, serialize, summarize};
