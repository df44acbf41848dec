//! Error types for OBJ parsing and serialization.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, ParseError>;

/// Errors that can occur while loading or saving an OBJ mesh.
///
/// Parse errors are fatal: no partial mesh is ever returned to the caller.
#[derive(Debug, Error)]
pub enum ParseError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Input contained no vertex data at all.
    #[error("empty input: no vertex data found")]
    Empty,

    /// A numeric token could not be parsed.
    #[error("line {line}: malformed number `{token}`")]
    MalformedNumber {
        /// 1-based line number in the input.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A vertex line had fewer than 3 coordinates.
    #[error("line {line}: vertex has {got} coordinates, need 3")]
    VertexTooShort {
        /// 1-based line number in the input.
        line: usize,
        /// Number of numeric tokens found.
        got: usize,
    },

    /// A face line had fewer than 3 vertex references.
    #[error("line {line}: face has {got} vertices, need at least 3")]
    FaceTooShort {
        /// 1-based line number in the input.
        line: usize,
        /// Number of vertex references found.
        got: usize,
    },

    /// A face referenced a vertex index outside the vertex buffer.
    ///
    /// OBJ indices are 1-based; negative indices are resolved against the
    /// vertex count before this check, so `index` here is the raw token.
    #[error("line {line}: face index {index} out of range (have {vertex_count} vertices)")]
    FaceIndexOutOfRange {
        /// 1-based line number in the input.
        line: usize,
        /// The index as written in the file.
        index: i64,
        /// Vertices seen so far at that point in the file.
        vertex_count: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
