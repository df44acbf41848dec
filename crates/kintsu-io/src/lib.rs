//! Mesh I/O for the kintsu scan-repair pipeline.
//!
//! Photogrammetry exports arrive as triangle-soup OBJ; this crate turns
//! those bytes into a [`kintsu_types::TriangleMesh`] and turns repaired
//! meshes back into OBJ bytes. OBJ is the only supported format by design.
//!
//! The loader is tolerant where the format allows (comments, unknown tags,
//! extra vertex attributes, whitespace runs, negative and slash-composite
//! face indices) and strict where it matters (numeric tokens, index ranges):
//! a malformed file produces a [`ParseError`], never a partial mesh.
//!
//! # Example
//!
//! ```
//! use kintsu_io::{load_obj_bytes, write_obj};
//!
//! let src = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
//! let (mesh, stats) = load_obj_bytes(src).unwrap();
//! assert_eq!(stats.triangles, 1);
//!
//! let bytes = write_obj(&mesh);
//! assert_eq!(&bytes, src);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod obj;

pub use error::{IoResult, ParseError};
pub use obj::{load_obj, load_obj_bytes, parse_obj, save_obj, write_obj, LoadStats};
